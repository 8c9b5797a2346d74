use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use signup_parser::SignupSchema;
use tracing::{debug, info};

use crate::config::EmailKeyMode;
use crate::types::{QuarantineReason, StagedRecord};

/// Positions (into the staged record list) of every record sharing one email key, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailGroup {
    pub key: String,
    pub members: Vec<usize>,
}

pub fn group_by_email(
    records: &[StagedRecord],
    schema: &SignupSchema,
    key_mode: EmailKeyMode,
) -> Vec<EmailGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<EmailGroup> = Vec::new();

    for (pos, staged) in records.iter().enumerate() {
        let Some(key) = key_mode.key(schema.email(&staged.record)) else {
            continue;
        };

        match positions.get(&*key) {
            Some(&group_idx) => groups[group_idx].members.push(pos),
            None => {
                positions.insert(key.to_string(), groups.len());
                groups.push(EmailGroup {
                    key: key.into_owned(),
                    members: vec![pos],
                });
            }
        }
    }

    groups
}

/// Picks the latest-dated member that is still clean. Equal dates keep the earlier row; that
/// tie-break is arbitrary but stable.
pub fn select_survivor(records: &[StagedRecord], members: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, NaiveDate)> = None;

    for &pos in members {
        let staged = &records[pos];
        if staged.is_quarantined() {
            continue;
        }
        let Some(date) = staged.signup_date_standardized else {
            continue;
        };
        match best {
            Some((_, best_date)) if date <= best_date => {}
            _ => best = Some((pos, date)),
        }
    }

    best.map(|(pos, _)| pos)
}

/// Duplicate resolution pass. In every email group with more than one row, the survivor is
/// flagged `is_multi_plan` and every other clean member is quarantined.
pub fn resolve_duplicates(
    records: Vec<StagedRecord>,
    schema: &SignupSchema,
    key_mode: EmailKeyMode,
) -> Vec<StagedRecord> {
    let groups = group_by_email(&records, schema, key_mode);

    let mut superseded: HashMap<usize, Option<usize>> = HashMap::new();
    let mut survivors: HashSet<usize> = HashSet::new();
    let mut duplicate_groups = 0usize;

    for group in groups.iter().filter(|group| group.members.len() > 1) {
        duplicate_groups += 1;
        let survivor = select_survivor(&records, &group.members);
        let survivor_index = survivor.map(|pos| records[pos].original_index());

        for &pos in &group.members {
            if Some(pos) != survivor && !records[pos].is_quarantined() {
                superseded.insert(pos, survivor_index);
            }
        }

        match survivor {
            Some(pos) => {
                survivors.insert(pos);
            }
            None => debug!(
                email = %group.key,
                members = group.members.len(),
                "no member of duplicate group survived date parsing"
            ),
        }
    }

    info!(
        duplicate_groups,
        multi_plan = survivors.len(),
        superseded = superseded.len(),
        "resolved duplicate emails"
    );

    records
        .into_iter()
        .enumerate()
        .map(|(pos, staged)| {
            if let Some(survivor_index) = superseded.remove(&pos) {
                staged.quarantined(QuarantineReason::SupersededDuplicate { survivor_index })
            } else if survivors.contains(&pos) {
                staged.flagged_multi_plan()
            } else {
                staged
            }
        })
        .collect()
}
