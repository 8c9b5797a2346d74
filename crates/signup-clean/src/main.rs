use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use signup_core::{outputs, run_classification, CleanupConfig, CleanupSummary, OutputFormat};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "SIGNUP_CLEAN_CONFIG";

#[derive(Parser, Debug)]
#[command(author, version, about = "Signup table cleanup: standardize dates, resolve duplicate emails, quarantine bad rows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the input and write the clean and quarantine tables
    Run(RunArgs),
    /// Classify the input and print the summary without writing any table
    Inspect(InputArgs),
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Input table (.xls, .xlsx, .ods or .csv)
    #[arg(long)]
    input: Option<PathBuf>,
    /// TOML configuration file (falls back to $SIGNUP_CLEAN_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Destination for clean records
    #[arg(long)]
    clean_output: Option<PathBuf>,
    /// Destination for quarantined records
    #[arg(long)]
    quarantine_output: Option<PathBuf>,
    /// Output table format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Also write the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
    /// Add a quarantine_reason column to the quarantine table
    #[arg(long)]
    with_reasons: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.input)?;
    apply_run_overrides(&mut config, &args);

    let classified = run_classification(&config)
        .with_context(|| format!("failed to process {}", config.paths.input.display()))?;

    let artifacts =
        outputs::write_outputs(&classified, &config).context("failed to write output tables")?;
    println!(
        "Saved {} clean records to {}",
        artifacts.clean_rows,
        artifacts.clean_path.display()
    );
    println!(
        "Saved {} quarantined records to {}",
        artifacts.quarantined_rows,
        artifacts.quarantine_path.display()
    );

    if let Some(path) = &args.summary_json {
        outputs::write_summary_json(&classified.summary, path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "wrote run summary");
    }

    print_summary(&classified.summary);
    Ok(())
}

fn handle_inspect(args: InputArgs) -> Result<()> {
    let config = load_config(&args)?;
    let classified = run_classification(&config)
        .with_context(|| format!("failed to process {}", config.paths.input.display()))?;
    print_summary(&classified.summary);
    Ok(())
}

fn load_config(args: &InputArgs) -> Result<CleanupConfig> {
    dotenvy::dotenv().ok();

    let path = args
        .config
        .clone()
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            CleanupConfig::load(&path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => CleanupConfig::default(),
    };

    apply_input_overrides(&mut config, args);
    Ok(config)
}

fn apply_input_overrides(config: &mut CleanupConfig, args: &InputArgs) {
    if let Some(input) = &args.input {
        config.paths.input = input.clone();
    }
}

fn apply_run_overrides(config: &mut CleanupConfig, args: &RunArgs) {
    apply_input_overrides(config, &args.input);
    if let Some(path) = &args.clean_output {
        config.paths.clean_output = path.clone();
    }
    if let Some(path) = &args.quarantine_output {
        config.paths.quarantine_output = path.clone();
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if args.with_reasons {
        config.annotate_quarantine_reasons = true;
    }
}

fn print_summary(summary: &CleanupSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        "Total rows processed".to_string(),
        summary.total_rows.to_string(),
    ]);
    table.add_row(vec!["Clean rows".to_string(), summary.clean_rows.to_string()]);
    table.add_row(vec![
        "Quarantined rows".to_string(),
        summary.quarantined_rows.to_string(),
    ]);
    table.add_row(vec![
        "Multi-plan users".to_string(),
        summary.multi_plan_rows.to_string(),
    ]);
    table.add_row(vec![
        "Data quality rate".to_string(),
        format!("{:.1}%", summary.quality_percent()),
    ]);

    println!("\n--- SUMMARY ---");
    println!("{table}");

    if summary.quarantined_rows > 0 {
        let mut reasons = Table::new();
        reasons.set_header(vec!["Quarantine reason", "Rows"]);
        for (code, count) in summary
            .quarantine_reasons
            .iter()
            .filter(|(_, count)| **count > 0)
        {
            reasons.add_row(vec![code.to_string(), count.to_string()]);
        }
        println!("{reasons}");
    }
}
