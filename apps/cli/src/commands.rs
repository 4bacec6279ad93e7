//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use mapslink_core::pipeline::{EnrichFileConfig, EnrichFileResult, ProgressReporter};
use mapslink_lookup::{GooglePlacesClient, LookupOptions};
use mapslink_shared::{AppConfig, MapLink, init_config, load_config, resolve_credentials};
use mapslink_sheet::ReadOptions;
use tracing::info;

/// Failures listed individually in the summary before truncating.
const MAX_LISTED_FAILURES: usize = 10;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mapslink: add Google Maps links to a spreadsheet of place names.
#[derive(Parser)]
#[command(
    name = "mapslink",
    version,
    about = "Resolve a column of location names to Google Maps URLs and write an enriched workbook.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Resolve a location column and write the enriched workbook.
    Enrich {
        /// Input workbook (.xlsx, .xls, .ods).
        input: PathBuf,

        /// Column holding the location names.
        #[arg(short, long)]
        column: String,

        /// Output path (defaults to locations_with_google_maps.xlsx in the current directory).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Worksheet to read (defaults to the first one).
        #[arg(long)]
        sheet: Option<String>,

        /// Concurrent lookups (1 = sequential, max 16).
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Google Maps API key (defaults to the env var named in config).
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Preview a workbook's columns and first rows.
    Columns {
        /// Input workbook.
        input: PathBuf,

        /// Worksheet to read (defaults to the first one).
        #[arg(long)]
        sheet: Option<String>,

        /// Number of rows to show.
        #[arg(long, default_value = "5")]
        rows: usize,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // Target prefixes match the library crates too (mapslink_core, ...).
    let filter = match cli.verbose {
        0 => "mapslink=info",
        1 => "mapslink=debug",
        _ => "mapslink=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich {
            input,
            column,
            out,
            sheet,
            concurrency,
            api_key,
        } => cmd_enrich(&input, &column, out, sheet, concurrency, api_key).await,
        Command::Columns { input, sheet, rows } => cmd_columns(&input, sheet, rows),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    input: &Path,
    column: &str,
    out: Option<PathBuf>,
    sheet: Option<String>,
    concurrency: Option<usize>,
    api_key: Option<String>,
) -> Result<()> {
    let config = load_config()?;

    // Credentials and input must both be present before anything runs
    let credentials = resolve_credentials(&config, api_key)?;
    if !input.is_file() {
        return Err(eyre!("input workbook '{}' not found", input.display()));
    }

    let output = match out {
        Some(p) => p,
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?
            .join(&config.defaults.output_file),
    };

    let lookup = GooglePlacesClient::new(&LookupOptions::from_config(&config.google)?)?;

    let enrich_config = EnrichFileConfig {
        input: input.to_path_buf(),
        output,
        sheet,
        location_column: column.to_string(),
        output_column: config.defaults.output_column.clone(),
        concurrency: config.defaults.effective_concurrency(concurrency),
    };

    info!(
        input = %input.display(),
        column,
        concurrency = enrich_config.concurrency,
        "enriching workbook"
    );

    let reporter = CliProgress::new();
    let result = match mapslink_core::enrich_file(
        &enrich_config,
        Arc::new(lookup),
        Arc::new(credentials),
        &reporter,
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            reporter.bar.finish_and_clear();
            return Err(e.into());
        }
    };

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &EnrichFileResult) {
    let stats = &result.stats;
    println!();
    println!("  Workbook enriched!");
    println!("  Rows:       {}", stats.rows);
    println!("  Found:      {}", stats.found);
    println!("  Not found:  {}", stats.not_found);
    println!("  Failed:     {}", stats.failed);
    println!("  Column:     {}", result.output_column);
    println!("  Output:     {}", result.output_path.display());
    println!("  Format:     {}", result.content_type);
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());

    if !result.failures.is_empty() {
        println!();
        println!("  Failed lookups:");
        for (idx, reason) in result.failures.iter().take(MAX_LISTED_FAILURES) {
            // +2: one for the header row, one for 1-based sheet rows
            println!("    row {}: {reason}", idx + 2);
        }
        if result.failures.len() > MAX_LISTED_FAILURES {
            println!(
                "    ... and {} more",
                result.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }
    println!();
}

fn cmd_columns(input: &Path, sheet: Option<String>, rows: usize) -> Result<()> {
    let sheets = mapslink_sheet::sheet_names(input)?;
    let dataset = mapslink_sheet::read_path(input, &ReadOptions { sheet })?;

    println!("Sheets: {}", sheets.join(", "));
    println!();
    println!("Columns:");
    for (idx, name) in dataset.columns().iter().enumerate() {
        println!("  {idx:>3}  {name}");
    }

    println!();
    println!(
        "First {} of {} rows:",
        rows.min(dataset.row_count()),
        dataset.row_count()
    );
    println!("  {}", dataset.columns().join("\t"));
    for row in dataset.rows().iter().take(rows) {
        let cells: Vec<String> = row.iter().map(|c| c.to_text()).collect();
        println!("  {}", cells.join("\t"));
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter: a spinner for phases, a bar while rows resolve.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn rows_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
    }

    fn row_resolved(&self, _index: usize, _total: usize, link: &MapLink) {
        if let MapLink::LookupFailed { .. } = link {
            self.bar.set_message("Resolving locations (some lookups failed)");
        }
        self.bar.inc(1);
    }

    fn done(&self, _result: &EnrichFileResult) {
        self.bar.finish_and_clear();
    }
}
