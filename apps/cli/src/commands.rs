//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use civicwatch_scraper::{DepartmentRun, PageOutcome, ScrapeObserver, Scraper};
use civicwatch_shared::{AppConfig, ScrapeConfig, init_config, load_config};
use civicwatch_store::{append_report, load_snapshot, write_snapshot};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// CivicWatch — track municipal tenders and citizen reports.
#[derive(Parser)]
#[command(
    name = "civicwatch",
    version,
    about = "Scrape municipal tender listings into a deduplicated local snapshot.",
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
    /// Run the tender scrape and replace the local snapshot.
    Scrape {
        /// Directory for the snapshot and report files (overrides config).
        #[arg(long)]
        data_dir: Option<String>,

        /// Page ceiling per department (overrides config).
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// List tenders from the current snapshot.
    Tenders {
        /// Directory holding the snapshot file (overrides config).
        #[arg(long)]
        data_dir: Option<String>,
    },

    /// Submit a citizen photo report for a project.
    Report {
        /// Tender/project identifier the report is about.
        #[arg(long)]
        project_id: String,

        /// URL of the submitted photo.
        #[arg(long)]
        photo_url: String,

        /// Directory holding the report file (overrides config).
        #[arg(long)]
        data_dir: Option<String>,
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

    let filter = match cli.verbose {
        0 => "civicwatch=info",
        1 => "civicwatch=debug",
        _ => "civicwatch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            data_dir,
            max_pages,
        } => cmd_scrape(data_dir.as_deref(), max_pages).await,
        Command::Tenders { data_dir } => cmd_tenders(data_dir.as_deref()),
        Command::Report {
            project_id,
            photo_url,
            data_dir,
        } => cmd_report(&project_id, &photo_url, data_dir.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn resolved_config(data_dir: Option<&str>) -> Result<AppConfig> {
    let mut config = load_config()?;
    if let Some(dir) = data_dir {
        config.defaults.data_dir = dir.to_string();
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// scrape
// ---------------------------------------------------------------------------

async fn cmd_scrape(data_dir: Option<&str>, max_pages: Option<u32>) -> Result<()> {
    let config = resolved_config(data_dir)?;
    let mut scrape_config = ScrapeConfig::from(&config);
    if let Some(ceiling) = max_pages {
        scrape_config.max_pages = ceiling;
    }

    info!(
        departments = scrape_config.departments.len(),
        max_pages = scrape_config.max_pages,
        "starting scrape run"
    );

    let scraper = Scraper::new(scrape_config)?;
    let progress = CliProgress::new();

    // The run itself never fails: transport errors are skipped per page.
    let (summary, tenders) = scraper.run(&progress).await;
    progress.finish();

    // Persistence is the only run-level failure; the prior snapshot
    // survives it untouched.
    let snapshot_path = config.snapshot_path();
    if let Err(e) = write_snapshot(&snapshot_path, &tenders) {
        error!(error = %e, "snapshot write failed, previous snapshot left in place");
        return Err(e.into());
    }

    println!();
    println!("  Scrape complete!");
    println!("  Raw rows seen:  {}", summary.raw_rows);
    println!("  Unique tenders: {}", summary.unique);
    for run in &summary.departments {
        let ending = if run.stopped_early {
            "exhausted"
        } else if run.ceiling_hit {
            "page ceiling"
        } else {
            "done"
        };
        println!(
            "  {}: {} new over {} page(s), {} failed fetch(es) [{}]",
            run.dept,
            run.new_records,
            run.pages.len(),
            run.pages
                .iter()
                .filter(|p| **p == PageOutcome::FetchFailed)
                .count(),
            ending
        );
    }
    if !summary.collisions.is_empty() {
        println!("  Id collisions across departments (later record kept):");
        for c in &summary.collisions {
            println!("    {} — first {}, then {}", c.id, c.first_dept, c.later_dept);
        }
    }
    println!("  Snapshot: {}", snapshot_path.display());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner-based progress for scrape runs.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ScrapeObserver for CliProgress {
    fn page_done(&self, dept: &str, page: u32, outcome: &PageOutcome) {
        let note = match outcome {
            PageOutcome::Fetched { new_records, .. } => format!("{new_records} new"),
            PageOutcome::FetchFailed => "fetch failed, skipping".to_string(),
        };
        self.spinner
            .set_message(format!("Fetching {dept} page {page}: {note}"));
    }

    fn department_done(&self, run: &DepartmentRun) {
        self.spinner.set_message(format!(
            "{}: {} new record(s)",
            run.dept, run.new_records
        ));
    }
}

// ---------------------------------------------------------------------------
// tenders / report / config
// ---------------------------------------------------------------------------

fn cmd_tenders(data_dir: Option<&str>) -> Result<()> {
    let config = resolved_config(data_dir)?;
    let tenders = load_snapshot(&config.snapshot_path())?;

    if tenders.is_empty() {
        println!("No tenders recorded yet. Run `civicwatch scrape` first.");
        return Ok(());
    }

    for tender in &tenders {
        println!(
            "{:<10} {:<12} closes: {:<16} {}",
            tender.id, tender.publish_date, tender.closing_date, tender.title
        );
    }
    println!();
    println!("{} tender(s) in snapshot.", tenders.len());
    Ok(())
}

fn cmd_report(project_id: &str, photo_url: &str, data_dir: Option<&str>) -> Result<()> {
    let config = resolved_config(data_dir)?;
    let report = append_report(&config.reports_path(), project_id, photo_url)?;
    println!("Report {} submitted for project {}.", report.id, report.project_id);
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
