//! Finlab - Investment Intelligence at Your Fingertips
//!
//! A terminal client that forwards financial questions to an analysis
//! backend, either as a single free-text answer or as a structured
//! multi-stream (fundamental, momentum, sentiment) analysis.
//!
//! Exit codes:
//!   0 - Success (or a blank query, which is a no-op)
//!   1 - Request failed, or a runtime error (config, arguments, I/O)

mod backend;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod repl;
mod session;
mod view;

use anyhow::{Context, Result};
use backend::HttpBackend;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use report::ExportRecord;
use session::{QueryLimits, Session};
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file can turn on verbose logging, so load it first
    let LoadedConfig {
        mut config,
        source,
        warning,
    } = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("Finlab v{}", env!("CARGO_PKG_VERSION"));
    if let Some(reason) = warning {
        warn!("Failed to load config: {}", reason);
    }
    info!("Configuration: {}", source);
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    match run(args, config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Finlab failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .finlab.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to point at your backend or change the default mode.");
    Ok(())
}

/// Initialize logging on stderr. `RUST_LOG` wins over the flags when set.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the session and run one-shot or interactive. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let backend = HttpBackend::new(config.backend.clone())?;
    let limits = QueryLimits::from(&config.backend);
    let mut session = Session::new(backend, limits, config.general.default_mode);
    let show_progress = !args.quiet;

    match args.query.as_deref() {
        Some(query) => run_once(&mut session, query, &args, &config, show_progress).await,
        None => {
            repl::run(&mut session, show_progress).await?;
            Ok(0)
        }
    }
}

/// Submit a single query, print the result and optionally save a report.
async fn run_once(
    session: &mut Session<HttpBackend>,
    query: &str,
    args: &Args,
    config: &Config,
    show_progress: bool,
) -> Result<i32> {
    let query = query.trim();
    if query.is_empty() {
        eprintln!("⚠️  Nothing to do: the query is empty.");
        eprintln!("   {}", view::messages::placeholder(session.mode()));
        return Ok(0);
    }

    let mode = session.mode();
    repl::with_spinner(mode, show_progress, session.submit(query)).await;

    if let Some(err) = session.state().error() {
        eprintln!("❌ {}: {}", view::messages::ERROR_TITLE, err);
        return Ok(1);
    }
    let Some(result) = session.state().result() else {
        warn!("Unexpected state after request: {:?}", session.state());
        return Ok(1);
    };

    let record = ExportRecord::new(query, result);

    match config.report.format {
        OutputFormat::Json => println!("{}", report::generate_json_report(&record)?),
        OutputFormat::Markdown => print!("{}", report::render_screen(&session.screen(), false)),
    }

    if let Some(ref path) = args.output {
        let content = match config.report.format {
            OutputFormat::Json => report::generate_json_report(&record)?,
            OutputFormat::Markdown => report::generate_markdown_report(&record),
        };
        report::write_report(&content, path)?;
        eprintln!("✅ Report saved to: {}", path.display());
    }

    Ok(0)
}

/// Configuration plus what happened while loading it, reported once the
/// subscriber is installed.
struct LoadedConfig {
    config: Config,
    source: String,
    warning: Option<String>,
}

/// Load configuration from `--config`, the current directory, or defaults.
fn load_config(args: &Args) -> Result<LoadedConfig> {
    load_config_from(args, Path::new("."))
}

fn load_config_from(args: &Args, dir: &Path) -> Result<LoadedConfig> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok(LoadedConfig {
            config: Config::load(config_path)?,
            source: format!("loaded from {}", config_path.display()),
            warning: None,
        });
    }

    // Try default location
    let loaded = match Config::load_from_dir(dir) {
        Ok(Some(config)) => LoadedConfig {
            config,
            source: format!("loaded from {}", CONFIG_FILE_NAME),
            warning: None,
        },
        Ok(None) => LoadedConfig {
            config: Config::default(),
            source: "defaults".to_string(),
            warning: None,
        },
        Err(e) => LoadedConfig {
            config: Config::default(),
            source: "defaults".to_string(),
            warning: Some(format!("{:#}", e)),
        },
    };
    Ok(loaded)
}
