//! gh-trending - trending GitHub repositories
//!
//! A CLI tool that lists trending repositories, either from the GitHub
//! search API or by scraping github.com/trending.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (invalid period, network failure, config, unexpected page)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod planner;
mod report;
mod source;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use report::{DisplaySink, FileSink, StdoutSink};
use std::time::{Duration, Instant};
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

    // Initialize logging
    init_logging(&args);

    info!("gh-trending v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .gh-trending.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("Created {} with default settings.", config::CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));

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

/// Run one trending aggregation and display it. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().map_err(anyhow::Error::msg)?;

    let filters = config.filters();
    debug!("Filters: {:?}", filters);

    let source = source::build_source(filters.backend, &config.source_config())?;

    let json = config.display.format == OutputFormat::Json;

    let progress = args
        .show_progress(config.display.format)
        .then(|| spinner(&format!("Fetching trending repositories ({})", filters.backend)));
    let result =
        pipeline::collect_trending(source.as_ref(), &filters, config.http.concurrency).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let mut sink: Box<dyn DisplaySink> = match args.output {
        Some(ref path) => Box::new(FileSink::new(path.clone())),
        None => Box::new(StdoutSink),
    };

    let title = report::generate_title(&filters);

    let exit_code = match result {
        Ok(repos) => {
            info!(
                "Got {} repositories in {:.1}s",
                repos.len(),
                start_time.elapsed().as_secs_f64()
            );
            if json {
                sink.show("", &report::generate_json_report(&repos, &filters)?)?;
            } else {
                sink.show(&title, &report::generate_text_body(&repos, config.display.mode))?;
            }
            0
        }
        Err(e) => {
            warn!("Trending run failed: {}", e);
            if json {
                sink.show("", &report::generate_json_error(&e, &filters)?)?;
            } else {
                sink.show(&title, &e.to_string())?;
            }
            1
        }
    };

    if let Some(ref path) = args.output {
        if !args.quiet {
            eprintln!("Output saved to: {}", path.display());
        }
    }

    Ok(exit_code)
}

/// Spinner on stderr while queries run.
fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
