use std::io;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod api;
mod config;
mod forms;
mod push;
mod state;
mod ui;

use crate::api::ApiClient;
use crate::ui::App;

/// Terminal dashboard for the job service
#[derive(Parser, Debug)]
#[command(name = "job-dashboard", version, about)]
struct Cli {
    /// Job service base URL (overrides API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Log file directory (overrides LOG_DIR)
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment, then apply CLI overrides
    let mut config = config::Config::from_env()
        .expect("Failed to load configuration");
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = log_dir;
    }

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(&config.log_dir)
        .expect("Failed to create logs directory");

    // Initialize file-based logging with daily rotation and level separation.
    // Log files will be created as: logs/info.2024-12-22.log, logs/error.2024-12-22.log, etc.
    // No console layer: the terminal belongs to the dashboard.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // Create daily rotating file appenders for each log level
    let info_file = tracing_appender::rolling::daily(&config.log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(&config.log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(&config.log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(&config.log_dir, "debug.log");

    // Create layers for each log level
    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();

    info!("Starting job-dashboard");
    info!("  - API base URL: {}", config.api_base_url);
    info!("  - Log directory: {}", config.log_dir);

    let api = ApiClient::new(&config.api_base_url);
    let (tx, rx) = mpsc::unbounded_channel();
    let app = App::new(api, tx);

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = app.run(&mut terminal, rx).await;

    // Restore the terminal on both the success and error paths
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    result
}
