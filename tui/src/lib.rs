// Forbid accidental stdout/stderr writes while the terminal is in raw mode.
// The few places that run before or after the TUI opt out locally.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::fs::File;
use std::fs::OpenOptions;

use tokio::sync::mpsc::unbounded_channel;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod app_event;
mod app_event_sender;
mod cli;
mod composer_widget;
mod config;
mod confirm_dialog;
mod key;
mod render;
mod text_engine;
mod tui;

use crate::app::App;
use crate::app_event_sender::AppEventSender;

pub use cli::Cli;
pub use config::CONFIG_TOML_FILE;
pub use config::Config;
pub use config::ConfigError;
pub use config::ConfigOverrides;
pub use config::ConfigToml;
pub use config::load_config_as_toml;
pub use text_engine::TextAreaEngine;
pub use text_engine::TextAreaFactory;

const LOG_FILE_NAME: &str = "huddle-tui.log";
const DEFAULT_LOG_FILTER: &str = "huddle_tui=info,huddle_composer=info";

/// Appends to `<home>/log/huddle-tui.log`, owner read/write only on unix.
fn open_log_file(config: &Config) -> std::io::Result<File> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(log_dir.join(LOG_FILE_NAME))
}

pub async fn run_main(cli: Cli) -> std::io::Result<()> {
    let config = match Config::load_with_overrides(cli.config_overrides()) {
        Ok(config) => config,
        #[allow(clippy::print_stderr)]
        Err(err) => {
            eprintln!("Error loading configuration: {err}");
            std::process::exit(1);
        }
    };

    let log_file = open_log_file(&config)?;
    // Dropping the guard flushes pending lines, so it lives until exit.
    let (log_writer, _log_guard) = non_blocking(log_file);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    info!(
        huddle_home = %config.huddle_home.display(),
        read_only = config.read_only,
        "starting huddle-tui"
    );

    run_ratatui_app(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))
}

async fn run_ratatui_app(config: Config) -> color_eyre::Result<()> {
    color_eyre::install()?;
    let mut terminal = tui::init()?;
    terminal.clear()?;

    let (app_event_tx, mut app_event_rx) = unbounded_channel();
    let app_event_tx = AppEventSender::new(app_event_tx);
    let mut app = App::new(&config, app_event_tx);
    let result = app.run(&mut terminal, &mut app_event_rx).await;

    restore();
    result
}

#[expect(clippy::print_stderr, reason = "runs after the alternate screen is left")]
fn restore() {
    if let Err(err) = tui::restore() {
        error!("failed to restore terminal: {err}");
        eprintln!(
            "huddle-tui could not restore the terminal ({err}); run `reset` if input looks wrong"
        );
    }
}
