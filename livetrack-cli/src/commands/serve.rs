//! Serve command - run the WebSocket streaming server.

use std::path::PathBuf;

use livetrack::app::{AppConfig, LiveTrackApp};
use livetrack::config::ConfigFile;
use livetrack::logging::{init_logging, LogConfig};
use tracing::info;

use crate::error::CliError;

/// Arguments for the serve command.
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
    pub rows: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Run the serve command.
pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    let log_config = log_config(&config, args.log_level.as_deref());
    let _log_guard = init_logging(&log_config)?;

    let app_config = app_config(&config, &args);

    println!("LiveTrack v{}", livetrack::VERSION);
    println!("==============");
    println!();
    println!("Listen:     {}", app_config.bind);
    match &app_config.rows_file {
        Some(path) => println!("Rows:       {}", path.display()),
        None => println!("Rows:       (empty store)"),
    }
    println!(
        "Period:     {} ms (removal after {} ms)",
        app_config.stream.send_period.as_millis(),
        app_config.stream.removal_period.as_millis()
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async move {
        let app = LiveTrackApp::start(app_config).await?;
        let shutdown = app.shutdown_token();

        ctrlc::set_handler(move || {
            println!();
            println!("Received shutdown signal, stopping...");
            shutdown.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

        info!(addr = %app.local_addr()?, "Ready");
        app.run().await?;
        Ok::<_, CliError>(())
    })?;

    println!("Server stopped.");
    Ok(())
}

/// CLI arguments take precedence over the file.
fn app_config(config: &ConfigFile, args: &ServeArgs) -> AppConfig {
    let mut app_config = AppConfig::from_config_file(config);
    if let Some(bind) = &args.bind {
        app_config = app_config.with_bind(bind.as_str());
    }
    if let Some(rows) = &args.rows {
        app_config = app_config.with_rows_file(rows.clone());
    }
    app_config
}

fn log_config(config: &ConfigFile, level: Option<&str>) -> LogConfig {
    let mut log_config = LogConfig::new(level.unwrap_or(&config.logging.level));
    if let Some(file) = &config.logging.file {
        log_config = log_config.with_file(file.clone());
    }
    log_config
}
