use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::fs::File;
use tokio::select;
use tracing::{info, level_filters::LevelFilter};
use voicegate::app::{self, AppStateBuilder};
use voicegate::config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let config = cli
        .conf
        .map(|conf| Config::load(&conf).expect("Failed to load config"))
        .unwrap_or_default();

    let mut log_fmt = tracing_subscriber::fmt();
    if let Some(ref level) = config.log_level {
        if let Ok(lv) = level.as_str().parse::<LevelFilter>() {
            log_fmt = log_fmt.with_max_level(lv);
        }
    }

    let _log_guard = if let Some(ref log_file) = config.log_file {
        let file = File::create(log_file).expect("Failed to create log file");
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        log_fmt.with_writer(non_blocking).try_init().ok();
        Some(guard)
    } else {
        log_fmt.try_init().ok();
        None
    };

    let state = AppStateBuilder::new()
        .config(config)
        .build()
        .expect("Failed to build app");

    info!("Starting voicegate on {}", state.config.http_addr);
    select! {
        result = app::run(state.clone()) => {
            result?
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received CTRL+C, shutting down");
            state.token.cancel();
        }
    }
    Ok(())
}
