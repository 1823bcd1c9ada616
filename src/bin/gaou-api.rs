//! gaou-api: HTTP entry point.
//!
//! Same bootstrap as `gaou-bot` (.env, flags, config, logger, Ctrl-C
//! watcher), then serves the API until shutdown.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use gaou_bot::bootstrap::{cli, logger};
use gaou_bot::config;
use gaou_bot::error::AppError;
use gaou_bot::extract::LlmAdapter;
use gaou_bot::subsystems::http::{ApiState, HttpChannel};
use gaou_bot::subsystems::runtime::{Component, spawn_components};

const ABOUT: &str = "gaou-api: HTTP API that turns free text into a person description";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{}", cli::usage("gaou-api", ABOUT));
            std::process::exit(2);
        }
    };
    if args.show_help {
        print!("{}", cli::usage("gaou-api", ABOUT));
        return Ok(());
    }

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level)?;

    info!(
        service = %config.service_name,
        effective_log_level = %effective_log_level,
        bind = %config.http.bind,
        model = %config.http.model,
        debug = config.http.debug,
        "config loaded"
    );

    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let adapter = Arc::new(LlmAdapter::from_config(&config.llm));
    let state = ApiState::new(adapter, &config.http);
    let components: Vec<Box<dyn Component>> =
        vec![Box::new(HttpChannel::new("http0", config.http.bind.clone(), state))];

    spawn_components(components, shutdown).join().await?;
    info!("gaou-api stopped");
    Ok(())
}
