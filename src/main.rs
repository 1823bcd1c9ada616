//! gaou-bot: Discord bot entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse flags, load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Require `DISCORD_BOT_TOKEN`
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run the Discord channel until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use gaou_bot::bootstrap::{cli, logger};
use gaou_bot::config::{self, DISCORD_TOKEN_ENV};
use gaou_bot::error::AppError;
use gaou_bot::subsystems::bot::BotContext;
use gaou_bot::subsystems::discord::DiscordChannel;
use gaou_bot::subsystems::runtime::{Component, spawn_components};

const ABOUT: &str = "gaou-bot: Discord bot with LLM-backed commands, moderation and jokes";

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
            eprintln!("error: {msg}\n\n{}", cli::usage("gaou-bot", ABOUT));
            std::process::exit(2);
        }
    };
    if args.show_help {
        print!("{}", cli::usage("gaou-bot", ABOUT));
        return Ok(());
    }

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level)?;

    info!(
        service = %config.service_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        model = %config.bot.model,
        prefix = %config.bot.command_prefix,
        jokes = config.bot.jokes.enabled,
        "config loaded"
    );

    let token = config
        .discord_token
        .clone()
        .ok_or_else(|| AppError::Config(format!("{DISCORD_TOKEN_ENV} is not set")))?;

    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let bot = Arc::new(BotContext::from_config(&config));
    let components: Vec<Box<dyn Component>> = vec![Box::new(DiscordChannel::new("discord0", token, bot))];

    spawn_components(components, shutdown).join().await?;
    info!("gaou-bot stopped");
    Ok(())
}
