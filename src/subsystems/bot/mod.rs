//! Chat-bot core, independent of the chat platform.
//!
//! [`handler::handle_event`] maps a [`BotEvent`] to a list of [`Action`]s;
//! [`executor::execute`] runs them against a [`ChatPlatform`]. The joke
//! round lives in [`jokes`]. The Discord adapter (`subsystems::discord`)
//! only translates gateway events and implements the platform trait.

pub mod command;
pub mod event;
pub mod executor;
pub mod handler;
pub mod jokes;

pub use event::{Action, Author, BotEvent, IncomingMessage, Scope};
pub use executor::{ChatPlatform, PlatformError, PurgeReport, execute, purge_history};
pub use handler::handle_event;

use std::sync::Arc;

use crate::config::{BotConfig, Config};
use crate::extract::LlmAdapter;

/// Everything event handling needs. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BotContext {
    pub config: BotConfig,
    pub adapter: Arc<LlmAdapter>,
}

impl BotContext {
    pub fn new(config: BotConfig, adapter: Arc<LlmAdapter>) -> Self {
        Self { config, adapter }
    }

    /// Context over the default provider registry.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bot.clone(), Arc::new(LlmAdapter::from_config(&config.llm)))
    }
}
