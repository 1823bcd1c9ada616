//! Runs [`Action`]s against a [`ChatPlatform`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::BotContext;
use super::event::Action;
use crate::extract::{AdapterError, PersonDescriptor, extract_person_descriptor};

/// Reply sent on the cleanup command when a deletion fails.
pub const DELETE_FAILED_NOTICE: &str = "You may not have permission to delete messages.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

/// The chat operations the bot needs.
pub trait ChatPlatform: Send + Sync {
    fn send(&self, channel_id: u64, content: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;

    fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    fn delete(&self, channel_id: u64, message_id: u64) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Ids of up to `limit` messages of `channel_id`, newest first.
    fn recent_messages(
        &self,
        channel_id: u64,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<u64>, PlatformError>> + Send;
}

/// Run `actions` in order. Platform failures are logged and do not stop the
/// remaining actions.
pub async fn execute<P: ChatPlatform>(platform: &P, ctx: &BotContext, actions: Vec<Action>) {
    for action in actions {
        match action {
            Action::Send { channel_id, content } => {
                if let Err(e) = platform.send(channel_id, &content).await {
                    warn!(channel_id, error = %e, "send failed");
                }
            }
            Action::Reply { channel_id, message_id, content } => {
                if let Err(e) = platform.reply(channel_id, message_id, &content).await {
                    warn!(channel_id, message_id, error = %e, "reply failed");
                }
            }
            Action::Delete { channel_id, message_id } => {
                if let Err(e) = platform.delete(channel_id, message_id).await {
                    warn!(channel_id, message_id, error = %e, "delete failed");
                }
            }
            Action::Pause(duration) => tokio::time::sleep(duration).await,
            Action::DescribePerson { channel_id, message_id, text } => {
                let content = person_reply(describe_person(ctx, &text).await);
                if let Err(e) = platform.reply(channel_id, message_id, &content).await {
                    warn!(channel_id, message_id, error = %e, "reply failed");
                }
            }
            Action::Cleanup { channel_id, command_id, limit } => {
                let report = purge_history(platform, channel_id, command_id, limit, ctx.config.cleanup_delay).await;
                info!(channel_id, limit, attempted = report.attempted, deleted = report.deleted, "cleanup finished");
            }
        }
    }
}

async fn describe_person(ctx: &BotContext, text: &str) -> Result<PersonDescriptor, AdapterError> {
    let client = ctx.adapter.client(ctx.config.model)?;
    extract_person_descriptor(&client, text).await
}

/// Text of the `new_gaou` reply.
pub fn person_reply(result: Result<PersonDescriptor, AdapterError>) -> String {
    let person = match result {
        Ok(person) => person,
        Err(e) => {
            warn!(error = %e, "person extraction failed");
            return format!("An error occurred: {e}");
        }
    };
    match serde_json::to_string_pretty(&person) {
        Ok(json) => format!("```json\n{json}\n```"),
        Err(e) => format!("An error occurred: {e}"),
    }
}

// ── Cleanup ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub attempted: usize,
    pub deleted: usize,
}

/// Delete up to `limit` recent messages of `channel_id`, sleeping `delay`
/// before each deletion. A failed deletion is answered on `command_id` and
/// the loop moves on.
pub async fn purge_history<P: ChatPlatform>(
    platform: &P,
    channel_id: u64,
    command_id: u64,
    limit: usize,
    delay: Duration,
) -> PurgeReport {
    let mut report = PurgeReport::default();
    if limit == 0 {
        return report;
    }

    let ids = match platform.recent_messages(channel_id, limit).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(channel_id, error = %e, "could not read channel history");
            return report;
        }
    };

    info!(channel_id, limit, found = ids.len(), "cleaning up messages");

    for message_id in ids.into_iter().take(limit) {
        tokio::time::sleep(delay).await;
        report.attempted += 1;
        match platform.delete(channel_id, message_id).await {
            Ok(()) => {
                debug!(channel_id, message_id, "message deleted");
                report.deleted += 1;
            }
            Err(e) => {
                warn!(channel_id, message_id, error = %e, "message deletion failed");
                if let Err(e) = platform.reply(channel_id, command_id, DELETE_FAILED_NOTICE).await {
                    warn!(channel_id, error = %e, "reply failed");
                }
            }
        }
    }

    report
}
