//! [`ChatPlatform`] over the serenity HTTP client.

use std::sync::Arc;

use serenity::all::{ChannelId, CreateMessage, GetMessages, Http, MessageId};

use crate::subsystems::bot::{ChatPlatform, PlatformError};

/// Largest page the history endpoint returns.
const HISTORY_PAGE: usize = 100;

#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn platform_err(e: serenity::Error) -> PlatformError {
    PlatformError(e.to_string())
}

impl ChatPlatform for SerenityPlatform {
    async fn send(&self, channel_id: u64, content: &str) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .say(&*self.http, content)
            .await
            .map(|_| ())
            .map_err(platform_err)
    }

    async fn reply(&self, channel_id: u64, message_id: u64, content: &str) -> Result<(), PlatformError> {
        let channel = ChannelId::new(channel_id);
        let message = CreateMessage::new()
            .content(content)
            .reference_message((channel, MessageId::new(message_id)));
        channel
            .send_message(&*self.http, message)
            .await
            .map(|_| ())
            .map_err(platform_err)
    }

    async fn delete(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .delete_message(&*self.http, MessageId::new(message_id))
            .await
            .map_err(platform_err)
    }

    async fn recent_messages(&self, channel_id: u64, limit: usize) -> Result<Vec<u64>, PlatformError> {
        let channel = ChannelId::new(channel_id);
        let mut ids = Vec::with_capacity(limit.min(10 * HISTORY_PAGE));
        let mut before: Option<MessageId> = None;

        while ids.len() < limit {
            let want = (limit - ids.len()).min(HISTORY_PAGE);
            let mut request = GetMessages::new().limit(want as u8);
            if let Some(before) = before {
                request = request.before(before);
            }

            let page = channel.messages(&*self.http, request).await.map_err(platform_err)?;
            let Some(oldest) = page.last() else { break };
            before = Some(oldest.id);
            let fetched = page.len();
            ids.extend(page.iter().map(|m| m.id.get()));
            if fetched < want {
                break;
            }
        }

        Ok(ids)
    }
}
