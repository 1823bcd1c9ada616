//! Platform-neutral view of chat events and the actions the bot takes.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub is_bot: bool,
    /// The bot account itself.
    pub is_self: bool,
    /// Rendered mention, e.g. `<@123>`.
    pub mention: String,
}

/// Where a message was posted and what the parties may do there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Guild { author_is_admin: bool, bot_can_manage_messages: bool },
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: u64,
    pub channel_id: u64,
    pub author: Author,
    pub content: String,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    MessageCreated(IncomingMessage),
    MessageEdited(IncomingMessage),
}

/// One step for the executor, run in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send { channel_id: u64, content: String },
    Reply { channel_id: u64, message_id: u64, content: String },
    Delete { channel_id: u64, message_id: u64 },
    Pause(Duration),
    /// Extract a person description from `text` and reply with it.
    DescribePerson { channel_id: u64, message_id: u64, text: String },
    /// Delete up to `limit` recent messages, answering failures on `command_id`.
    Cleanup { channel_id: u64, command_id: u64, limit: usize },
}
