//! Discord gateway channel.
//!
//! Translates serenity events into [`BotEvent`]s, runs the resulting actions
//! through [`SerenityPlatform`], and drives the joke loop once the gateway
//! is ready. Cancelling the shutdown token closes every shard.

mod platform;

pub use platform::SerenityPlatform;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{
    ActivityData, ChannelId, ChannelType, Client, Context, EventHandler, GatewayIntents, GuildId, Mentionable,
    Message, MessageId, MessageUpdateEvent, PartialMember, Permissions, Ready, User, UserId,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::error::AppError;
use crate::subsystems::bot::jokes::{self, ChannelSnapshot, MemberSnapshot};
use crate::subsystems::bot::{Author, BotContext, BotEvent, IncomingMessage, Scope, execute, handle_event};
use crate::subsystems::runtime::{Component, ComponentFuture};

// ── DiscordChannel ───────────────────────────────────────────────────────────

pub struct DiscordChannel {
    channel_id: String,
    token: String,
    bot: Arc<BotContext>,
}

impl DiscordChannel {
    pub fn new(channel_id: impl Into<String>, token: impl Into<String>, bot: Arc<BotContext>) -> Self {
        Self { channel_id: channel_id.into(), token: token.into(), bot }
    }
}

impl Component for DiscordChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_discord(self.channel_id, self.token, self.bot, shutdown))
    }
}

/// Gateway intents; member events only when the joke loop needs them.
pub fn intents(config: &BotConfig) -> GatewayIntents {
    let mut intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    if config.jokes.enabled {
        intents |= GatewayIntents::GUILD_MEMBERS;
    }
    intents
}

async fn run_discord(
    channel_id: String,
    token: String,
    bot: Arc<BotContext>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let handler = Handler {
        intents: intents(&bot.config),
        bot,
        joke_loop_started: AtomicBool::new(false),
        shutdown: shutdown.clone(),
    };

    let mut client = Client::builder(&token, handler.intents)
        .event_handler(handler)
        .await
        .map_err(|e| AppError::Discord(format!("client setup failed: {e}")))?;
    let shard_manager = client.shard_manager.clone();

    info!(%channel_id, "discord channel starting");

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received, closing discord shards");
            shard_manager.shutdown_all().await;
            Ok(())
        }
        res = client.start() => {
            res.map_err(|e| AppError::Discord(format!("gateway client stopped: {e}")))
        }
    }
}

// ── Event handler ────────────────────────────────────────────────────────────

struct Handler {
    bot: Arc<BotContext>,
    intents: GatewayIntents,
    joke_loop_started: AtomicBool,
    shutdown: CancellationToken,
}

impl Handler {
    async fn dispatch(&self, ctx: &Context, event: BotEvent) {
        let actions = handle_event(&event, &self.bot);
        if actions.is_empty() {
            return;
        }
        debug!(count = actions.len(), "running actions");
        let platform = SerenityPlatform::new(ctx.http.clone());
        execute(&platform, &self.bot, actions).await;
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, id = %ready.user.id, guilds = ready.guilds.len(), "discord session ready");

        if self.bot.config.jokes.enabled && !self.joke_loop_started.swap(true, Ordering::SeqCst) {
            info!(
                interval_secs = self.bot.config.jokes.interval.as_secs(),
                channel = %self.bot.config.jokes.channel_name,
                member_intent = self.intents.contains(GatewayIntents::GUILD_MEMBERS),
                "starting joke loop"
            );
            tokio::spawn(joke_loop(ctx, self.bot.clone(), self.shutdown.clone()));
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let incoming = incoming(
            &ctx,
            MessageRef {
                id: msg.id,
                channel_id: msg.channel_id,
                guild_id: msg.guild_id,
                author: &msg.author,
                content: &msg.content,
                member: msg.member.as_deref(),
            },
        );
        self.dispatch(&ctx, BotEvent::MessageCreated(incoming)).await;
    }

    async fn message_update(
        &self,
        ctx: Context,
        _old_if_available: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        // Embed resolution also fires updates; only content edits count.
        let Some(content) = event.content.as_deref() else { return };

        let incoming = match (&new, &event.author) {
            (Some(msg), _) => incoming(
                &ctx,
                MessageRef {
                    id: msg.id,
                    channel_id: msg.channel_id,
                    guild_id: msg.guild_id,
                    author: &msg.author,
                    content,
                    member: msg.member.as_deref(),
                },
            ),
            (None, Some(author)) => incoming(
                &ctx,
                MessageRef {
                    id: event.id,
                    channel_id: event.channel_id,
                    guild_id: event.guild_id,
                    author,
                    content,
                    member: None,
                },
            ),
            (None, None) => return,
        };
        self.dispatch(&ctx, BotEvent::MessageEdited(incoming)).await;
    }
}

// ── Translation ──────────────────────────────────────────────────────────────

struct MessageRef<'a> {
    id: MessageId,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
    author: &'a User,
    content: &'a str,
    member: Option<&'a PartialMember>,
}

fn incoming(ctx: &Context, msg: MessageRef<'_>) -> IncomingMessage {
    let bot_id = ctx.cache.current_user().id;
    IncomingMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author: Author {
            id: msg.author.id.get(),
            is_bot: msg.author.bot,
            is_self: msg.author.id == bot_id,
            mention: msg.author.mention().to_string(),
        },
        content: msg.content.to_string(),
        scope: scope_of(ctx, &msg, bot_id),
    }
}

/// Permissions come from the cache; an uncached guild or channel grants none.
fn scope_of(ctx: &Context, msg: &MessageRef<'_>, bot_id: UserId) -> Scope {
    let Some(guild_id) = msg.guild_id else { return Scope::Direct };
    let no_permissions = Scope::Guild { author_is_admin: false, bot_can_manage_messages: false };

    let Some(guild) = ctx.cache.guild(guild_id) else { return no_permissions };
    let channel = permission_channel(
        msg.channel_id,
        |id| guild.channels.contains_key(&id),
        |id| guild.threads.iter().find(|thread| thread.id == id).and_then(|thread| thread.parent_id),
    )
    .and_then(|id| guild.channels.get(&id));
    let Some(channel) = channel else { return no_permissions };

    let author = match (guild.members.get(&msg.author.id), msg.member) {
        (Some(member), _) => guild.user_permissions_in(channel, member),
        (None, Some(partial)) => guild.partial_member_permissions_in(channel, msg.author.id, partial),
        (None, None) => Permissions::empty(),
    };
    let bot = guild
        .members
        .get(&bot_id)
        .map(|member| guild.user_permissions_in(channel, member))
        .unwrap_or_else(Permissions::empty);

    Scope::Guild {
        author_is_admin: author.administrator(),
        bot_can_manage_messages: bot.manage_messages(),
    }
}

/// Channel whose overwrites apply to `channel_id`: the channel itself, or the
/// parent of a thread.
fn permission_channel(
    channel_id: ChannelId,
    is_channel: impl Fn(ChannelId) -> bool,
    thread_parent: impl Fn(ChannelId) -> Option<ChannelId>,
) -> Option<ChannelId> {
    if is_channel(channel_id) { Some(channel_id) } else { thread_parent(channel_id) }
}

// ── Joke loop ────────────────────────────────────────────────────────────────

async fn joke_loop(ctx: Context, bot: Arc<BotContext>, shutdown: CancellationToken) {
    let platform = SerenityPlatform::new(ctx.http.clone());
    let mut ticker = jokes::round_ticker(bot.config.jokes.interval);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        ctx.set_activity(Some(ActivityData::playing(bot.config.jokes.presence.clone())));
        let channels = channel_snapshots(&ctx, &bot.config.jokes.channel_name);
        let targets = jokes::plan_round(&channels, &bot.config.jokes);
        debug!(channels = channels.len(), targets = targets.len(), "joke round planned");

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = jokes::run_round(&platform, &bot, &targets) => {}
        }
    }

    info!("joke loop stopped");
}

/// Cached text channels named `name`, each with the members who can see it.
fn channel_snapshots(ctx: &Context, name: &str) -> Vec<ChannelSnapshot> {
    let mut snapshots = Vec::new();
    for guild_id in ctx.cache.guilds() {
        let Some(guild) = ctx.cache.guild(guild_id) else { continue };
        for channel in guild.channels.values() {
            if channel.kind != ChannelType::Text || channel.name != name {
                continue;
            }
            let members = guild
                .members
                .values()
                .filter(|member| guild.user_permissions_in(channel, member).view_channel())
                .map(|member| MemberSnapshot {
                    id: member.user.id.get(),
                    display_name: member.display_name().to_string(),
                    is_bot: member.user.bot,
                })
                .collect();
            snapshots.push(ChannelSnapshot { id: channel.id.get(), name: channel.name.clone(), members });
        }
    }
    snapshots
}
