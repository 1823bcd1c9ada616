//! Event → action translation. No I/O happens here; the executor runs the
//! returned actions in order.

use tracing::debug;

use super::BotContext;
use super::command::{self, CommandError, CommandKind};
use super::event::{Action, BotEvent, IncomingMessage, Scope};

const PONG: &str = "pong";

pub fn handle_event(event: &BotEvent, ctx: &BotContext) -> Vec<Action> {
    match event {
        BotEvent::MessageCreated(msg) => on_message(msg, ctx),
        BotEvent::MessageEdited(msg) => on_edit(msg, ctx),
    }
}

fn on_message(msg: &IncomingMessage, ctx: &BotContext) -> Vec<Action> {
    if msg.author.is_self {
        return Vec::new();
    }

    if let Some(actions) = moderate(msg, ctx) {
        return actions;
    }

    let trigger = &ctx.config.message_trigger;
    if msg.content == trigger.on {
        return vec![send(msg, &trigger.reply)];
    }

    dispatch_command(msg, ctx)
}

fn on_edit(msg: &IncomingMessage, ctx: &BotContext) -> Vec<Action> {
    if msg.author.is_self {
        return Vec::new();
    }

    let trigger = &ctx.config.edit_trigger;
    if msg.content == trigger.on {
        return vec![send(msg, &trigger.reply)];
    }

    dispatch_command(msg, ctx)
}

// ── Moderation ───────────────────────────────────────────────────────────────

/// Delete-and-warn actions when the message contains a banned word.
fn moderate(msg: &IncomingMessage, ctx: &BotContext) -> Option<Vec<Action>> {
    let moderation = &ctx.config.moderation;
    let lowered = msg.content.to_lowercase();
    let word = moderation
        .banned_words
        .iter()
        .find(|w| !w.is_empty() && lowered.contains(w.as_str()))?;

    debug!(message_id = msg.id, author = msg.author.id, %word, "banned word found");

    let mut actions = Vec::with_capacity(moderation.warnings.len() + 3);
    if !moderation.delay.is_zero() {
        actions.push(Action::Pause(moderation.delay));
    }
    actions.push(Action::Delete { channel_id: msg.channel_id, message_id: msg.id });
    if !moderation.delay.is_zero() {
        actions.push(Action::Pause(moderation.delay));
    }
    actions.extend(
        moderation
            .warnings
            .iter()
            .map(|template| send(msg, &template.replace("{mention}", &msg.author.mention))),
    );
    Some(actions)
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn dispatch_command(msg: &IncomingMessage, ctx: &BotContext) -> Vec<Action> {
    if msg.author.is_bot {
        return Vec::new();
    }

    let invocation = match command::split_invocation(&ctx.config.command_prefix, &msg.content) {
        None => return Vec::new(),
        Some(Ok(invocation)) => invocation,
        Some(Err(e)) => {
            debug!(message_id = msg.id, error = %e, "command ignored");
            return Vec::new();
        }
    };

    let kind = invocation.kind;
    if !check_passes(kind, msg.scope) {
        debug!(command = kind.name(), scope = ?msg.scope, "command check failed");
        return Vec::new();
    }

    match kind {
        CommandKind::Ping => vec![reply(msg, PONG)],
        CommandKind::NewGaou => match command::required_text(invocation.rest, "parametre") {
            Ok(text) => vec![Action::DescribePerson {
                channel_id: msg.channel_id,
                message_id: msg.id,
                text,
            }],
            Err(e @ CommandError::MissingArgument(_)) => vec![reply(msg, &e.to_string())],
            Err(e) => {
                debug!(command = kind.name(), error = %e, "bad argument");
                Vec::new()
            }
        },
        CommandKind::Cleanup | CommandKind::DmCleanup => match command::required_count(invocation.rest, "limit") {
            Ok(limit) => vec![Action::Cleanup {
                channel_id: msg.channel_id,
                command_id: msg.id,
                limit,
            }],
            Err(e) => {
                debug!(command = kind.name(), error = %e, "bad argument");
                Vec::new()
            }
        },
    }
}

fn check_passes(kind: CommandKind, scope: Scope) -> bool {
    match (kind, scope) {
        (CommandKind::Ping | CommandKind::NewGaou, Scope::Guild { .. }) => true,
        (CommandKind::Cleanup, Scope::Guild { author_is_admin, bot_can_manage_messages }) => {
            author_is_admin && bot_can_manage_messages
        }
        (CommandKind::DmCleanup, Scope::Direct) => true,
        _ => false,
    }
}

fn send(msg: &IncomingMessage, content: &str) -> Action {
    Action::Send { channel_id: msg.channel_id, content: content.to_string() }
}

fn reply(msg: &IncomingMessage, content: &str) -> Action {
    Action::Reply { channel_id: msg.channel_id, message_id: msg.id, content: content.to_string() }
}
