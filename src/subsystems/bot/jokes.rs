//! Periodic joke round: pick members of the configured channels and post a
//! generated joke for each, one at a time.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use super::BotContext;
use super::executor::ChatPlatform;
use crate::config::JokeLoopConfig;
use crate::extract::{AdapterError, JokeRecord, extract_joke_record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub id: u64,
    pub display_name: String,
    pub is_bot: bool,
}

/// A text channel and the members who can see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub id: u64,
    pub name: String,
    pub members: Vec<MemberSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JokeTarget {
    pub channel_id: u64,
    pub member_id: u64,
    pub display_name: String,
}

/// Members to joke about this round, in channel then member order.
pub fn plan_round(channels: &[ChannelSnapshot], cfg: &JokeLoopConfig) -> Vec<JokeTarget> {
    channels
        .iter()
        .filter(|channel| channel.name == cfg.channel_name)
        .flat_map(|channel| {
            channel
                .members
                .iter()
                .filter(|member| !member.is_bot && matches_filter(&member.display_name, &cfg.member_filters))
                .map(|member| JokeTarget {
                    channel_id: channel.id,
                    member_id: member.id,
                    display_name: member.display_name.clone(),
                })
        })
        .collect()
}

fn matches_filter(display_name: &str, filters: &[String]) -> bool {
    let lowered = display_name.to_lowercase();
    filters.iter().any(|f| !f.is_empty() && lowered.contains(f.as_str()))
}

/// Ticker for the joke loop. The first tick is immediate; a round that
/// outlasts `period` pushes the next one a full period past its end.
pub fn round_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

pub fn joke_message(member_id: u64, joke: &JokeRecord) -> String {
    format!("<@{member_id}> {} ({})", joke.joke_text, joke.language)
}

/// Post one joke per target, pausing between targets. Returns the number of
/// jokes sent; failures are logged and skipped.
pub async fn run_round<P: ChatPlatform>(platform: &P, ctx: &BotContext, targets: &[JokeTarget]) -> usize {
    let cfg = &ctx.config.jokes;
    let mut sent = 0;

    for (i, target) in targets.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(cfg.pause).await;
        }

        let joke = match joke_for(ctx, &target.display_name).await {
            Ok(joke) => joke,
            Err(e) => {
                warn!(member = %target.display_name, error = %e, "joke extraction failed");
                continue;
            }
        };

        match platform.send(target.channel_id, &joke_message(target.member_id, &joke)).await {
            Ok(()) => sent += 1,
            Err(e) => warn!(channel_id = target.channel_id, error = %e, "joke send failed"),
        }
    }

    info!(targets = targets.len(), sent, "joke round finished");
    sent
}

async fn joke_for(ctx: &BotContext, subject: &str) -> Result<JokeRecord, AdapterError> {
    let client = ctx.adapter.client(ctx.config.model)?;
    extract_joke_record(&client, subject, &ctx.config.jokes.options).await
}
