use poise::serenity_prelude as serenity;
use std::time::Duration;

use crate::{CommandResult, Context};

/// Ping the bot to check its latency
#[poise::command(slash_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = shard_latency(&ctx).await.unwrap_or_default().as_millis();

    ctx.say(format!("Pong! Gateway latency: {latency} ms"))
        .await?;

    Ok(())
}

/// Latency reported by the shard runner this command arrived over.
async fn shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager().clone();
    let runners = shard_manager.runners.lock().await;
    let runner = runners.get(&serenity::ShardId(ctx.serenity_context().shard_id.0))?;

    runner.latency
}
