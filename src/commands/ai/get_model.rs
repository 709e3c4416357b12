use tracing::debug;

use super::*;

/// Show which AI model answers your prompts
#[poise::command(slash_command, category = "AI")]
pub async fn get_model(ctx: Context<'_>) -> CommandResult {
    let author = ctx.author();
    debug!("Get model request received from user {}", author.name);

    ctx.defer().await?;

    match database::get_user_model(author) {
        Some(model) => {
            ctx.say(format!("Your currently active model is: **{model}**"))
                .await?;
        }
        None => {
            ctx.say("You do not have a model set and no default model is available.")
                .await?;
        }
    }

    Ok(())
}
