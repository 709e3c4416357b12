//! Defines the `/set_model` command for choosing the user's preferred AI
//! model, with autocompletion over the models the local server reports.

use futures::{Stream, StreamExt};
use ollama_rs::models::LocalModel;
use tracing::{debug, error, info, warn};

use crate::utils::database::UserPreference;
use crate::utils::ollama_client::OLLAMA_CLIENT;

use super::*;

/// Choose which AI model answers your prompts
#[poise::command(slash_command, category = "AI")]
pub async fn set_model(
    ctx: Context<'_>,
    #[description = "The model to use"]
    #[autocomplete = "autocomplete_model"]
    model: String,
) -> CommandResult {
    let author = ctx.author();
    debug!("Set model request received from user {}", author.name);

    ctx.defer().await?;

    // Validate the choice against what the server actually has.
    let models = available_models().await;
    if !models.iter().any(|m| m.name == model) {
        warn!(
            "User {} attempted to set invalid model: {}",
            author.name, model
        );
        ctx.say(format!(
            "Model '{model}' is not available. Use `/list_models` to see the available models."
        ))
        .await?;
        return Ok(());
    }

    let pref = UserPreference {
        user_id: author.id.to_string(),
        username: author.name.clone(),
        model: model.clone(),
    };

    match database::set_user_preference(&pref) {
        Ok(_) => {
            info!("Set model preference for {} to '{}'", author.name, model);
            ctx.say(format!("Your preferred model has been set to '{model}'"))
                .await?;
        }
        Err(e) => {
            error!("Failed to set model preference for {}: {e}", author.name);
            ctx.say(format!("Failed to set model preference: {e}"))
                .await?;
        }
    }

    Ok(())
}

/// The models the local server reports, or none when it cannot be reached.
async fn available_models() -> Vec<LocalModel> {
    match OLLAMA_CLIENT.clone().list_models().await {
        Ok(models) => models,
        Err(e) => {
            error!("Error listing local models: {e}");
            Vec::new()
        }
    }
}

/// Autocomplete for the `model` argument: available models whose names
/// start with the partial input.
async fn autocomplete_model<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Stream<Item = String> + 'a {
    let models = available_models().await;

    futures::stream::iter(models)
        .filter(move |model| futures::future::ready(model.name.starts_with(partial)))
        .map(|model| model.name)
}
