use tracing::warn;

use crate::utils::ollama_client::OLLAMA_CLIENT;

use super::*;

/// Search the web and let the AI summarize what it finds
#[poise::command(slash_command, category = "AI")]
pub async fn search(
    ctx: Context<'_>,
    #[description = "Your search query"]
    #[rest]
    query: String,
) -> CommandResult {
    ctx.defer().await?;

    let author = ctx.author();
    let channel_id = ctx.channel_id().get();

    let results = match brave::search(&query).await {
        Ok(results) => results,
        Err(e) => {
            ctx.say(format!("Search failed: {e}")).await?;
            return Ok(());
        }
    };

    let mut briefing = brave::format_search_results(&results, &query);

    // Pull the first hit's page so the model can answer from the content,
    // not just the snippets. A failed scrape only loses the excerpt.
    if let Some(first) = results.first() {
        match brave::page_excerpt(&first.url).await {
            Ok(excerpt) if !excerpt.is_empty() => {
                briefing.push_str(&format!("**Content from <{}>**\n{excerpt}\n", first.url));
            }
            Ok(_) => {}
            Err(e) => warn!("Could not scrape {}: {e}", first.url),
        }
    }

    let prompt = format!(
        "Answer the question \"{query}\" using these search results. \
        Summarize the most relevant points and mention the sources you relied on:\n\n{briefing}"
    );

    let response = OLLAMA_CLIENT
        .clone()
        .chat(channel_id, author, &prompt, None)
        .await?;

    chunk_response(ctx, format!("**Search**: {query}\n\n{response}")).await
}
