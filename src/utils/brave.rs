//! Web search via the Brave Search API, plus a page-excerpt helper that
//! scrapes the readable text of a result so the model can answer from the
//! page itself. Requires the `web_search` feature and the `BRAVE_API_KEY`
//! environment variable.

use std::env;

use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Production endpoint of the Brave Search API.
const BRAVE_API_URL: &str = "https://api.search.brave.com";

/// How many results a formatted briefing includes.
const MAX_FORMATTED_RESULTS: usize = 5;

/// Character cap on a scraped page excerpt.
const EXCERPT_CHAR_LIMIT: usize = 5000;

/// Errors raised by search and scrape calls.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    #[error("BRAVE_API_KEY not found in environment variables")]
    MissingApiKey,

    #[error("No search results found")]
    NoResults,

    #[error("Unable to extract page content: {0}")]
    Scrape(String),
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub web: WebResults,
}

#[derive(Debug, Deserialize)]
pub struct WebResults {
    pub results: Vec<WebResult>,
}

/// One web search hit.
#[derive(Debug, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Searches the web with the API key from the environment.
pub async fn search(query: &str) -> Result<Vec<WebResult>, SearchError> {
    let api_key = env::var("BRAVE_API_KEY").map_err(|_| SearchError::MissingApiKey)?;
    search_at(query, BRAVE_API_URL, &api_key).await
}

/// Searches the web against an explicit endpoint.
pub async fn search_at(
    query: &str,
    base_url: &str,
    api_key: &str,
) -> Result<Vec<WebResult>, SearchError> {
    let url = format!("{base_url}/res/v1/web/search");
    debug!("Searching the web for '{query}'");

    let client = Client::new();
    let response = client
        .get(&url)
        .query(&[("q", query)])
        .header("Accept", "application/json")
        .header("X-Subscription-Token", api_key)
        .send()
        .await?
        .error_for_status()?;

    let search_response: SearchResponse = response.json().await?;

    if search_response.web.results.is_empty() {
        return Err(SearchError::NoResults);
    }

    Ok(search_response.web.results)
}

/// Fetches `url` and extracts the text of its paragraph and heading
/// elements, capped at [`EXCERPT_CHAR_LIMIT`] characters.
pub async fn page_excerpt(url: &str) -> Result<String, SearchError> {
    let response = Client::new()
        .get(url)
        .header("User-Agent", "Mozilla/5.0 (compatible; ParleyBot/1.0)")
        .send()
        .await?
        .error_for_status()?;
    let body = response.text().await?;
    extract_readable_text(&body)
}

fn extract_readable_text(html: &str) -> Result<String, SearchError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("p, h1, h2, h3").map_err(|err| SearchError::Scrape(err.to_string()))?;

    let mut content = String::new();
    for element in document.select(&selector) {
        let text = element.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            content.push_str(text);
            content.push('\n');
        }
    }

    Ok(content.chars().take(EXCERPT_CHAR_LIMIT).collect())
}

/// Formats search hits as a markdown bullet list the model (and the list
/// normalizer downstream) can work with.
pub fn format_search_results(results: &[WebResult], query: &str) -> String {
    let mut formatted = format!("**Search results for \"{query}\"**\n\n");

    for (i, result) in results.iter().take(MAX_FORMATTED_RESULTS).enumerate() {
        formatted.push_str(&format!(
            "- **{}. {}**\n  {}\n  Source: <{}>\n\n",
            i + 1,
            result.title,
            result.description,
            result.url
        ));
    }

    formatted
}
