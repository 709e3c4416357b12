//! This module aggregates various utility submodules used throughout the application.

/// Web search and page scraping via the Brave Search API.
#[cfg(feature = "web_search")]
pub(crate) mod brave;
/// SQLite persistence for user and channel settings.
pub(crate) mod database;
/// Segmented, rate-paced message delivery.
pub(crate) mod delivery;
/// List/fence normalization of response segments.
pub(crate) mod markdown;
/// Attachment classification and download.
pub(crate) mod media;
/// The Ollama chat client and its sessions.
pub(crate) mod ollama_client;
/// Markdown-aware response segmentation.
pub(crate) mod segmenter;
/// Per-channel session and per-user cooldown state.
pub(crate) mod sessions;
