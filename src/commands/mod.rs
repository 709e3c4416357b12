//! This module aggregates all the command modules for the bot.

/// Commands related to AI interactions (e.g., chat, model management).
pub(crate) mod ai;
/// General purpose commands (e.g., ping, channel activation).
pub(crate) mod general;
