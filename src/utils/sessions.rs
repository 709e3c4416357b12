//! Mutable per-channel and per-user bookkeeping for the calling layer:
//! conversation sessions keyed by channel, and command cooldown timestamps
//! keyed by user and command. None of this state is visible to the
//! segmentation core.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use ollama_rs::generation::chat::ChatMessage;
use tracing::debug;

/// Messages retained per channel after the system prompt: ten exchanges.
const MAX_TURN_MESSAGES: usize = 20;

/// Per-channel conversation histories. A session exists only in memory and
/// starts from the configured system prompt.
pub struct SessionStore {
    system_prompt: String,
    histories: DashMap<u64, Mutex<Vec<ChatMessage>>>,
}

impl SessionStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            histories: DashMap::new(),
        }
    }

    /// Returns a copy of the channel's history, creating the session (seeded
    /// with the system prompt) on first use.
    pub fn get_or_create(&self, channel_id: u64) -> Vec<ChatMessage> {
        let entry = self.histories.entry(channel_id).or_insert_with(|| {
            debug!("Starting new conversation session for channel {channel_id}");
            Mutex::new(vec![ChatMessage::system(self.system_prompt.clone())])
        });
        let messages = entry.lock().unwrap();
        messages.clone()
    }

    /// Saves a channel's history back after an exchange, keeping the system
    /// prompt and at most the last [`MAX_TURN_MESSAGES`] messages.
    pub fn store(&self, channel_id: u64, mut history: Vec<ChatMessage>) {
        let overflow = history.len().saturating_sub(MAX_TURN_MESSAGES + 1);
        if overflow > 0 {
            history.drain(1..1 + overflow);
        }
        self.histories.insert(channel_id, Mutex::new(history));
    }

    /// Drops a channel's session. Returns whether one existed.
    pub fn clear(&self, channel_id: u64) -> bool {
        let existed = self.histories.remove(&channel_id).is_some();
        if existed {
            debug!("Cleared conversation session for channel {channel_id}");
        }
        existed
    }
}

/// Tracks the last use of a command per user and rejects re-use inside the
/// cooldown window, reporting the remaining wait.
pub struct CooldownTracker {
    window: Duration,
    last_use: DashMap<(u64, &'static str), Instant>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_use: DashMap::new(),
        }
    }

    /// Records a use of `command` by `user_id` unless its previous use is
    /// still inside the window, in which case the remaining wait is
    /// returned instead.
    pub fn try_acquire(&self, user_id: u64, command: &'static str) -> Result<(), Duration> {
        let key = (user_id, command);
        let remaining = self.last_use.get(&key).and_then(|last| {
            let elapsed = last.elapsed();
            (elapsed < self.window).then(|| self.window - elapsed)
        });
        if let Some(wait) = remaining {
            return Err(wait);
        }
        self.last_use.insert(key, Instant::now());
        Ok(())
    }
}
