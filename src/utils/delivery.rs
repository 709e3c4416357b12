//! Paced delivery of a segmented response: the segmenter produces the
//! ordered sequence, this module applies the platform ceiling and the
//! inter-message pacing policy.

use std::time::Duration;

use serenity::all::{ChannelId, Http};
use tracing::debug;

use crate::utils::{markdown, segmenter};

/// Character ceiling for one outgoing message. Held below Discord's hard
/// 2000-character limit so the normalizer's continuation re-indents cannot
/// push a segment over it.
pub const MAX_MESSAGE_LENGTH: usize = 1900;

/// Minimum pause between consecutive messages of one response, to stay
/// clear of the platform's per-channel rate limit.
pub const SEND_DELAY: Duration = Duration::from_secs(1);

/// Splits a generated response at the platform ceiling and normalizes each
/// segment's list formatting. The returned order is the delivery order.
pub fn prepare_segments(text: &str) -> Vec<String> {
    segmenter::segment(text, MAX_MESSAGE_LENGTH)
        .iter()
        .map(|segment| markdown::normalize(segment))
        .collect()
}

/// Posts `segments` to `channel_id` in order, sleeping [`SEND_DELAY`]
/// between consecutive sends (never before the first).
pub async fn send_segments(
    http: &Http,
    channel_id: ChannelId,
    segments: &[String],
) -> serenity::Result<()> {
    debug!(
        "Delivering {} segment(s) to channel {}",
        segments.len(),
        channel_id
    );
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(SEND_DELAY).await;
        }
        channel_id.say(http, segment.as_str()).await?;
    }
    Ok(())
}
