//! Normalizes the list formatting of a response segment so free-form model
//! output renders consistently on Discord: bullet markers are canonicalized
//! to `- `, wrapped list lines are re-indented as continuations, and fenced
//! code passes through untouched.

use regex::Regex;
use std::sync::LazyLock;

/// Matches an ordered-list prefix such as `1. ` or `42. `.
static ORDERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("ordered-list pattern is valid"));

/// Rewrites one segment's list formatting. Idempotent: applying it twice
/// yields the same string as applying it once.
///
/// Line rules, scanned top to bottom with fence and list state:
/// - inside a fence, every line passes through unchanged;
/// - a heading leaves any list and passes through;
/// - `- ` items pass through, `* ` and `N. ` items are rewritten to `- `
///   (keeping their indentation);
/// - a non-empty unprefixed line inside a list becomes a two-space-indented
///   continuation of the previous bullet;
/// - anything else passes through and leaves the list.
pub fn normalize(segment: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut in_list = false;

    for line in segment.split('\n') {
        if line.trim().starts_with("```") {
            in_fence = !in_fence;
            lines.push(line.to_string());
            continue;
        }
        if in_fence {
            lines.push(line.to_string());
            continue;
        }

        let content = line.trim_start();
        let indent = &line[..line.len() - content.len()];

        if content.starts_with('#') {
            in_list = false;
            lines.push(line.to_string());
        } else if content.starts_with("- ") {
            in_list = true;
            lines.push(line.to_string());
        } else if let Some(rest) = content.strip_prefix("* ") {
            in_list = true;
            lines.push(format!("{indent}- {rest}"));
        } else if let Some(found) = ORDERED_PREFIX.find(content) {
            in_list = true;
            lines.push(format!("{indent}- {}", &content[found.end()..]));
        } else if in_list && !content.is_empty() {
            // A wrapped continuation of the previous bullet, not a new one.
            lines.push(format!("  {}", content.trim_end()));
        } else {
            in_list = false;
            lines.push(line.to_string());
        }
    }

    lines.join("\n")
}
