//! Size-bounded text segmentation.
//!
//! Lengths are counted in characters. A single unit (word or line) longer than
//! the limit is kept whole in its own oversized segment.

use super::types::Segment;
use crate::text::char_len;

/// Split on word boundaries into segments of at most `limit` characters.
///
/// Text that already fits is returned unchanged as a single segment.
/// Otherwise tokens are re-joined with single spaces.
#[must_use]
pub fn split(text: &str, limit: usize) -> Vec<Segment> {
    if char_len(text) <= limit {
        return number(vec![text.to_string()]);
    }
    number(pack(text.split_whitespace(), " ", limit))
}

/// Split on line boundaries, keeping line structure inside each segment.
///
/// Lines are trimmed and empty lines dropped.
#[must_use]
pub fn split_lines(text: &str, limit: usize) -> Vec<Segment> {
    let text = text.trim();
    if char_len(text) <= limit {
        return number(vec![text.to_string()]);
    }
    let lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    number(pack(lines, "\n", limit))
}

/// Greedily accumulate units until the next one would overflow `limit`.
fn pack<'a>(units: impl Iterator<Item = &'a str>, separator: &str, limit: usize) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit_len = char_len(unit);
        if current.is_empty() {
            current.push_str(unit);
            current_len = unit_len;
        } else if current_len + separator_len + unit_len > limit {
            pieces.push(std::mem::take(&mut current));
            current.push_str(unit);
            current_len = unit_len;
        } else {
            current.push_str(separator);
            current.push_str(unit);
            current_len += separator_len + unit_len;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn number(pieces: Vec<String>) -> Vec<Segment> {
    if pieces.is_empty() {
        return vec![Segment {
            index: 1,
            total: 1,
            text: String::new(),
        }];
    }
    let total = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Segment {
            index: i + 1,
            total,
            text,
        })
        .collect()
}
