//! Core types for scraping results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::{char_len, collapse_whitespace};

/// Below this many characters, assembled page text is treated as empty.
pub const MIN_MEANINGFUL_CHARS: usize = 10;

/// Text extracted from a fetched web page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageContent {
    /// Requested URL.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    /// `<title>` text.
    pub title: String,
    /// `meta[name=description]` content.
    pub meta_description: Option<String>,
    /// Visible body text, whitespace collapsed.
    pub text: String,
    /// When the page was fetched.
    pub scraped_at: DateTime<Utc>,
    /// Word count of `text`.
    pub word_count: usize,
}

impl PageContent {
    /// Title, description and body assembled into one cleaned string.
    ///
    /// Empty when nothing meaningful was extracted.
    #[must_use]
    pub fn combined_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.title.is_empty() {
            parts.push(format!("Title: {}", self.title));
        }
        if let Some(description) = &self.meta_description {
            parts.push(format!("Description: {description}"));
        }
        if !self.text.is_empty() {
            parts.push(format!("Content: {}", self.text));
        }
        clean_text(&parts.join("\n\n"))
    }
}

/// Collapse whitespace and drop text too short to be meaningful.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    if char_len(&collapsed) <= MIN_MEANINGFUL_CHARS {
        String::new()
    } else {
        collapsed
    }
}
