//! CV summaries.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::documents::{DocumentError, clean_cv_text, read_cv_file};
use crate::summarize::{Document, SummaryConfig, SummaryOutcome, SummaryProfile, Summarizer};

/// Result of summarizing one CV.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSummary {
    /// Where the CV came from.
    pub origin: String,
    /// Word budget of the summary.
    pub target_words: usize,
    /// Summary text or placeholder.
    pub summary: String,
    /// `true` when the model produced the summary.
    pub success: bool,
    /// Number of segments summarized.
    pub segments: usize,
}

/// Summarizes CVs with line-preserving segmentation.
#[derive(Clone)]
pub struct CvSummarizer {
    summarizer: Summarizer,
    profile: SummaryProfile,
}

impl CvSummarizer {
    /// Create a CV summarizer.
    #[must_use]
    pub fn new(summarizer: Summarizer, config: SummaryConfig) -> Self {
        Self {
            summarizer,
            profile: SummaryProfile::cv(config),
        }
    }

    /// Default word budget.
    #[must_use]
    pub const fn default_target_words(&self) -> usize {
        self.profile.config.target_words
    }

    /// Summarize CV text.
    pub async fn summarize_text(&self, text: &str, origin: &str, target_words: usize) -> CvSummary {
        let document = Document::new(clean_cv_text(text), origin);
        let outcome = self
            .summarizer
            .summarize_document(&document, &self.profile, target_words)
            .await;
        let (success, segments) = match &outcome {
            SummaryOutcome::Summarized(result) => (true, result.segment_count()),
            _ => (false, 0),
        };
        CvSummary {
            origin: origin.to_string(),
            target_words,
            summary: outcome.into_text(),
            success,
            segments,
        }
    }

    /// Read a CV file and summarize it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub async fn summarize_file(
        &self,
        path: impl AsRef<Path>,
        target_words: usize,
    ) -> Result<CvSummary, DocumentError> {
        let path = path.as_ref();
        let text = read_cv_file(path).await?;
        Ok(self
            .summarize_text(&text, &path.display().to_string(), target_words)
            .await)
    }
}
