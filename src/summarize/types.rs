//! Per-request entities of the chunk/summarize/merge pipeline.

use serde::Serialize;
use uuid::Uuid;

use crate::llm::DEGRADED_MESSAGE;

/// Reply when the acquired text is empty.
pub const NO_USABLE_CONTENT: &str = "No usable content found.";

/// Placeholder substituted for an empty model answer.
pub const EMPTY_RESULT: &str = "(empty result)";

/// Raw input text with a free-form origin label (URL, file path...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Correlation id for logs.
    pub id: Uuid,
    /// Full text.
    pub content: String,
    /// Where the text came from.
    pub origin: String,
}

impl Document {
    /// Capture a document.
    #[must_use]
    pub fn new(content: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            origin: origin.into(),
        }
    }

    /// Whether there is anything to summarize.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A bounded slice of a document, 1-indexed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Position, starting at 1.
    pub index: usize,
    /// Number of segments in the document.
    pub total: usize,
    /// Segment text.
    pub text: String,
}

impl Segment {
    /// Display label, e.g. `[segment 2/3]`.
    #[must_use]
    pub fn label(&self) -> String {
        segment_label(self.index, self.total)
    }
}

/// Model output for one segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartialResult {
    /// Index of the source segment.
    pub index: usize,
    /// Total segment count.
    pub total: usize,
    /// Model text, or the failure text of that call.
    pub text: String,
}

impl PartialResult {
    /// Display label, e.g. `[segment 2/3]`.
    #[must_use]
    pub fn label(&self) -> String {
        segment_label(self.index, self.total)
    }
}

/// Result of the whole pipeline for a non-empty document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinalResult {
    /// One segment: its partial result, unmodified.
    Single(PartialResult),
    /// Several segments merged by a fusion call.
    Fused {
        /// Fusion output.
        text: String,
        /// Inputs of the fusion call, in segment order.
        partials: Vec<PartialResult>,
    },
}

impl FinalResult {
    /// Final text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Single(partial) => &partial.text,
            Self::Fused { text, .. } => text,
        }
    }

    /// Number of segments the document was split into.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Fused { partials, .. } => partials.len(),
        }
    }
}

/// What the orchestrator hands back to its caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The model produced a result (possibly containing failure text).
    Summarized(FinalResult),
    /// The document was empty; the model was not called.
    NoUsableContent,
    /// No model credential; the model was not called.
    Degraded,
}

impl SummaryOutcome {
    /// Text to show to the caller.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Summarized(result) => result.text(),
            Self::NoUsableContent => NO_USABLE_CONTENT,
            Self::Degraded => DEGRADED_MESSAGE,
        }
    }

    /// Consume the outcome into its text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Summarized(FinalResult::Single(partial)) => partial.text,
            Self::Summarized(FinalResult::Fused { text, .. }) => text,
            other => other.text().to_string(),
        }
    }
}

fn segment_label(index: usize, total: usize) -> String {
    format!("[segment {index}/{total}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let segment = Segment {
            index: 2,
            total: 3,
            text: String::new(),
        };
        assert_eq!(segment.label(), "[segment 2/3]");
    }

    #[test]
    fn test_outcome_texts() {
        assert_eq!(SummaryOutcome::NoUsableContent.text(), NO_USABLE_CONTENT);
        assert_eq!(SummaryOutcome::Degraded.into_text(), DEGRADED_MESSAGE);

        let fused = SummaryOutcome::Summarized(FinalResult::Fused {
            text: "merged".to_string(),
            partials: vec![],
        });
        assert_eq!(fused.text(), "merged");
    }

    #[test]
    fn test_blank_document() {
        assert!(Document::new("  \n\t", "x").is_blank());
        assert!(!Document::new("a", "x").is_blank());
    }
}
