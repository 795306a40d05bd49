//! Chunk, summarize each segment, fuse.

use tracing::{Instrument, debug, info, info_span};

use super::profile::SummaryProfile;
use super::types::{Document, EMPTY_RESULT, FinalResult, PartialResult, Segment, SummaryOutcome};
use crate::llm::ModelClient;

/// Lower bound of the per-segment word budget.
pub const MIN_SEGMENT_WORDS: usize = 50;

/// Word budget requested for each partial summary.
///
/// `max(50, floor(target_words * damping / segment_count))`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn per_segment_budget(target_words: usize, damping: f64, segment_count: usize) -> usize {
    let count = segment_count.max(1) as f64;
    let raw = (target_words as f64 * damping / count).floor();
    let budget = if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        0
    };
    budget.max(MIN_SEGMENT_WORDS)
}

/// Join partial results into the fusion input, each under its label.
#[must_use]
pub fn merge_partials(partials: &[PartialResult]) -> String {
    partials
        .iter()
        .map(|p| format!("{}\n{}", p.label(), p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs the chunk/summarize/merge pipeline against a [`ModelClient`].
///
/// Segments are processed one after the other inside the caller's task.
/// Dropping the returned future abandons the in-flight call and every
/// partial computed so far.
#[derive(Clone)]
pub struct Summarizer {
    client: ModelClient,
}

impl Summarizer {
    /// Create a summarizer over a model client.
    #[must_use]
    pub const fn new(client: ModelClient) -> Self {
        Self { client }
    }

    /// Underlying model client.
    #[must_use]
    pub const fn client(&self) -> &ModelClient {
        &self.client
    }

    /// Summarize a whole document.
    ///
    /// Empty documents and degraded mode short-circuit without any remote call.
    pub async fn summarize_document(
        &self,
        document: &Document,
        profile: &SummaryProfile,
        target_words: usize,
    ) -> SummaryOutcome {
        if document.is_blank() {
            info!(origin = %document.origin, "no usable content, skipping model");
            return SummaryOutcome::NoUsableContent;
        }
        if !self.client.is_available() {
            return SummaryOutcome::Degraded;
        }

        let span = info_span!("summarize", document = %document.id, kind = ?profile.kind);
        async {
            let segments = profile.split(&document.content);
            info!(
                chars = document.content.chars().count(),
                segments = segments.len(),
                origin = %document.origin,
                "document split"
            );

            if let [segment] = segments.as_slice() {
                let text = self
                    .summarize_segment(segment, &document.origin, target_words, profile)
                    .await;
                return SummaryOutcome::Summarized(FinalResult::Single(PartialResult {
                    index: segment.index,
                    total: segment.total,
                    text,
                }));
            }

            let budget = per_segment_budget(target_words, profile.config.damping, segments.len());
            let mut partials = Vec::with_capacity(segments.len());
            for segment in &segments {
                info!("analysing segment {}/{}", segment.index, segment.total);
                let text = self
                    .summarize_segment(segment, &document.origin, budget, profile)
                    .await;
                partials.push(PartialResult {
                    index: segment.index,
                    total: segment.total,
                    text,
                });
            }

            let text = self.fuse(&partials, target_words, profile).await;
            SummaryOutcome::Summarized(FinalResult::Fused { text, partials })
        }
        .instrument(span)
        .await
    }

    /// Summarize one segment. Never returns an empty string.
    pub async fn summarize_segment(
        &self,
        segment: &Segment,
        origin: &str,
        target_words: usize,
        profile: &SummaryProfile,
    ) -> String {
        let prompt = profile.segment_prompt(&segment.text, origin, target_words);
        debug!(segment = segment.index, target_words, "segment request");
        let text = self
            .client
            .complete(&profile.system_prompt, &prompt, &profile.params())
            .await;
        non_empty(text)
    }

    /// Merge several partial results into one bounded synthesis.
    pub async fn fuse(
        &self,
        partials: &[PartialResult],
        target_words: usize,
        profile: &SummaryProfile,
    ) -> String {
        let prompt = profile.fusion_prompt(&merge_partials(partials), target_words);
        info!(partials = partials.len(), target_words, "fusing partial results");
        let text = self
            .client
            .complete(&profile.system_prompt, &prompt, &profile.params())
            .await;
        non_empty(text)
    }
}

fn non_empty(text: String) -> String {
    if text.is_empty() {
        EMPTY_RESULT.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::llm::client::testing::{RecordingBackend, keyed_config};
    use crate::llm::{DEGRADED_MESSAGE, LlmConfig, LlmError};
    use crate::summarize::profile::SummaryConfig;
    use crate::summarize::types::NO_USABLE_CONTENT;

    fn company_profile(limit: usize) -> SummaryProfile {
        SummaryProfile::company(SummaryConfig {
            chunk_char_limit: limit,
            ..SummaryConfig::company()
        })
    }

    fn summarizer(backend: &Arc<RecordingBackend>) -> Summarizer {
        Summarizer::new(ModelClient::new(&keyed_config(), backend.clone()))
    }

    #[test]
    fn test_budget_formula() {
        assert_eq!(per_segment_budget(300, 0.7, 3), 70);
        assert_eq!(per_segment_budget(250, 0.6, 2), 75);
        assert_eq!(per_segment_budget(300, 0.7, 10), 50);
        assert_eq!(per_segment_budget(0, 0.7, 1), 50);
        assert_eq!(per_segment_budget(10_000, 0.7, 1_000_000), 50);
        assert_eq!(per_segment_budget(1000, 0.7, 0), 700);
    }

    #[test]
    fn test_merge_partials_labels_each_result() {
        let partials = vec![
            PartialResult {
                index: 1,
                total: 2,
                text: "A".to_string(),
            },
            PartialResult {
                index: 2,
                total: 2,
                text: "B".to_string(),
            },
        ];
        assert_eq!(merge_partials(&partials), "[segment 1/2]\nA\n\n[segment 2/2]\nB");
    }

    #[tokio::test]
    async fn test_twelve_thousand_chars_three_segments_then_fusion() {
        let backend = Arc::new(RecordingBackend::replying("partial"));
        let text = "abcdefghijk ".repeat(1000);
        let document = Document::new(text, "https://acme.test");

        let outcome = summarizer(&backend)
            .summarize_document(&document, &company_profile(5000), 300)
            .await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 4);
        for request in &requests[..3] {
            assert!(request.user_text().unwrap().contains("~70 mots"));
        }
        let fusion = requests[3].user_text().unwrap();
        assert!(fusion.contains("300 mots max"));
        assert!(fusion.contains("[segment 1/3]\npartial"));
        assert!(fusion.contains("[segment 3/3]\npartial"));

        match outcome {
            SummaryOutcome::Summarized(FinalResult::Fused { text, partials }) => {
                assert_eq!(text, "partial");
                assert_eq!(partials.len(), 3);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_model() {
        let backend = Arc::new(RecordingBackend::replying("x"));
        let outcome = summarizer(&backend)
            .summarize_document(&Document::new("  \n ", "empty"), &company_profile(5000), 300)
            .await;

        assert_eq!(outcome, SummaryOutcome::NoUsableContent);
        assert_eq!(outcome.text(), NO_USABLE_CONTENT);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_on_one_segment_still_fuses() {
        let backend = Arc::new(RecordingBackend::scripted(
            vec![
                Ok("first".to_string()),
                Err(LlmError::Timeout(Duration::from_secs(30))),
                Ok("third".to_string()),
                Ok("fused".to_string()),
            ],
            "unused",
        ));
        let document = Document::new("alpha beta gamma", "doc");

        let outcome = summarizer(&backend)
            .summarize_document(&document, &company_profile(5), 300)
            .await;

        assert_eq!(backend.calls(), 4);
        let SummaryOutcome::Summarized(FinalResult::Fused { text, partials }) = outcome else {
            panic!("expected a fused result");
        };
        assert_eq!(text, "fused");
        let partial_texts: Vec<&str> = partials.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            partial_texts,
            vec!["first", "Network error: request timed out after 30s", "third"]
        );

        let fusion_input = backend.requests()[3].user_text().unwrap().to_string();
        assert!(fusion_input.contains("[segment 2/3]\nNetwork error: request timed out"));
    }

    #[tokio::test]
    async fn test_missing_credential_is_degraded_without_calls() {
        let backend = Arc::new(RecordingBackend::replying("x"));
        let client = ModelClient::new(&LlmConfig::default(), backend.clone());
        let summarizer = Summarizer::new(client);

        let long = "word ".repeat(5000);
        for text in ["short", long.as_str()] {
            let outcome = summarizer
                .summarize_document(&Document::new(text, "doc"), &company_profile(100), 300)
                .await;
            assert_eq!(outcome.text(), DEGRADED_MESSAGE);
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_segment_skips_fusion() {
        let backend = Arc::new(RecordingBackend::replying("only"));
        let outcome = summarizer(&backend)
            .summarize_document(&Document::new("tiny page", "doc"), &company_profile(5000), 300)
            .await;

        assert_eq!(backend.calls(), 1);
        assert!(backend.requests()[0].user_text().unwrap().contains("~300 mots"));
        assert_eq!(
            outcome,
            SummaryOutcome::Summarized(FinalResult::Single(PartialResult {
                index: 1,
                total: 1,
                text: "only".to_string(),
            }))
        );
    }

    #[tokio::test]
    async fn test_empty_answer_gets_placeholder() {
        let backend = Arc::new(RecordingBackend::replying("   "));
        let outcome = summarizer(&backend)
            .summarize_document(&Document::new("tiny page", "doc"), &company_profile(5000), 300)
            .await;
        assert_eq!(outcome.text(), EMPTY_RESULT);
    }
}
