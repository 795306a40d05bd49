//! Chunk-summarize-merge pipeline.
//!
//! raw text → chunker → {per-segment model call}* → (if more than one segment)
//! fusion call → final text.

pub mod chunker;
pub mod orchestrator;
pub mod profile;
pub mod types;

pub use chunker::{split, split_lines};
pub use orchestrator::{MIN_SEGMENT_WORDS, Summarizer, merge_partials, per_segment_budget};
pub use profile::{ProfileKind, SplitMode, SummaryConfig, SummaryProfile};
pub use types::{
    Document, EMPTY_RESULT, FinalResult, NO_USABLE_CONTENT, PartialResult, Segment, SummaryOutcome,
};
