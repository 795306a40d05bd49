//! Document analyzers built on the summarization pipeline.

pub mod company;
pub mod cv;

pub use company::{CompanyAnalysis, CompanyAnalyzer, demo_page, demo_report};
pub use cv::{CvSummarizer, CvSummary};
