//! Application state shared across all request handlers.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::analysis::{CompanyAnalyzer, CvSummarizer};
use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::llm::{LlmError, ModelClient};
use crate::scraping::{LinkedInScraper, ProfileTextParser, ScrapingError, WebsiteScraper};
use crate::summarize::Summarizer;
use crate::transcription::{SpeechPipeline, TranscriptionError};

/// Failures while assembling the state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Model client.
    #[error("model client: {0}")]
    Llm(#[from] LlmError),
    /// Scrapers.
    #[error("scraper: {0}")]
    Scraping(#[from] ScrapingError),
    /// Speech-to-text.
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
}

/// Shared application state. Immutable once built.
pub struct AppState {
    /// Configuration the state was built from.
    pub config: AppConfig,
    /// Remote model client.
    pub client: ModelClient,
    /// Prompt answering.
    pub assistant: Assistant,
    /// Company website analysis.
    pub company: CompanyAnalyzer,
    /// CV summaries.
    pub cv: CvSummarizer,
    /// LinkedIn profile fetching.
    pub linkedin: LinkedInScraper,
    /// Pasted LinkedIn text parsing.
    pub linkedin_parser: ProfileTextParser,
    /// Speech-to-text, `None` when unavailable.
    pub speech: Option<SpeechPipeline>,
}

impl AppState {
    /// Build every collaborator from configuration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn from_config(config: AppConfig) -> Result<Arc<Self>, StateError> {
        let client = ModelClient::from_config(&config.llm, &config.retry)?;
        let speech =
            SpeechPipeline::from_config(&config.transcription, config.llm.api_key.as_deref())?;
        Self::assemble(config, client, speech).map(Arc::new)
    }

    /// Build the state around an existing model client and speech pipeline.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn assemble(
        config: AppConfig,
        client: ModelClient,
        speech: Option<SpeechPipeline>,
    ) -> Result<Self, StateError> {
        let summarizer = Summarizer::new(client.clone());
        let scraper = WebsiteScraper::new(config.scraping.clone())?;

        info!(
            model = client.model(),
            llm = client.is_available(),
            whisper = speech.is_some(),
            "application state ready"
        );

        Ok(Self {
            assistant: Assistant::new(client.clone(), &config.assistant, &config.llm),
            company: CompanyAnalyzer::new(scraper, summarizer.clone(), config.company.clone()),
            cv: CvSummarizer::new(summarizer, config.cv.clone()),
            linkedin: LinkedInScraper::new(&config.scraping)?,
            linkedin_parser: ProfileTextParser::new()?,
            client,
            speech,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_without_credentials_is_degraded() {
        let state = AppState::from_config(AppConfig::default()).unwrap();
        assert!(!state.client.is_available());
        assert!(state.speech.is_none());
        assert_eq!(state.company.default_target_words(), 300);
        assert_eq!(state.cv.default_target_words(), 250);
    }

    #[test]
    fn test_state_with_key_enables_speech() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("gsk_test".to_string());
        let state = AppState::from_config(config).unwrap();
        assert!(state.client.is_available());
        assert!(state.speech.is_some());
    }
}
