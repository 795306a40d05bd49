//! Service configuration.
//!
//! Every setting has a default and can be overridden by an environment
//! variable. [`AppConfig`] is built once at startup and handed to the
//! components that need it.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::assistant::AssistantConfig;
use crate::llm::{LlmConfig, RetryConfig};
use crate::scraping::ScrapingConfig;
use crate::summarize::SummaryConfig;
use crate::transcription::TranscriptionConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Maximum request body size for uploads.
    pub max_upload_bytes: usize,
    /// Directory served at `/`.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_bytes: 25 * 1024 * 1024,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote model settings.
    pub llm: LlmConfig,
    /// Retry policy around the remote model.
    pub retry: RetryConfig,
    /// Company analysis pipeline.
    pub company: SummaryConfig,
    /// CV summary pipeline.
    pub cv: SummaryConfig,
    /// Website and profile fetching.
    pub scraping: ScrapingConfig,
    /// Speech-to-text.
    pub transcription: TranscriptionConfig,
    /// Assistant persona.
    pub assistant: AssistantConfig,
    /// HTTP server.
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            retry: RetryConfig::default(),
            company: SummaryConfig::company(),
            cv: SummaryConfig::cv(),
            scraping: ScrapingConfig::default(),
            transcription: TranscriptionConfig::default(),
            assistant: AssistantConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or the result is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);
        let mut config = Self::default();

        let llm = &mut config.llm;
        llm.api_key = env.string("GROQ_API_KEY").filter(|k| !k.trim().is_empty());
        env.set_string("GROQ_MODEL", &mut llm.model);
        env.set_string("GROQ_ENDPOINT", &mut llm.endpoint);
        env.set("LLM_TEMPERATURE", &mut llm.temperature)?;
        env.set("LLM_TOP_P", &mut llm.top_p)?;
        env.set("LLM_MAX_TOKENS", &mut llm.max_tokens)?;
        env.set_secs("LLM_REQUEST_TIMEOUT", &mut llm.request_timeout)?;

        let retry = &mut config.retry;
        env.set("LLM_RETRY_MAX_ATTEMPTS", &mut retry.max_attempts)?;
        env.set("LLM_RETRY_BASE_DELAY_MS", &mut retry.base_delay_ms)?;
        env.set("LLM_RETRY_MAX_DELAY_MS", &mut retry.max_delay_ms)?;
        env.set("LLM_RETRY_JITTER_MS", &mut retry.jitter_ms)?;

        env.summary("COMPANY", &mut config.company)?;
        env.set_secs("COMPANY_SCRAPING_TIMEOUT", &mut config.scraping.request_timeout)?;
        env.summary("CV", &mut config.cv)?;

        let linkedin = &mut config.scraping.linkedin;
        env.set_secs("LINKEDIN_TIMEOUT", &mut linkedin.timeout)?;
        env.set("LINKEDIN_MAX_RETRIES", &mut linkedin.max_retries)?;
        env.set_secs("LINKEDIN_RETRY_DELAY", &mut linkedin.retry_delay)?;

        let transcription = &mut config.transcription;
        env.set("WHISPER_ENABLED", &mut transcription.enabled)?;
        env.set_string("WHISPER_MODEL", &mut transcription.model);
        env.set_string("WHISPER_ENDPOINT", &mut transcription.endpoint);
        transcription.language = env.string("WHISPER_LANGUAGE");
        env.set_string("FFMPEG_BIN", &mut transcription.ffmpeg_bin);
        env.set_secs("FFMPEG_TIMEOUT", &mut transcription.ffmpeg_timeout)?;

        env.set_string("ASSISTANT_BIO", &mut config.assistant.bio);

        let server = &mut config.server;
        env.set("VOXBRIEF_PORT", &mut server.port)?;
        env.set("VOXBRIEF_MAX_UPLOAD_BYTES", &mut server.max_upload_bytes)?;
        if let Some(dir) = env.string("VOXBRIEF_STATIC_DIR") {
            server.static_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_endpoint("llm.endpoint", &self.llm.endpoint)?;
        check_sampling("llm", self.llm.temperature, self.llm.top_p)?;
        if self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens must be > 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be > 0"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(invalid("retry.base_delay_ms must be <= retry.max_delay_ms"));
        }

        for (name, summary) in [("company", &self.company), ("cv", &self.cv)] {
            if summary.chunk_char_limit == 0 {
                return Err(invalid(format!("{name}.chunk_char_limit must be > 0")));
            }
            if summary.target_words == 0 {
                return Err(invalid(format!("{name}.target_words must be > 0")));
            }
            if !(summary.damping > 0.0 && summary.damping <= 1.0) {
                return Err(invalid(format!("{name}.damping must be in (0, 1]")));
            }
            if summary.max_tokens == 0 {
                return Err(invalid(format!("{name}.max_tokens must be > 0")));
            }
            check_sampling(name, summary.temperature, summary.top_p)?;
        }

        if self.scraping.linkedin.max_retries == 0 {
            return Err(invalid("linkedin.max_retries must be > 0"));
        }

        if self.transcription.enabled {
            check_endpoint("transcription.endpoint", &self.transcription.endpoint)?;
        }

        if self.server.max_upload_bytes == 0 {
            return Err(invalid("server.max_upload_bytes must be > 0"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn check_endpoint(name: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| invalid(format!("{name}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("{name} must be an http(s) URL")));
    }
    Ok(())
}

fn check_sampling(name: &str, temperature: f32, top_p: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(format!("{name}.temperature must be in [0, 2]")));
    }
    if !(top_p > 0.0 && top_p <= 1.0) {
        return Err(invalid(format!("{name}.top_p must be in (0, 1]")));
    }
    Ok(())
}

/// Typed access over a variable lookup.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn set_string(&self, name: &str, target: &mut String) {
        if let Some(value) = self.string(name) {
            *target = value;
        }
    }

    fn set<T>(&self, name: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(value) = self.string(name) {
            *target = value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn set_secs(&self, name: &str, target: &mut Duration) -> Result<(), ConfigError> {
        let mut secs = target.as_secs_f64();
        self.set(name, &mut secs)?;
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: secs.to_string(),
            reason: "must be a positive number of seconds".to_string(),
        };
        if secs <= 0.0 {
            return Err(invalid());
        }
        *target = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
        Ok(())
    }

    fn summary(&self, prefix: &str, target: &mut SummaryConfig) -> Result<(), ConfigError> {
        let name = |suffix: &str| format!("{prefix}_{suffix}");
        self.set(&name("CHUNK_CHAR_LIMIT"), &mut target.chunk_char_limit)?;
        self.set(&name("SUMMARY_WORDS"), &mut target.target_words)?;
        self.set(&name("SUMMARY_TEMPERATURE"), &mut target.temperature)?;
        self.set(&name("SUMMARY_TOP_P"), &mut target.top_p)?;
        self.set(&name("SUMMARY_MAX_TOKENS"), &mut target.max_tokens)?;
        self.set_secs(&name("REQUEST_TIMEOUT"), &mut target.request_timeout)?;
        Ok(())
    }
}

/// Serde helper storing a [`Duration`] as whole seconds.
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Serialize as (possibly fractional) seconds.
    ///
    /// # Errors
    /// Propagates serializer errors.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize from (possibly fractional) seconds.
    ///
    /// # Errors
    /// Fails on negative, non-finite or out-of-range values.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(!config.llm.has_credential());
        assert_eq!(config.llm.model, "llama3-8b-8192");
        assert_eq!(config.company.chunk_char_limit, 5000);
        assert_eq!(config.company.target_words, 300);
        assert_eq!(config.cv.chunk_char_limit, 4500);
        assert_eq!(config.cv.target_words, 250);
        assert_eq!(config.scraping.request_timeout, Duration::from_secs(15));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_MODEL", "llama-3.1-8b-instant"),
            ("COMPANY_CHUNK_CHAR_LIMIT", "2000"),
            ("COMPANY_REQUEST_TIMEOUT", "12"),
            ("CV_SUMMARY_WORDS", "180"),
            ("LINKEDIN_RETRY_DELAY", "0.5"),
            ("WHISPER_ENABLED", "false"),
            ("WHISPER_LANGUAGE", "fr"),
            ("VOXBRIEF_PORT", "8080"),
        ])
        .unwrap();

        assert!(config.llm.has_credential());
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.company.chunk_char_limit, 2000);
        assert_eq!(config.company.request_timeout, Duration::from_secs(12));
        assert_eq!(config.cv.target_words, 180);
        assert_eq!(config.scraping.linkedin.retry_delay, Duration::from_millis(500));
        assert!(!config.transcription.enabled);
        assert_eq!(config.transcription.language.as_deref(), Some("fr"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_blank_key_is_no_key() {
        let config = load(&[("GROQ_API_KEY", "   ")]).unwrap();
        assert_eq!(config.llm.api_key, None);
    }

    #[test]
    fn test_unparsable_value() {
        let err = load(&[("LLM_MAX_TOKENS", "lots")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid value for LLM_MAX_TOKENS"));
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert!(load(&[("COMPANY_CHUNK_CHAR_LIMIT", "0")]).is_err());
        assert!(load(&[("LLM_TOP_P", "1.5")]).is_err());
        assert!(load(&[("LLM_RETRY_MAX_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("GROQ_ENDPOINT", "not a url")]).is_err());
        assert!(load(&[("COMPANY_REQUEST_TIMEOUT", "0")]).is_err());
        assert!(load(&[("FFMPEG_TIMEOUT", "1e30")]).is_err());
        assert!(load(&[("LINKEDIN_RETRY_DELAY", "NaN")]).is_err());
    }

    #[test]
    fn test_duration_secs_round_trip() {
        let json = serde_json::to_string(&AppConfig::default()).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.llm.request_timeout, Duration::from_secs(60));
        assert_eq!(back.scraping.linkedin.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_fractional_seconds_survive_round_trip() {
        let config = load(&[("LINKEDIN_RETRY_DELAY", "0.5"), ("FFMPEG_TIMEOUT", "2.5")]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scraping.linkedin.retry_delay, Duration::from_millis(500));
        assert_eq!(back.transcription.ffmpeg_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_negative_seconds_rejected_on_load() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        let mut broken = json.clone();
        broken["llm"]["request_timeout"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<AppConfig>(broken).is_err());
        assert!(serde_json::from_value::<AppConfig>(json).is_ok());
    }
}
