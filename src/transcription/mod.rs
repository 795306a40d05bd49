//! Speech-to-text for voice prompts.
//!
//! Browser recordings arrive as webm or ogg; those are converted to 16 kHz mono
//! WAV through `ffmpeg` before upload. The hosted model does the rest.

pub mod ffmpeg;
pub mod whisper;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use ffmpeg::{DEFAULT_FFMPEG_TIMEOUT, Transcoder};
pub use whisper::WhisperTranscriber;

/// Default hosted transcription endpoint (Groq, OpenAI-compatible).
pub const DEFAULT_WHISPER_ENDPOINT: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
/// Default transcription model.
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-large-v3";
/// Reply used when the transcript is empty.
pub const UNINTELLIGIBLE_AUDIO: &str = "Sorry, I could not understand the audio. Please try again.";

/// Speech-to-text settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Whether voice prompts are accepted at all.
    pub enabled: bool,
    /// Transcription model.
    pub model: String,
    /// Transcription endpoint URL.
    pub endpoint: String,
    /// ISO-639-1 hint, auto-detected when unset.
    pub language: Option<String>,
    /// ffmpeg executable.
    pub ffmpeg_bin: String,
    /// Bound on one ffmpeg conversion.
    #[serde(with = "crate::config::duration_secs")]
    pub ffmpeg_timeout: Duration,
    /// Upload timeout.
    #[serde(with = "crate::config::duration_secs")]
    pub request_timeout: Duration,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_WHISPER_MODEL.to_string(),
            endpoint: DEFAULT_WHISPER_ENDPOINT.to_string(),
            language: None,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffmpeg_timeout: DEFAULT_FFMPEG_TIMEOUT,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Transcription errors.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// Speech-to-text is switched off or has no credential.
    #[error("speech recognition is not available")]
    Unavailable,

    /// Upload carried no bytes.
    #[error("empty audio file")]
    EmptyAudio,

    /// Request exceeded its timeout.
    #[error("transcription timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Transport failure.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status from the service.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Reply did not contain a transcript.
    #[error("unexpected transcription response: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("transcription configuration error: {0}")]
    Config(String),
}

/// Container format of an uploaded clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// RIFF WAV.
    Wav,
    /// WebM (browser MediaRecorder default).
    Webm,
    /// MPEG audio.
    Mp3,
    /// Ogg.
    Ogg,
    /// Anything else.
    Unknown,
}

impl AudioFormat {
    /// Detect the format from a MIME type such as `audio/webm;codecs=opus`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Self::Wav,
            "audio/webm" | "video/webm" => Self::Webm,
            "audio/mpeg" | "audio/mp3" => Self::Mp3,
            "audio/ogg" | "application/ogg" => Self::Ogg,
            _ => Self::Unknown,
        }
    }

    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
        match ext.as_deref() {
            Some("wav") => Self::Wav,
            Some("webm") => Self::Webm,
            Some("mp3") => Self::Mp3,
            Some("ogg" | "oga" | "opus") => Self::Ogg,
            _ => Self::Unknown,
        }
    }

    /// File extension used when uploading.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Webm => "webm",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Unknown => "bin",
        }
    }

    /// MIME type used when uploading.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// Whether the clip is converted to WAV before upload.
    #[must_use]
    pub const fn needs_transcoding(self) -> bool {
        matches!(self, Self::Webm | Self::Ogg)
    }
}

/// An uploaded audio clip.
#[derive(Clone, Debug)]
pub struct AudioClip {
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// Container format.
    pub format: AudioFormat,
}

impl AudioClip {
    /// Build a clip, detecting the format from the content type and then the file name.
    #[must_use]
    pub fn new(bytes: Vec<u8>, content_type: Option<&str>, file_name: Option<&str>) -> Self {
        let mut format = content_type.map_or(AudioFormat::Unknown, AudioFormat::from_content_type);
        if format == AudioFormat::Unknown {
            format = file_name.map_or(AudioFormat::Unknown, AudioFormat::from_file_name);
        }
        Self { bytes, format }
    }

    /// Upload file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("audio.{}", self.format.extension())
    }
}

/// Speech-to-text backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a clip to text.
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError>;
}

/// Transcoding plus transcription.
#[derive(Clone)]
pub struct SpeechPipeline {
    transcriber: Arc<dyn Transcriber>,
    transcoder: Transcoder,
}

impl SpeechPipeline {
    /// Create a pipeline.
    #[must_use]
    pub const fn new(transcriber: Arc<dyn Transcriber>, transcoder: Transcoder) -> Self {
        Self {
            transcriber,
            transcoder,
        }
    }

    /// Build the hosted pipeline, `None` when disabled or without credential.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(
        config: &TranscriptionConfig,
        api_key: Option<&str>,
    ) -> Result<Option<Self>, TranscriptionError> {
        let Some(key) = api_key.filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        if !config.enabled {
            return Ok(None);
        }
        let transcriber = WhisperTranscriber::new(config, key)?;
        Ok(Some(Self::new(
            Arc::new(transcriber),
            Transcoder::new(&config.ffmpeg_bin).with_timeout(config.ffmpeg_timeout),
        )))
    }

    /// Transcode if needed and transcribe. The transcript is trimmed.
    ///
    /// # Errors
    /// Returns an error for an empty clip or a failed transcription.
    pub async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError> {
        if clip.bytes.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        info!(bytes = clip.bytes.len(), format = ?clip.format, "audio received");
        let clip = self.transcoder.prepare(clip).await;
        let text = self.transcriber.transcribe(clip).await?;
        let text = text.trim().to_string();
        info!(chars = text.chars().count(), "transcription done");
        Ok(text)
    }
}
