//! Hosted Whisper transcription over an OpenAI-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::{AudioClip, Transcriber, TranscriptionConfig, TranscriptionError};
use crate::text::truncate_chars;

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Uploads clips to `/audio/transcriptions`.
pub struct WhisperTranscriber {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    language: Option<String>,
    timeout: Duration,
}

impl WhisperTranscriber {
    /// Create a transcriber.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be created.
    pub fn new(config: &TranscriptionConfig, api_key: &str) -> Result<Self, TranscriptionError> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| TranscriptionError::Config(format!("endpoint: {e}")))?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TranscriptionError::Config(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            language: config.language.clone(),
            timeout: config.request_timeout,
        })
    }

    fn form(&self, clip: AudioClip) -> Result<Form, TranscriptionError> {
        let file_name = clip.file_name();
        let part = Part::bytes(clip.bytes)
            .file_name(file_name)
            .mime_str(clip.format.mime())
            .map_err(|e| TranscriptionError::Config(e.to_string()))?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("temperature", "0")
            .text("response_format", "json");
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, TranscriptionError> {
        debug!(model = %self.model, bytes = clip.bytes.len(), "transcription request");
        let form = self.form(clip)?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), 200),
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Decode(e.to_string()))?;
        Ok(parsed.text)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TranscriptionError {
    if err.is_timeout() {
        TranscriptionError::Timeout(timeout)
    } else {
        TranscriptionError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::Multipart;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Json;

    use super::*;
    use crate::transcription::AudioFormat;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/audio/transcriptions")
    }

    fn config(endpoint: String) -> TranscriptionConfig {
        TranscriptionConfig {
            endpoint,
            language: Some("fr".to_string()),
            ..TranscriptionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_uploads_multipart_and_reads_text() {
        async fn handler(headers: HeaderMap, mut multipart: Multipart) -> Json<serde_json::Value> {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let mut fields = Vec::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().map(String::from);
                let data = field.bytes().await.unwrap();
                fields.push(serde_json::json!({
                    "name": name,
                    "file_name": file_name,
                    "len": data.len(),
                }));
            }
            Json(serde_json::json!({ "text": serde_json::json!({ "auth": auth, "fields": fields }).to_string() }))
        }

        let endpoint = serve(Router::new().route("/audio/transcriptions", post(handler))).await;
        let transcriber = WhisperTranscriber::new(&config(endpoint), "gsk_test").unwrap();

        let clip = AudioClip {
            bytes: vec![0; 32],
            format: AudioFormat::Wav,
        };
        let echoed = transcriber.transcribe(clip).await.unwrap();
        let echoed: serde_json::Value = serde_json::from_str(&echoed).unwrap();

        assert_eq!(echoed["auth"], "Bearer gsk_test");
        let names: Vec<&str> = echoed["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["file", "model", "temperature", "response_format", "language"]);
        assert_eq!(echoed["fields"][0]["file_name"], "audio.wav");
        assert_eq!(echoed["fields"][0]["len"], 32);
    }

    #[tokio::test]
    async fn test_error_status() {
        let endpoint = serve(Router::new().route(
            "/audio/transcriptions",
            post(|| async { (StatusCode::BAD_REQUEST, "bad audio") }),
        ))
        .await;
        let transcriber = WhisperTranscriber::new(&config(endpoint), "k").unwrap();
        let err = transcriber
            .transcribe(AudioClip {
                bytes: vec![1],
                format: AudioFormat::Mp3,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: bad audio");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        assert!(matches!(
            WhisperTranscriber::new(&config("nope".to_string()), "k"),
            Err(TranscriptionError::Config(_))
        ));
    }
}
