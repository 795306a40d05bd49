//! Browser audio to 16 kHz mono WAV through an `ffmpeg` pipe.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{AudioClip, AudioFormat};

/// Default bound on one conversion.
pub const DEFAULT_FFMPEG_TIMEOUT: Duration = Duration::from_secs(20);

/// Converts webm/ogg clips to WAV.
#[derive(Clone, Debug)]
pub struct Transcoder {
    bin: String,
    timeout: Duration,
}

impl Transcoder {
    /// Use the given ffmpeg executable.
    #[must_use]
    pub fn new(bin: &str) -> Self {
        Self {
            bin: bin.to_string(),
            timeout: DEFAULT_FFMPEG_TIMEOUT,
        }
    }

    /// Kill ffmpeg if a conversion takes longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convert the clip if its format needs it.
    ///
    /// Falls back to the original clip when ffmpeg is missing, fails or
    /// exceeds its timeout.
    pub async fn prepare(&self, clip: AudioClip) -> AudioClip {
        if !clip.format.needs_transcoding() {
            return clip;
        }
        match self.to_wav(&clip.bytes).await {
            Ok(wav) => {
                debug!(input = clip.bytes.len(), output = wav.len(), "converted to wav");
                AudioClip {
                    bytes: wav,
                    format: AudioFormat::Wav,
                }
            }
            Err(err) => {
                warn!(error = %err, format = ?clip.format, "ffmpeg conversion failed, sending original audio");
                clip
            }
        }
    }

    async fn to_wav(&self, input: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut child = Command::new(&self.bin)
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "pipe:0",
                "-ar",
                "16000",
                "-ac",
                "1",
                "-f",
                "wav",
                "pipe:1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stdin unavailable"))?;
        let input = input.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        // Dropping the child on timeout kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("ffmpeg did not finish within {}s", self.timeout.as_secs_f32()),
                )
            })??;
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(join) => return Err(std::io::Error::other(join.to_string())),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(std::io::Error::other(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(std::io::Error::other("ffmpeg produced no output"));
        }
        Ok(output.stdout)
    }
}
