//! Error types for the scraping module.

use thiserror::Error;

/// Errors that can occur while acquiring page content.
#[derive(Debug, Error)]
pub enum ScrapingError {
    /// HTTP request failed for a reason other than timeout or connection.
    #[error("Scraping error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Timeout waiting for response.
    #[error("Timeout while fetching the website")]
    Timeout,

    /// Could not connect to the host.
    #[error("Connection error: could not reach the website")]
    Connect,

    /// The site answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Content type not supported.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Body larger than the configured cap.
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(u64),

    /// Not a LinkedIn profile URL.
    #[error("Invalid LinkedIn URL: {0}")]
    InvalidLinkedInUrl(String),

    /// LinkedIn served its anti-bot challenge.
    #[error("LinkedIn anti-bot challenge detected")]
    AntiBotChallenge,

    /// Every attempt failed.
    #[error("Failed to scrape profile after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Last failure.
        last: String,
    },

    /// Regex error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl ScrapingError {
    /// Classify a reqwest failure.
    #[must_use]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else {
            Self::HttpRequest(err)
        }
    }

    /// Check if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect | Self::HttpRequest(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ScrapingError::HttpStatus {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: not found");
        assert_eq!(
            ScrapingError::Timeout.to_string(),
            "Timeout while fetching the website"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ScrapingError::Timeout.is_retryable());
        assert!(ScrapingError::Connect.is_retryable());
        assert!(
            ScrapingError::HttpStatus {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ScrapingError::HttpStatus {
                status: 404,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!ScrapingError::AntiBotChallenge.is_retryable());
    }
}
