//! Fetch settings for company websites and LinkedIn profiles.

use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Website fetch settings. LinkedIn has its own section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapingConfig {
    /// Request timeout for website fetches.
    #[serde(with = "crate::config::duration_secs")]
    pub request_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "crate::config::duration_secs")]
    pub connect_timeout: Duration,
    /// User agents to rotate.
    pub user_agents: Vec<String>,
    /// Maximum content length to download (bytes).
    pub max_content_length: usize,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
    /// LinkedIn profile fetching.
    pub linkedin: LinkedInConfig,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| (*ua).to_string()).collect(),
            max_content_length: 10 * 1024 * 1024, // 10 MB
            max_redirects: 10,
            accept_invalid_certs: false,
            linkedin: LinkedInConfig::default(),
        }
    }
}

impl ScrapingConfig {
    /// Override the website request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Pick one browser user agent. An empty list falls back to the built-in set.
    #[must_use]
    pub fn random_user_agent(&self) -> String {
        let mut rng = rand::thread_rng();
        self.user_agents
            .choose(&mut rng)
            .cloned()
            .or_else(|| DEFAULT_USER_AGENTS.choose(&mut rng).map(|ua| (*ua).to_string()))
            .unwrap_or_default()
    }
}

/// LinkedIn profile fetching settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInConfig {
    /// Request timeout.
    #[serde(with = "crate::config::duration_secs")]
    pub timeout: Duration,
    /// Total attempts per profile.
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number.
    #[serde(with = "crate::config::duration_secs")]
    pub retry_delay: Duration,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
];
