//! Page acquisition for the analyzers.
//!
//! - Website fetch with visible-text extraction (company analysis)
//! - LinkedIn profile scraping and pasted-text parsing

pub mod config;
pub mod content;
pub mod error;
pub mod linkedin;
pub mod types;

pub use config::{LinkedInConfig, ScrapingConfig};
pub use content::{clean_url, extract_page};
pub use error::ScrapingError;
pub use linkedin::{
    LinkedInProfile, LinkedInScraper, ProfileEntry, ProfileExtractor, ProfileTextParser,
    SelectorExtractor, format_profile_summary, is_valid_linkedin_url, parse_linkedin_text,
};
pub use types::{PageContent, clean_text};

use tracing::info;

/// Fetches company websites.
#[derive(Clone)]
pub struct WebsiteScraper {
    config: ScrapingConfig,
    client: reqwest::Client,
}

impl WebsiteScraper {
    /// Create a new scraper with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ScrapingConfig) -> Result<Self, ScrapingError> {
        let client = Self::build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Create a new scraper with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, ScrapingError> {
        Self::new(ScrapingConfig::default())
    }

    /// Scraper configuration.
    #[must_use]
    pub const fn config(&self) -> &ScrapingConfig {
        &self.config
    }

    /// Build an HTTP client with appropriate headers and settings.
    fn build_client(config: &ScrapingConfig) -> Result<reqwest::Client, ScrapingError> {
        use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

        let mut headers = HeaderMap::new();

        let ua = config.random_user_agent();
        if let Ok(ua_value) = HeaderValue::from_str(&ua) {
            headers.insert(USER_AGENT, ua_value);
        }

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.5"),
        );

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ScrapingError::HttpClient(e.to_string()))
    }

    /// Fetch a page and extract its text.
    ///
    /// # Errors
    /// Returns an error if fetching fails; see [`content::scrape_page`].
    pub async fn fetch_page(&self, url: &str) -> Result<PageContent, ScrapingError> {
        let page = content::scrape_page(&self.client, url, &self.config).await?;
        info!(
            url = %page.final_url,
            words = page.word_count,
            "page content extracted"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::Html;
    use axum::routing::get;

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let base = serve(Router::new().route(
            "/",
            get(|| async {
                Html("<html><head><title>Acme</title></head><body><p>Rockets for everyone</p><script>x()</script></body></html>")
            }),
        ))
        .await;

        let scraper = WebsiteScraper::with_defaults().unwrap();
        let page = scraper.fetch_page(&base).await.unwrap();
        assert_eq!(page.title, "Acme");
        assert_eq!(page.text, "Rockets for everyone");
        assert_eq!(page.combined_text(), "Title: Acme Content: Rockets for everyone");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let base = serve(Router::new().route(
            "/",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        ))
        .await;

        let scraper = WebsiteScraper::with_defaults().unwrap();
        let err = scraper.fetch_page(&base).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error 404: gone");
    }

    #[tokio::test]
    async fn test_timeout() {
        let base = serve(Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html("late")
            }),
        ))
        .await;

        let config = ScrapingConfig::default().with_timeout(Duration::from_millis(200));
        let scraper = WebsiteScraper::new(config).unwrap();
        let err = scraper.fetch_page(&base).await.unwrap_err();
        assert!(matches!(err, ScrapingError::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let scraper = WebsiteScraper::with_defaults().unwrap();
        let err = scraper.fetch_page(&format!("http://{addr}")).await.unwrap_err();
        assert!(matches!(err, ScrapingError::Connect));
    }

    #[tokio::test]
    async fn test_chunked_page_over_cap() {
        let base =
            content::testing::serve_chunked("<p>word word word word word word</p>", 5000).await;
        let config = ScrapingConfig {
            max_content_length: 4096,
            ..ScrapingConfig::default()
        };
        let scraper = WebsiteScraper::new(config).unwrap();
        let err = scraper.fetch_page(&base).await.unwrap_err();
        assert!(matches!(err, ScrapingError::ContentTooLarge(_)));
    }
}
