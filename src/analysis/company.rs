//! Company website analysis.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scraping::{PageContent, WebsiteScraper, extract_page};
use crate::summarize::{Document, SummaryConfig, SummaryOutcome, SummaryProfile, Summarizer};
use crate::text::{char_len, truncate_chars};

/// Built-in page used by the offline demo.
pub const SAMPLE_COMPANY_HTML: &str = r#"<html>
<head>
    <title>TechCorp - Solutions informatiques innovantes</title>
    <meta name="description" content="TechCorp developpe des solutions logicielles pour l'industrie 4.0">
</head>
<body>
    <h1>TechCorp - Leader en solutions informatiques</h1>
    <p>Depuis 15 ans, TechCorp developpe des solutions logicielles innovantes pour les entreprises.</p>
    <h2>Nos services</h2>
    <ul>
        <li>Developpement d'applications web avec React et Node.js</li>
        <li>Solutions cloud avec AWS et Azure</li>
        <li>Intelligence artificielle et machine learning</li>
        <li>Consulting en transformation digitale</li>
    </ul>
    <h2>Notre equipe</h2>
    <p>Plus de 50 developpeurs experimentes bases a Paris et Lyon.</p>
    <h2>Nos valeurs</h2>
    <p>Innovation, excellence technique, collaboration et respect de l'environnement.</p>
</body>
</html>"#;

/// Label used as the demo page URL.
pub const SAMPLE_COMPANY_URL: &str = "demo://techcorp";

/// Result of analysing one website.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    /// URL as requested.
    pub url: String,
    /// Word budget of the analysis.
    pub target_words: usize,
    /// `false` when the site could not be fetched.
    pub success: bool,
    /// Analysis text, or the failure description.
    pub analysis: String,
    /// Page title, when fetched.
    pub title: Option<String>,
    /// Characters of usable text sent to the model.
    pub content_chars: usize,
    /// Number of segments summarized.
    pub segments: usize,
    /// Acquisition error.
    pub error: Option<String>,
}

/// Scrapes a company website and summarizes it.
#[derive(Clone)]
pub struct CompanyAnalyzer {
    scraper: WebsiteScraper,
    summarizer: Summarizer,
    profile: SummaryProfile,
}

impl CompanyAnalyzer {
    /// Create an analyzer.
    #[must_use]
    pub fn new(scraper: WebsiteScraper, summarizer: Summarizer, config: SummaryConfig) -> Self {
        Self {
            scraper,
            summarizer,
            profile: SummaryProfile::company(config),
        }
    }

    /// Default word budget.
    #[must_use]
    pub const fn default_target_words(&self) -> usize {
        self.profile.config.target_words
    }

    /// Whether analyses reach the model rather than the degraded reply.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.summarizer.client().is_available()
    }

    /// Fetch a website and analyse it.
    pub async fn analyze(&self, url: &str, target_words: usize) -> CompanyAnalysis {
        info!(url, "scraping website");
        match self.scraper.fetch_page(url).await {
            Ok(page) => self.analyze_page(&page, target_words).await,
            Err(err) => {
                warn!(url, error = %err, "website scraping failed");
                CompanyAnalysis {
                    url: url.to_string(),
                    target_words,
                    success: false,
                    analysis: format!("Scraping failed: {err}"),
                    title: None,
                    content_chars: 0,
                    segments: 0,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Analyse an already fetched page.
    pub async fn analyze_page(&self, page: &PageContent, target_words: usize) -> CompanyAnalysis {
        let content = page.combined_text();
        let content_chars = char_len(&content);
        info!(url = %page.url, chars = content_chars, "content extracted");

        let document = Document::new(content, page.url.clone());
        let outcome = self
            .summarizer
            .summarize_document(&document, &self.profile, target_words)
            .await;
        let segments = match &outcome {
            SummaryOutcome::Summarized(result) => result.segment_count(),
            _ => 0,
        };

        CompanyAnalysis {
            url: page.url.clone(),
            target_words,
            success: true,
            analysis: outcome.into_text(),
            title: (!page.title.is_empty()).then(|| page.title.clone()),
            content_chars,
            segments,
            error: None,
        }
    }
}

/// Extracted fields of the built-in sample page.
#[must_use]
pub fn demo_page() -> PageContent {
    extract_page(SAMPLE_COMPANY_HTML, SAMPLE_COMPANY_URL, SAMPLE_COMPANY_URL)
}

/// Offline report on the sample page, no model involved.
#[must_use]
pub fn demo_report() -> String {
    let page = demo_page();
    let content = page.combined_text();
    let preview = if char_len(&content) > 1000 {
        format!("{}...", truncate_chars(&content, 1000))
    } else {
        content
    };
    format!(
        "COMPANY ANALYSIS (demo mode)\n\n\
         URL: {}\n\
         Title: {}\n\
         Meta description: {}\n\
         Words extracted: {}\n\n\
         EXTRACTED CONTENT:\n{preview}",
        page.url,
        page.title,
        page.meta_description.as_deref().unwrap_or("-"),
        page.word_count,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::Html;
    use axum::routing::get;

    use super::*;
    use crate::llm::ModelClient;
    use crate::llm::client::testing::{RecordingBackend, keyed_config};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn analyzer(backend: &Arc<RecordingBackend>) -> CompanyAnalyzer {
        CompanyAnalyzer::new(
            WebsiteScraper::with_defaults().unwrap(),
            Summarizer::new(ModelClient::new(&keyed_config(), backend.clone())),
            SummaryConfig::company(),
        )
    }

    #[test]
    fn test_demo_page_extraction() {
        let page = demo_page();
        assert_eq!(page.title, "TechCorp - Solutions informatiques innovantes");
        assert!(page.text.contains("Solutions cloud avec AWS et Azure"));
        assert!(demo_report().contains("Title: TechCorp"));
    }

    #[tokio::test]
    async fn test_analyze_site() {
        let base = serve(Router::new().route("/", get(|| async { Html(SAMPLE_COMPANY_HTML) }))).await;
        let backend = Arc::new(RecordingBackend::replying("TechCorp est une ESN."));

        let analysis = analyzer(&backend).analyze(&base, 300).await;

        assert!(analysis.success);
        assert_eq!(analysis.analysis, "TechCorp est une ESN.");
        assert_eq!(analysis.segments, 1);
        assert_eq!(backend.calls(), 1);
        let prompt = backend.requests()[0].user_text().unwrap().to_string();
        assert!(prompt.contains("Title: TechCorp"));
        assert!(prompt.contains(&base));
    }

    #[tokio::test]
    async fn test_scrape_failure_skips_model() {
        let base = serve(Router::new().route(
            "/",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;
        let backend = Arc::new(RecordingBackend::replying("x"));

        let analysis = analyzer(&backend).analyze(&base, 300).await;

        assert!(!analysis.success);
        assert_eq!(analysis.analysis, "Scraping failed: HTTP error 503: down");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_page_has_no_usable_content() {
        let base = serve(Router::new().route(
            "/",
            get(|| async { Html("<html><body><script>x</script></body></html>") }),
        ))
        .await;
        let backend = Arc::new(RecordingBackend::replying("x"));

        let analysis = analyzer(&backend).analyze(&base, 300).await;

        assert!(analysis.success);
        assert_eq!(analysis.analysis, crate::summarize::NO_USABLE_CONTENT);
        assert_eq!(backend.calls(), 0);
    }
}
