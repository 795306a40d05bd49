//! HTML content scraping and extraction.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::scraping::config::ScrapingConfig;
use crate::scraping::error::ScrapingError;
use crate::scraping::types::PageContent;
use crate::text::{collapse_whitespace, truncate_chars};

/// Elements whose text never counts as page content.
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript"];

/// Normalize a user-supplied address, adding `https://` when no scheme is given.
#[must_use]
pub fn clean_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Fetch a web page and extract its visible text.
///
/// # Errors
/// Returns an error if the URL is invalid, the request fails or times out,
/// the site answers with a non-2xx status, or the body is not HTML/text.
pub async fn scrape_page(
    client: &reqwest::Client,
    url: &str,
    config: &ScrapingConfig,
) -> Result<PageContent, ScrapingError> {
    let url = clean_url(url);
    Url::parse(&url)?;

    let response = client
        .get(&url)
        .timeout(config.request_timeout)
        .send()
        .await
        .map_err(ScrapingError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body_capped(response, config.max_content_length)
            .await
            .unwrap_or_default();
        return Err(ScrapingError::HttpStatus {
            status: status.as_u16(),
            body: truncate_chars(body.trim(), 100),
        });
    }

    let final_url = response.url().to_string();

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html")
        && !content_type.contains("application/xhtml+xml")
        && !content_type.contains("text/plain")
    {
        return Err(ScrapingError::UnsupportedContentType(content_type));
    }

    let html = read_body_capped(response, config.max_content_length).await?;
    Ok(extract_page(&html, &url, &final_url))
}

/// Read a response body, failing as soon as it grows past `cap` bytes.
///
/// A declared `Content-Length` over the cap is rejected before any byte is read;
/// chunked bodies are counted as they arrive.
///
/// # Errors
/// Returns [`ScrapingError::ContentTooLarge`] over the cap, or a transport error.
pub(crate) async fn read_body_capped(
    mut response: reqwest::Response,
    cap: usize,
) -> Result<String, ScrapingError> {
    let cap = u64::try_from(cap).unwrap_or(u64::MAX);
    if let Some(len) = response.content_length() {
        if len > cap {
            return Err(ScrapingError::ContentTooLarge(len));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(ScrapingError::from_reqwest)? {
        body.extend_from_slice(&chunk);
        let read = u64::try_from(body.len()).unwrap_or(u64::MAX);
        if read > cap {
            return Err(ScrapingError::ContentTooLarge(read));
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Extract title, description and visible text from HTML.
#[must_use]
pub fn extract_page(html: &str, url: &str, final_url: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let meta_description = extract_meta(&document, "description");
    let text = extract_visible_text(&document);
    let word_count = text.split_whitespace().count();

    PageContent {
        url: url.to_string(),
        final_url: final_url.to_string(),
        title,
        meta_description,
        text,
        scraped_at: Utc::now(),
        word_count,
    }
}

/// Extract page title.
fn extract_title(document: &Html) -> String {
    if let Ok(selector) = Selector::parse("title") {
        if let Some(element) = document.select(&selector).next() {
            let title = collapse_whitespace(&element.text().collect::<String>());
            if !title.is_empty() {
                return title;
            }
        }
    }

    extract_meta(document, "og:title").unwrap_or_default()
}

/// Extract meta tag content.
fn extract_meta(document: &Html, name: &str) -> Option<String> {
    for attr in ["name", "property"] {
        let selector_str = format!("meta[{attr}='{name}']");
        if let Ok(selector) = Selector::parse(&selector_str) {
            if let Some(element) = document.select(&selector).next() {
                if let Some(content) = element.value().attr("content") {
                    let content = content.trim();
                    if !content.is_empty() {
                        return Some(content.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Visible text of the body, skipping scripts, styles and page chrome.
fn extract_visible_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut pieces = Vec::new();
    collect_text(root, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

fn collect_text<'a>(element: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_TAGS.contains(&child_element.value().name()) {
                collect_text(child_element, pieces);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `count` copies of `chunk` with chunked transfer encoding and no
    /// `Content-Length`, on every connection.
    pub async fn serve_chunked(chunk: &'static str, count: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = [0_u8; 4096];
                    let _ = socket.read(&mut request).await;
                    let head = "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\n\
                                transfer-encoding: chunked\r\nconnection: close\r\n\r\n";
                    if socket.write_all(head.as_bytes()).await.is_err() {
                        return;
                    }
                    for _ in 0..count {
                        let frame = format!("{:x}\r\n{chunk}\r\n", chunk.len());
                        if socket.write_all(frame.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                    let _ = socket.write_all(b"0\r\n\r\n").await;
                });
            }
        });
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::serve_chunked;
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title> Acme   Rockets </title>
  <meta name="description" content="Reusable launch vehicles">
  <style>body { color: red; }</style>
</head>
<body>
  <header>Top banner</header>
  <nav><a href="/">Home</a></nav>
  <main>
    <h1>About us</h1>
    <p>We build
       rockets.</p>
    <script>var tracking = 1;</script>
    <noscript>Enable JS</noscript>
  </main>
  <footer>Copyright</footer>
</body>
</html>"#;

    #[test]
    fn test_clean_url() {
        assert_eq!(clean_url("acme.test"), "https://acme.test");
        assert_eq!(clean_url(" http://acme.test "), "http://acme.test");
        assert_eq!(clean_url("https://acme.test/a"), "https://acme.test/a");
    }

    #[test]
    fn test_extract_page() {
        let page = extract_page(PAGE, "https://acme.test", "https://acme.test/");
        assert_eq!(page.title, "Acme Rockets");
        assert_eq!(page.meta_description.as_deref(), Some("Reusable launch vehicles"));
        assert_eq!(page.text, "About us We build rockets.");
        assert_eq!(page.word_count, 5);
    }

    #[test]
    fn test_skipped_tags_never_leak() {
        let page = extract_page(PAGE, "u", "u");
        for leaked in ["Top banner", "Home", "tracking", "Enable JS", "Copyright", "color"] {
            assert!(!page.text.contains(leaked), "{leaked} leaked");
        }
    }

    #[test]
    fn test_combined_text_of_extracted_page() {
        let page = extract_page(PAGE, "u", "u");
        assert_eq!(
            page.combined_text(),
            "Title: Acme Rockets Description: Reusable launch vehicles Content: About us We build rockets."
        );
    }

    #[test]
    fn test_og_title_fallback() {
        let html = r#"<html><head><meta property="og:title" content="OG"></head><body>x</body></html>"#;
        assert_eq!(extract_page(html, "u", "u").title, "OG");
    }

    #[test]
    fn test_script_only_page_is_empty() {
        let html = "<html><body><script>alert(1)</script></body></html>";
        let page = extract_page(html, "u", "u");
        assert_eq!(page.text, "");
        assert_eq!(page.combined_text(), "");
    }

    #[tokio::test]
    async fn test_chunked_body_within_cap() {
        let base = serve_chunked("<p>word</p>", 3).await;
        let response = reqwest::get(&base).await.unwrap();
        assert_eq!(response.content_length(), None);
        let body = read_body_capped(response, 1024).await.unwrap();
        assert_eq!(body, "<p>word</p>".repeat(3));
    }

    #[tokio::test]
    async fn test_chunked_body_over_cap_is_cut_off() {
        let base = serve_chunked("<p>word word word word word word word word</p>", 5000).await;
        let response = reqwest::get(&base).await.unwrap();
        let err = read_body_capped(response, 1024).await.unwrap_err();
        match err {
            ScrapingError::ContentTooLarge(read) => assert!(read > 1024),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_scrape_page_stops_at_cap() {
        let base = serve_chunked("<p>word word word word word word word word</p>", 5000).await;
        let config = ScrapingConfig {
            max_content_length: 1024,
            ..ScrapingConfig::default()
        };
        let client = reqwest::Client::new();
        let err = scrape_page(&client, &base, &config).await.unwrap_err();
        assert!(matches!(err, ScrapingError::ContentTooLarge(_)));
    }
}
