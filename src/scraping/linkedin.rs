//! LinkedIn profile scraping and copy-paste parsing.
//!
//! Two entry points produce the same [`LinkedInProfile`] record:
//! [`LinkedInScraper`] fetches a public profile page and runs a
//! [`ProfileExtractor`] over the HTML, [`ProfileTextParser`] works on text a
//! user copied from a profile. Both are best effort: missing fields stay empty.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::scraping::config::{LinkedInConfig, ScrapingConfig};
use crate::scraping::content::read_body_capped;
use crate::scraping::error::ScrapingError;
use crate::text::{char_len, collapse_whitespace, truncate_chars};

/// LinkedIn UI noise removed from extracted text.
static UI_NOISE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(LinkedIn Member|View profile|Connect|Message)\b").ok()
});

/// "500+ connections", "1,234 relations".
static CONNECTIONS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,.]*\+?)\s+(connections|relations)").ok()
});

const NAME_SELECTORS: &[&str] = &[
    "h1[data-test='fullName']",
    "h1.text-heading-xlarge",
    "h1.break-words",
    ".pv-text-details__left-panel h1",
    "h1.top-card-layout__title",
];

const HEADLINE_SELECTORS: &[&str] = &[
    ".text-body-medium.break-words",
    ".pv-text-details__left-panel .text-body-medium",
    ".top-card-layout__headline",
    "[data-test='headline']",
];

const LOCATION_SELECTORS: &[&str] = &[
    ".text-body-small.inline.t-black--light.break-words",
    ".pv-text-details__left-panel .text-body-small",
    ".top-card-layout__first-subline",
];

const SUMMARY_SELECTORS: &[&str] = &[
    ".pv-shared-text-with-see-more .break-words span",
    "#about .pv-shared-text-with-see-more",
    ".core-section-container__content .break-words",
];

const CONNECTION_SELECTORS: &[&str] = &[
    ".top-card__subline-item--bullet",
    ".pv-top-card--list-bullet li",
    ".top-card-layout__first-subline",
];

const EXPERIENCE_ITEMS: &str = "section.experience li, .experience__list li";
const EDUCATION_ITEMS: &str = "section.education li, .education__list li";

const HEADLINE_KEYWORDS: &[&str] = &[
    "engineer",
    "developer",
    "manager",
    "analyst",
    "consultant",
    "director",
    "specialist",
];

const SUMMARY_KEYWORDS: &[&str] = &["about", "summary", "experienced", "passionate", "background"];

/// Max skills listed by [`format_profile_summary`].
const SUMMARY_SKILL_LIMIT: usize = 10;

/// One experience or education line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Job title or degree.
    pub title: Option<String>,
    /// Company or school.
    pub organization: Option<String>,
    /// Date range as displayed.
    pub period: Option<String>,
}

/// Structured profile record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInProfile {
    /// Full name.
    pub name: Option<String>,
    /// Headline, usually the current position.
    pub headline: Option<String>,
    /// Location line.
    pub location: Option<String>,
    /// About section.
    pub summary: Option<String>,
    /// Positions held.
    pub experience: Vec<ProfileEntry>,
    /// Schools attended.
    pub education: Vec<ProfileEntry>,
    /// Listed skills, in order, without duplicates.
    pub skills: Vec<String>,
    /// Connection count as displayed ("500+").
    pub connections: Option<String>,
    /// Source URL, when scraped.
    pub profile_url: Option<String>,
    /// Set when scraping or parsing failed.
    pub error: Option<String>,
}

impl LinkedInProfile {
    /// Empty record carrying a failure message.
    #[must_use]
    pub fn failed(error: impl Into<String>, profile_url: Option<String>) -> Self {
        Self {
            error: Some(error.into()),
            profile_url,
            ..Self::default()
        }
    }
}

/// Check the URL points at a LinkedIn member profile.
#[must_use]
pub fn is_valid_linkedin_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let host_ok = parsed
        .host_str()
        .is_some_and(|host| matches!(host.to_lowercase().as_str(), "linkedin.com" | "www.linkedin.com"));
    host_ok && parsed.path().to_lowercase().contains("/in/")
}

/// Collapse whitespace and strip LinkedIn UI labels.
#[must_use]
pub fn clean_profile_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    match UI_NOISE.as_ref() {
        Some(noise) => collapse_whitespace(&noise.replace_all(&collapsed, "")),
        None => collapsed,
    }
}

fn find_connections(text: &str) -> Option<String> {
    CONNECTIONS
        .as_ref()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Turns a profile page into a [`LinkedInProfile`].
pub trait ProfileExtractor: Send + Sync {
    /// Extract whatever fields the page exposes.
    fn extract(&self, html: &str, url: &str) -> LinkedInProfile;
}

/// CSS selector based extraction, JSON-LD `Person` as fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorExtractor;

impl SelectorExtractor {
    fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
        for selector_str in selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    let text = clean_profile_text(&element.text().collect::<Vec<_>>().join(" "));
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    fn entries(document: &Html, items: &str) -> Vec<ProfileEntry> {
        let (Ok(item), Ok(title), Ok(subtitle), Ok(period)) = (
            Selector::parse(items),
            Selector::parse("h3, .profile-section-card__title"),
            Selector::parse("h4, .profile-section-card__subtitle"),
            Selector::parse(".date-range, time"),
        ) else {
            return Vec::new();
        };

        let text_of = |element: scraper::ElementRef<'_>, selector: &Selector| {
            element
                .select(selector)
                .next()
                .map(|e| clean_profile_text(&e.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| !t.is_empty())
        };

        document
            .select(&item)
            .map(|element| ProfileEntry {
                title: text_of(element, &title),
                organization: text_of(element, &subtitle),
                period: text_of(element, &period),
            })
            .filter(|entry| entry.title.is_some() || entry.organization.is_some())
            .collect()
    }

    fn json_ld_person(document: &Html) -> Option<serde_json::Value> {
        let selector = Selector::parse("script[type='application/ld+json']").ok()?;
        document.select(&selector).find_map(|script| {
            let raw = script.text().collect::<String>();
            let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
            match &value {
                serde_json::Value::Object(map) if map.get("@type").is_some_and(|t| t == "Person") => {
                    Some(value.clone())
                }
                serde_json::Value::Object(map) => map
                    .get("@graph")
                    .and_then(|graph| graph.as_array())
                    .and_then(|items| {
                        items
                            .iter()
                            .find(|item| item.get("@type").is_some_and(|t| t == "Person"))
                            .cloned()
                    }),
                _ => None,
            }
        })
    }
}

impl ProfileExtractor for SelectorExtractor {
    fn extract(&self, html: &str, url: &str) -> LinkedInProfile {
        let document = Html::parse_document(html);

        let mut profile = LinkedInProfile {
            name: Self::first_text(&document, NAME_SELECTORS),
            headline: Self::first_text(&document, HEADLINE_SELECTORS),
            location: Self::first_text(&document, LOCATION_SELECTORS),
            summary: Self::first_text(&document, SUMMARY_SELECTORS),
            experience: Self::entries(&document, EXPERIENCE_ITEMS),
            education: Self::entries(&document, EDUCATION_ITEMS),
            connections: CONNECTION_SELECTORS.iter().find_map(|s| {
                Self::first_text(&document, &[*s]).and_then(|t| find_connections(&t))
            }),
            profile_url: Some(url.to_string()),
            ..LinkedInProfile::default()
        };

        if let Some(person) = Self::json_ld_person(&document) {
            let field = |key: &str| {
                person
                    .get(key)
                    .and_then(|v| v.as_str())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(String::from)
            };
            if profile.name.is_none() {
                profile.name = field("name");
            }
            if profile.headline.is_none() {
                profile.headline = field("jobTitle");
            }
        }

        info!(
            name = profile.name.as_deref().unwrap_or("-"),
            headline = profile.headline.as_deref().unwrap_or("-"),
            "extracted profile data"
        );
        profile
    }
}

/// Fetches public profile pages.
pub struct LinkedInScraper {
    client: reqwest::Client,
    config: LinkedInConfig,
    max_content_length: usize,
    extractor: Box<dyn ProfileExtractor>,
}

impl LinkedInScraper {
    /// Build a scraper with the selector extractor.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ScrapingConfig) -> Result<Self, ScrapingError> {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&config.random_user_agent()) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.linkedin.timeout)
            .connect_timeout(config.connect_timeout)
            .cookie_store(true)
            .gzip(true)
            .build()
            .map_err(|e| ScrapingError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            config: config.linkedin.clone(),
            max_content_length: config.max_content_length,
            extractor: Box::new(SelectorExtractor),
        })
    }

    /// Replace the HTML extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: impl ProfileExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Fetch and extract a profile.
    ///
    /// # Errors
    /// Returns an error for a non-profile URL, an anti-bot challenge, a
    /// non-retryable HTTP failure, or when every attempt failed.
    pub async fn scrape(&self, url: &str) -> Result<LinkedInProfile, ScrapingError> {
        if !is_valid_linkedin_url(url) {
            return Err(ScrapingError::InvalidLinkedInUrl(url.to_string()));
        }

        let attempts = self.config.max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.fetch(url).await {
                Ok(html) => return Ok(self.extractor.extract(&html, url)),
                Err(err) if err.is_retryable() => {
                    warn!(attempt, error = %err, "profile fetch failed");
                    if attempt >= attempts {
                        return Err(ScrapingError::RetriesExhausted {
                            attempts,
                            last: err.to_string(),
                        });
                    }
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Like [`scrape`](Self::scrape) but folds failures into the record.
    pub async fn scrape_or_error(&self, url: &str) -> LinkedInProfile {
        match self.scrape(url).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "error scraping LinkedIn profile");
                LinkedInProfile::failed(err.to_string(), Some(url.to_string()))
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, ScrapingError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ScrapingError::from_reqwest)?;

        let status = response.status().as_u16();
        if status == 999 || response.url().as_str().to_lowercase().contains("challenge") {
            return Err(ScrapingError::AntiBotChallenge);
        }
        if !response.status().is_success() {
            let body = read_body_capped(response, self.max_content_length)
                .await
                .unwrap_or_default();
            return Err(ScrapingError::HttpStatus {
                status,
                body: truncate_chars(body.trim(), 100),
            });
        }

        read_body_capped(response, self.max_content_length).await
    }
}

/// Parses profile text pasted by a user.
#[derive(Debug)]
pub struct ProfileTextParser {
    location_patterns: Vec<Regex>,
    skills_patterns: Vec<Regex>,
    delimiters: Regex,
}

impl ProfileTextParser {
    /// Compile the parser's patterns.
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, ScrapingError> {
        Ok(Self {
            location_patterns: vec![
                // City, ST
                Regex::new(r"^.*,\s*[A-Z]{2,3}(?:\s|$)")?,
                // City, Country
                Regex::new(r"^.*,\s*\w+(?:\s|$)")?,
            ],
            skills_patterns: vec![
                Regex::new(r"(?i)skills?:?\s*(.+)")?,
                Regex::new(r"(?i)technologies?:?\s*(.+)")?,
                Regex::new(r"(?i)expertise:?\s*(.+)")?,
            ],
            delimiters: Regex::new(r"[,•·|]")?,
        })
    }

    /// Parse pasted profile text into a record.
    #[must_use]
    pub fn parse(&self, text: &str) -> LinkedInProfile {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let mut profile = LinkedInProfile::default();

        let Some(first) = lines.first() else {
            return profile;
        };
        profile.name = Some((*first).to_string());

        profile.headline = lines
            .iter()
            .skip(1)
            .take(2)
            .find(|line| {
                let lower = line.to_lowercase();
                HEADLINE_KEYWORDS.iter().any(|k| lower.contains(k))
            })
            .map(|line| (*line).to_string());

        profile.location = lines
            .iter()
            .find(|line| self.location_patterns.iter().any(|p| p.is_match(line)))
            .map(|line| (*line).to_string());

        profile.summary = Self::summary(&lines);
        profile.skills = self.skills(&lines);
        profile.connections = lines.iter().find_map(|line| find_connections(line));

        info!(
            name = profile.name.as_deref().unwrap_or("-"),
            headline = profile.headline.as_deref().unwrap_or("-"),
            "parsed profile from text"
        );
        profile
    }

    /// Run of long lines starting at the first keyword line over 50 chars.
    fn summary(lines: &[&str]) -> Option<String> {
        let mut collected: Vec<&str> = Vec::new();
        let mut in_summary = false;
        for line in lines {
            let len = char_len(line);
            let lower = line.to_lowercase();
            if len > 50 && SUMMARY_KEYWORDS.iter().any(|k| lower.contains(k)) {
                in_summary = true;
                collected.push(line);
            } else if in_summary && len > 20 {
                collected.push(line);
            } else if in_summary && len < 20 {
                break;
            }
        }
        (!collected.is_empty()).then(|| collected.join(" "))
    }

    fn skills(&self, lines: &[&str]) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for line in lines {
            for pattern in &self.skills_patterns {
                let Some(listed) = pattern.captures(line).and_then(|c| c.get(1)) else {
                    continue;
                };
                for skill in self.delimiters.split(listed.as_str()) {
                    let skill = skill.trim();
                    if !skill.is_empty() && !skills.iter().any(|s| s == skill) {
                        skills.push(skill.to_string());
                    }
                }
            }
        }
        skills
    }
}

static TEXT_PARSER: LazyLock<Result<ProfileTextParser, String>> =
    LazyLock::new(|| ProfileTextParser::new().map_err(|e| e.to_string()));

/// Parse pasted text, folding a parser failure into the record.
///
/// The parser's patterns are compiled once per process.
#[must_use]
pub fn parse_linkedin_text(text: &str) -> LinkedInProfile {
    match &*TEXT_PARSER {
        Ok(parser) => parser.parse(text),
        Err(err) => {
            warn!(error = %err, "error parsing LinkedIn text");
            let mut profile = LinkedInProfile::failed(err.clone(), None);
            profile.summary = Some(if char_len(text) > 200 {
                format!("{}...", truncate_chars(text, 200))
            } else {
                text.to_string()
            });
            profile
        }
    }
}

/// Human-readable rendering of a profile.
#[must_use]
pub fn format_profile_summary(profile: &LinkedInProfile) -> String {
    let mut parts = Vec::new();
    let mut push = |label: &str, value: Option<&String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            parts.push(format!("**{label}:** {value}"));
        }
    };

    push("Name", profile.name.as_ref());
    push("Headline", profile.headline.as_ref());
    push("Location", profile.location.as_ref());
    push("Summary", profile.summary.as_ref());
    push("Connections", profile.connections.as_ref());

    if !profile.skills.is_empty() {
        let listed: Vec<&str> = profile
            .skills
            .iter()
            .take(SUMMARY_SKILL_LIMIT)
            .map(String::as_str)
            .collect();
        parts.push(format!("**Skills:** {}", listed.join(", ")));
    }
    if !profile.experience.is_empty() {
        parts.push(format!("**Experience:** {} position(s)", profile.experience.len()));
    }
    if !profile.education.is_empty() {
        parts.push(format!("**Education:** {} entry(ies)", profile.education.len()));
    }
    if let Some(error) = &profile.error {
        parts.push(format!("**Error:** {error}"));
    }

    parts.join("\n\n")
}
