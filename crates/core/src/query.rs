//! Request-scoped values passed between the client, the sanitizer and callers.
//!
//! Nothing here outlives a single user action: a query is built, answered,
//! and dropped.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Result, WikitermError};

/// Strip every character outside `[A-Za-z0-9-]` from a language code.
///
/// Every path that interpolates a language code into a URL goes through this
/// function first.
///
/// # Example
///
/// ```rust
/// use wikiterm_core::sanitize_language;
///
/// assert_eq!(sanitize_language("en"), "en");
/// assert_eq!(sanitize_language("en.evil.com/"), "enevilcom");
/// assert_eq!(sanitize_language("zh-classical"), "zh-classical");
/// ```
pub fn sanitize_language(lang: &str) -> String {
    lang.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect()
}

/// Site root for a language edition, e.g. `https://fr.wikipedia.org/`.
pub fn wiki_base_url(lang: &str) -> Result<Url> {
    let code = sanitize_language(lang);
    if code.is_empty() {
        return Err(WikitermError::InvalidLanguage(lang.to_string()));
    }

    Url::parse(&format!("https://{}.wikipedia.org/", code)).map_err(|e| WikitermError::InvalidUrl(e.to_string()))
}

/// Action API endpoint for a language edition.
pub fn api_url(lang: &str) -> Result<Url> {
    wiki_base_url(lang)?
        .join("w/api.php")
        .map_err(|e| WikitermError::InvalidUrl(e.to_string()))
}

/// What the user asked to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    /// Article title as typed or picked from search results.
    pub title: String,
    /// Language code; already stripped to `[A-Za-z0-9-]`.
    pub lang: String,
    /// Section to fetch instead of the whole page.
    pub section: Option<u32>,
}

impl ArticleQuery {
    /// Query for a whole article. The language code is sanitized here.
    pub fn new(title: impl Into<String>, lang: &str) -> Self {
        Self { title: title.into(), lang: sanitize_language(lang), section: None }
    }

    /// Restrict the query to one section of the article.
    pub fn with_section(mut self, section: u32) -> Self {
        self.section = Some(section);
        self
    }
}

/// One entry of an article's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionInfo {
    /// Opaque ordinal used to fetch the section. Usually numeric, but
    /// transcluded sections carry values such as `T-1`.
    pub index: String,
    /// Heading text as rendered by the wiki (may contain inline markup).
    #[serde(rename = "line")]
    pub heading: String,
    /// Table-of-contents depth, starting at 1.
    #[serde(rename = "toclevel")]
    pub toc_level: u32,
}

impl SectionInfo {
    /// Numeric value of the index, if it has one.
    pub fn number(&self) -> Option<u32> {
        if !self.index.is_empty() && self.index.chars().all(|c| c.is_ascii_digit()) {
            self.index.parse().ok()
        } else {
            None
        }
    }

    /// Leading indentation for outline display: two spaces per level below the top.
    pub fn indent(&self) -> String {
        "  ".repeat(self.toc_level.saturating_sub(1) as usize)
    }
}

/// Markup returned by the API for an article or one of its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// Rendered HTML.
    pub html: String,
    /// Language edition the markup came from.
    pub lang: String,
}
