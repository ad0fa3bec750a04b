//! MediaWiki action API client.
//!
//! [`WikiClient`] implements [`ArticleSource`] against
//! `https://{lang}.wikipedia.org/w/api.php`. Calls are independent: no
//! retries, no caching, one request per step.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::wikitext::append_reference_placeholders;
use crate::{ArticleQuery, ArticleSource, RawContent, Result, SectionInfo, WikitermError, api_url, sanitize_language};

/// HTTP client configuration for the wiki API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Maximum number of search results.
    pub search_limit: u32,
    /// Fixed endpoint used for every language instead of the per-language
    /// wikipedia.org host. Mostly useful for mirrors and tests.
    pub api_base: Option<Url>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: format!("wikiterm/{} (terminal Wikipedia reader)", env!("CARGO_PKG_VERSION")),
            search_limit: 10,
            api_base: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct ParseEnvelope {
    parse: Option<ParseBody>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParseBody {
    text: Option<Star>,
    #[serde(default)]
    sections: Vec<SectionInfo>,
}

/// Legacy (`formatversion=1`) content wrapper: `{"*": "..."}`.
#[derive(Debug, Deserialize)]
struct Star {
    #[serde(rename = "*", default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    query: Option<QueryBody>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    revisions: Vec<Star>,
}

/// Client for the MediaWiki action API.
#[derive(Debug, Clone)]
pub struct WikiClient {
    http: Client,
    config: ClientConfig,
}

impl WikiClient {
    /// Builds a client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API endpoint for `lang`, after stripping it to `[A-Za-z0-9-]`.
    pub fn endpoint(&self, lang: &str) -> Result<Url> {
        match &self.config.api_base {
            Some(base) => {
                if sanitize_language(lang).is_empty() {
                    return Err(WikitermError::InvalidLanguage(lang.to_string()));
                }
                Ok(base.clone())
            }
            None => api_url(lang),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "wiki API returned an error status");
            return Err(WikitermError::HttpStatus { status: status.as_u16() });
        }

        response.json::<T>().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> WikitermError {
        if e.is_timeout() { WikitermError::Timeout { timeout: self.config.timeout } } else { WikitermError::HttpError(e) }
    }

    /// Fetch the raw wikitext of one section by revision content query.
    async fn section_wikitext(&self, query: &ArticleQuery, section: u32) -> Result<String> {
        let section = section.to_string();
        let params = [
            ("action", "query"),
            ("prop", "revisions"),
            ("titles", query.title.as_str()),
            ("rvprop", "content"),
            ("rvsection", section.as_str()),
            ("format", "json"),
            ("redirects", "1"),
        ];

        debug!(title = %query.title, lang = %query.lang, section = %section, "fetching section wikitext");
        let envelope: QueryEnvelope = self.send(self.http.get(self.endpoint(&query.lang)?).query(&params)).await?;

        if let Some(err) = envelope.error {
            warn!(code = %err.code, info = %err.info, "section query failed");
            return Err(WikitermError::SectionNotFound);
        }

        envelope
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| page.revisions.into_iter().next())
            .map(|rev| rev.content)
            .ok_or(WikitermError::SectionNotFound)
    }

    /// Render wikitext submitted as literal source text.
    async fn render_wikitext(&self, lang: &str, wikitext: &str) -> Result<String> {
        let params = [
            ("action", "parse"),
            ("format", "json"),
            ("text", wikitext),
            ("contentmodel", "wikitext"),
            ("prop", "text"),
        ];

        debug!(lang, bytes = wikitext.len(), "rendering wikitext");
        let envelope: ParseEnvelope = self.send(self.http.post(self.endpoint(lang)?).form(&params)).await?;

        if let Some(err) = envelope.error {
            warn!(code = %err.code, info = %err.info, "wikitext render failed");
            return Err(WikitermError::WikitextParseError(err.info));
        }

        Ok(envelope.parse.and_then(|p| p.text).map(|t| t.content).unwrap_or_default())
    }

    /// Render a whole page by title, following redirects.
    async fn render_page(&self, query: &ArticleQuery) -> Result<String> {
        let params = [
            ("action", "parse"),
            ("page", query.title.as_str()),
            ("format", "json"),
            ("redirects", "1"),
            ("prop", "text"),
            ("disableeditsection", "1"),
        ];

        debug!(title = %query.title, lang = %query.lang, "fetching article");
        let envelope: ParseEnvelope = self.send(self.http.get(self.endpoint(&query.lang)?).query(&params)).await?;

        if let Some(err) = envelope.error {
            warn!(code = %err.code, info = %err.info, "article lookup failed");
            return Err(WikitermError::ArticleNotFound);
        }

        Ok(envelope.parse.and_then(|p| p.text).map(|t| t.content).unwrap_or_default())
    }
}

impl ArticleSource for WikiClient {
    async fn search(&self, query: &str, lang: &str) -> Result<Option<Vec<String>>> {
        let limit = self.config.search_limit.to_string();
        let params = [
            ("action", "opensearch"),
            ("search", query),
            ("limit", limit.as_str()),
            ("namespace", "0"),
            ("format", "json"),
        ];

        debug!(query, lang, "searching");
        let result: Result<serde_json::Value> = self.send(self.http.get(self.endpoint(lang)?).query(&params)).await;

        let body = match result {
            Ok(body) => body,
            Err(WikitermError::HttpStatus { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        // opensearch answers [query, [titles], [descriptions], [urls]]
        let titles = body
            .get(1)
            .and_then(|v| v.as_array())
            .map(|titles| titles.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        Ok(Some(titles))
    }

    async fn list_sections(&self, title: &str, lang: &str) -> Result<Vec<SectionInfo>> {
        let params = [("action", "parse"), ("page", title), ("format", "json"), ("prop", "sections")];

        debug!(title, lang, "listing sections");
        let envelope: ParseEnvelope = self.send(self.http.get(self.endpoint(lang)?).query(&params)).await?;

        if let Some(err) = envelope.error {
            warn!(code = %err.code, info = %err.info, "outline lookup failed");
            return Err(WikitermError::ArticleNotFound);
        }

        Ok(envelope.parse.map(|p| p.sections).unwrap_or_default())
    }

    async fn fetch_content(&self, query: &ArticleQuery) -> Result<RawContent> {
        let html = match query.section {
            Some(section) => {
                let wikitext = self.section_wikitext(query, section).await?;
                let augmented = append_reference_placeholders(&wikitext);
                self.render_wikitext(&query.lang, &augmented).await?
            }
            None => self.render_page(query).await?,
        };

        if html.trim().is_empty() {
            return Err(WikitermError::NoContent);
        }

        Ok(RawContent { html, lang: sanitize_language(&query.lang) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.search_limit, 10);
        assert!(config.user_agent.starts_with("wikiterm/"));
        assert!(config.api_base.is_none());
    }

    #[test]
    fn test_endpoint_per_language() {
        let client = WikiClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.endpoint("de").unwrap().as_str(), "https://de.wikipedia.org/w/api.php");
        assert_eq!(
            client.endpoint("de.attacker.net/x?").unwrap().as_str(),
            "https://deattackernetx.wikipedia.org/w/api.php"
        );
    }

    #[test]
    fn test_endpoint_override_still_checks_language() {
        let base = Url::parse("http://127.0.0.1:9/w/api.php").unwrap();
        let config = ClientConfig { api_base: Some(base.clone()), ..Default::default() };
        let client = WikiClient::new(config).unwrap();

        assert_eq!(client.endpoint("en").unwrap(), base);
        assert!(matches!(client.endpoint("%%"), Err(WikitermError::InvalidLanguage(_))));
    }

    #[test]
    fn test_parse_envelope_error() {
        let json = r#"{"error":{"code":"missingtitle","info":"The page you specified doesn't exist."}}"#;
        let envelope: ParseEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.parse.is_none());
        assert_eq!(envelope.error.unwrap().code, "missingtitle");
    }

    #[test]
    fn test_query_envelope_missing_page() {
        let json = r#"{"batchcomplete":"","query":{"pages":{"-1":{"ns":0,"title":"Nope","missing":""}}}}"#;
        let envelope: QueryEnvelope = serde_json::from_str(json).unwrap();
        let page = envelope.query.unwrap().pages.into_values().next().unwrap();
        assert!(page.revisions.is_empty());
    }
}
