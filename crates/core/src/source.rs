//! The seam between article retrieval and everything that consumes it.

use crate::{ArticleQuery, RawContent, Result, SectionInfo};

/// Something that can search, outline and fetch wiki articles.
///
/// [`crate::WikiClient`] talks to the MediaWiki action API; tests supply an
/// in-memory implementation. Each call is independent and carries its own
/// language code.
#[allow(async_fn_in_trait)]
pub trait ArticleSource {
    /// Titles matching `query`, most relevant first.
    ///
    /// Returns `Ok(None)` when the service answers with a non-success status.
    async fn search(&self, query: &str, lang: &str) -> Result<Option<Vec<String>>>;

    /// Table of contents of `title`, in document order.
    async fn list_sections(&self, title: &str, lang: &str) -> Result<Vec<SectionInfo>>;

    /// Rendered markup for the whole article or one section of it.
    async fn fetch_content(&self, query: &ArticleQuery) -> Result<RawContent>;
}
