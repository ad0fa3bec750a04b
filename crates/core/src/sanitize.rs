//! Turning rendered article markup into readable text.
//!
//! The pipeline runs in a fixed order; later steps assume the earlier
//! cleanup already happened:
//!
//! 1. parse the markup into a mutable tree
//! 2. drop non-content tags (`script`, `style`, `noscript`, `meta`, `link`, `iframe`)
//! 3. drop wiki chrome: navboxes, category links, print footers, infoboxes,
//!    metadata and ambox notices, edit-section controls
//! 4. drop paragraphs with no visible text
//! 5. make `/wiki/...` links absolute for the article's language
//! 6. drop remaining elements with neither text nor an image, in one pass
//! 7. convert to readable text (see [`crate::markdown`])
//! 8. trim

use tracing::debug;
use url::Url;

use crate::markdown::{ReadableConfig, html_to_readable};
use crate::parse::{Document, has_image, has_no_text};
use crate::{Result, WikitermError, wiki_base_url};

const NON_CONTENT_TAGS: &str = "script, style, noscript, meta, link, iframe";

const WIKI_CHROME: &str =
    ".navbox, .catlinks, .printfooter, .infobox, .metadata, .ambox, .mw-editsection, span.mw-editsection";

/// Placeholder tag MediaWiki emits for edit links when they are not rendered.
const EDIT_SECTION_TAG: &str = "mw:editsection";

/// Sanitize rendered article markup into readable text for `lang`'s wiki.
///
/// # Example
///
/// ```rust
/// use wikiterm_core::sanitize;
///
/// let html = r#"<p>See <a href="/wiki/Enigma_machine">Enigma</a>.</p><script>track()</script>"#;
/// let text = sanitize(html, "en").unwrap();
/// assert!(text.contains("https://en.wikipedia.org/wiki/Enigma_machine"));
/// assert!(!text.contains("track"));
/// ```
pub fn sanitize(markup: &str, lang: &str) -> Result<String> {
    sanitize_with_config(markup, lang, &ReadableConfig::default())
}

/// [`sanitize`] with explicit text conversion settings.
pub fn sanitize_with_config(markup: &str, lang: &str, config: &ReadableConfig) -> Result<String> {
    let cleaned = clean_html(markup, lang)?;
    let text = html_to_readable(&cleaned, config)?;
    debug!(markup_bytes = markup.len(), text_bytes = text.len(), "sanitized article");

    let text = text.trim();
    if text.is_empty() {
        return Err(WikitermError::NoContent);
    }
    Ok(text.to_string())
}

/// Steps 1 through 6: prune the markup and return cleaned HTML.
///
/// Applying this to its own output changes nothing.
pub fn clean_html(markup: &str, lang: &str) -> Result<String> {
    let base = wiki_base_url(lang)?;

    let mut doc = Document::parse(markup)?;
    doc.remove_matching(NON_CONTENT_TAGS)?;
    doc.remove_matching(WIKI_CHROME)?;
    doc.remove_where(|el| el.value().name() == EDIT_SECTION_TAG);
    doc.remove_where(|el| el.value().name() == "p" && has_no_text(&el) && !has_image(&el));

    let linked = absolutize_wiki_links(&doc.to_html(), &base)?;

    // Single pass: wrappers of nodes removed here are not revisited.
    let mut doc = Document::parse(&linked)?;
    let removed = doc.remove_where(|el| has_no_text(&el) && !has_image(&el));
    debug!(removed, "dropped empty elements");

    Ok(doc.to_html())
}

/// Rewrite root-relative `/wiki/...` hrefs against `base`.
///
/// Other links (external, protocol-relative, fragment-only) are untouched.
pub fn absolutize_wiki_links(html: &str, base: &Url) -> Result<String> {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("a[href]", |el| {
                if let Some(href) = el.get_attribute("href")
                    && href.starts_with("/wiki/")
                    && let Ok(absolute) = base.join(&href)
                {
                    el.set_attribute("href", absolute.as_str()).ok();
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| WikitermError::HtmlParseError(e.to_string()))?;
    rewriter.end().map_err(|e| WikitermError::HtmlParseError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| WikitermError::HtmlParseError(e.to_string()))
}
