use std::borrow::Cow;

use crate::{Result, WikitermError};

/// Configuration for HTML to readable text conversion
#[derive(Debug, Clone)]
pub struct ReadableConfig {
    /// Keep hyperlinks as `[text](url)`
    pub keep_links: bool,
    /// Drop image references entirely
    pub strip_images: bool,
}

impl Default for ReadableConfig {
    fn default() -> Self {
        Self { keep_links: true, strip_images: true }
    }
}

/// Convert cleaned HTML into readable Markdown-flavoured text.
///
/// Tables keep their structure, lines are never wrapped to a column width,
/// and characters are emitted as-is rather than as escapes or entities.
pub fn html_to_readable(html: &str, config: &ReadableConfig) -> Result<String> {
    let mut processed = html.to_string();

    if config.strip_images {
        processed = strip_images(&processed)?;
    }

    if !config.keep_links {
        processed = unwrap_links(&processed)?;
    }

    html_to_markdown(&processed)
}

/// Convert HTML to Markdown using htmd crate
#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> Result<String> {
    htmd::convert(html).map_err(|e| WikitermError::HtmlParseError(format!("Markdown conversion failed: {}", e)))
}

/// Fallback HTML to text conversion when markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn html_to_markdown(html: &str) -> Result<String> {
    let doc = scraper::Html::parse_fragment(html);
    Ok(doc.root_element().text().collect::<String>())
}

/// Strip all img tags from HTML
fn strip_images(html: &str) -> Result<String> {
    rewrite(
        html,
        vec![lol_html::element!("img", |el| {
            el.remove();
            Ok(())
        })],
    )
}

/// Replace every anchor with its text
fn unwrap_links(html: &str) -> Result<String> {
    rewrite(
        html,
        vec![lol_html::element!("a", |el| {
            el.remove_and_keep_content();
            Ok(())
        })],
    )
}

fn rewrite<'h>(
    html: &str, handlers: Vec<(Cow<'h, lol_html::Selector>, lol_html::ElementContentHandlers<'h>)>,
) -> Result<String> {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| WikitermError::HtmlParseError(e.to_string()))?;
    rewriter.end().map_err(|e| WikitermError::HtmlParseError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| WikitermError::HtmlParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_preserved() {
        let html = r#"<p>See <a href="https://en.wikipedia.org/wiki/Enigma_machine">Enigma</a>.</p>"#;
        let text = html_to_readable(html, &ReadableConfig::default()).unwrap();
        assert!(text.contains("[Enigma](https://en.wikipedia.org/wiki/Enigma_machine)"));
    }

    #[test]
    fn test_links_unwrapped() {
        let html = r#"<p>See <a href="https://example.com">Enigma</a>.</p>"#;
        let config = ReadableConfig { keep_links: false, ..Default::default() };
        let text = html_to_readable(html, &config).unwrap();
        assert!(text.contains("Enigma"));
        assert!(!text.contains("example.com"));
    }

    #[test]
    fn test_images_dropped() {
        let html = r#"<p>Before <img src="//upload.wikimedia.org/turing.jpg" alt="Turing"> after.</p>"#;
        let text = html_to_readable(html, &ReadableConfig::default()).unwrap();
        assert!(!text.contains("turing.jpg"));
        assert!(!text.contains("!["));
        assert!(text.contains("Before"));
        assert!(text.contains("after."));
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_tables_keep_structure() {
        let html = r#"
            <table>
                <thead><tr><th>Year</th><th>Event</th></tr></thead>
                <tbody><tr><td>1936</td><td>On Computable Numbers</td></tr></tbody>
            </table>
        "#;

        let text = html_to_readable(html, &ReadableConfig::default()).unwrap();
        assert!(text.contains("|"));
        assert!(text.contains("Year"));
        assert!(text.contains("On Computable Numbers"));
    }

    #[test]
    fn test_long_lines_not_wrapped() {
        let sentence = "word ".repeat(60);
        let html = format!("<p>{}</p>", sentence.trim());
        let text = html_to_readable(&html, &ReadableConfig::default()).unwrap();
        assert_eq!(text.trim().lines().count(), 1);
    }

    #[test]
    fn test_conversion_of_nothing_is_empty_not_error() {
        let text = html_to_readable(r#"<p><img src="x.png"></p>"#, &ReadableConfig::default()).unwrap();
        assert!(text.trim().is_empty());
        assert_eq!(html_to_markdown("").unwrap(), "");
    }

    #[test]
    fn test_unicode_kept_verbatim() {
        let html = "<p>Gödel, Escher &amp; Bach — 東京</p>";
        let text = html_to_readable(html, &ReadableConfig::default()).unwrap();
        assert!(text.contains("Gödel"));
        assert!(text.contains("東京"));
        assert!(!text.contains("&#"));
    }
}
