//! HTML parsing and in-place DOM pruning.
//!
//! This module provides the [`Document`] type, a mutable tree over an HTML
//! fragment such as the markup returned by the MediaWiki `parse` action.
//!
//! # Example
//!
//! ```rust
//! use wikiterm_core::parse::Document;
//!
//! let mut doc = Document::parse(r#"<p>Text</p><div class="navbox">Links</div>"#).unwrap();
//! let removed = doc.remove_matching(".navbox").unwrap();
//! assert_eq!(removed, 1);
//! assert_eq!(doc.to_html(), "<p>Text</p>");
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{Result, WikitermError};

/// A parsed HTML fragment that can be pruned node by node.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses an HTML fragment.
    ///
    /// Document-level tags (`<html>`, `<body>`) in the input are ignored;
    /// their content becomes the fragment.
    ///
    /// # Errors
    ///
    /// Returns [`WikitermError::NoContent`] when the markup is blank or
    /// parses to nothing.
    pub fn parse(markup: &str) -> Result<Self> {
        if markup.trim().is_empty() {
            return Err(WikitermError::NoContent);
        }

        let html = Html::parse_fragment(markup);
        let doc = Self { html };

        if doc.root().children().next().is_none() {
            return Err(WikitermError::NoContent);
        }

        Ok(doc)
    }

    /// The fragment's container element.
    fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`WikitermError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).collect())
    }

    /// Concatenated text of every text node in the fragment.
    pub fn text_content(&self) -> String {
        self.root().text().collect()
    }

    /// Removes every element matching `selector`, subtree included.
    ///
    /// Returns the number of matched elements.
    pub fn remove_matching(&mut self, selector: &str) -> Result<usize> {
        let sel = parse_selector(selector)?;
        Ok(self.remove_where(|el| sel.matches(&el)))
    }

    /// Removes every element for which `predicate` returns true.
    ///
    /// The predicate sees the tree as it was before this call: all matches
    /// are collected first, then detached. An element whose subtree only
    /// becomes empty because of removals in this call is therefore not
    /// revisited. Returns the number of matched elements.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(ElementRef<'_>) -> bool,
    {
        let root = self.root();
        let root_id = root.id();
        let doomed: Vec<_> = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.id() != root_id && predicate(*el))
            .map(|el| el.id())
            .collect();

        for id in &doomed {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }

        doomed.len()
    }

    /// Serializes the fragment back to markup, without the container element.
    pub fn to_html(&self) -> String {
        self.root().inner_html()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| WikitermError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// True when the element renders no visible text.
pub fn has_no_text(el: &ElementRef<'_>) -> bool {
    el.text().all(|t| t.trim().is_empty())
}

/// True when the element is, or contains, an `<img>`.
pub fn has_image(el: &ElementRef<'_>) -> bool {
    el.value().name() == "img"
        || el
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|d| d.value().name() == "img")
}
