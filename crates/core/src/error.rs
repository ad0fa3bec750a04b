//! Error types for Wikiterm operations.
//!
//! This module defines the main error type [`WikitermError`]. Its variants
//! fall into two classes that callers handle differently:
//!
//! - **Transport** failures: the request never produced a usable response
//!   (network error, timeout, non-success status). These all render as an
//!   "HTTP error" message.
//! - **Domain** failures: the service answered, but the answer says there is
//!   nothing to show (missing article, missing section, empty content).
//!
//! # Example
//!
//! ```rust
//! use wikiterm_core::{Result, WikitermError};
//!
//! fn require_content(html: &str) -> Result<&str> {
//!     if html.trim().is_empty() {
//!         return Err(WikitermError::NoContent);
//!     }
//!     Ok(html)
//! }
//!
//! assert!(require_content("   ").unwrap_err().is_domain());
//! ```

use thiserror::Error;

/// Main error type for article retrieval and sanitization.
///
/// # Example
///
/// ```rust
/// use wikiterm_core::WikitermError;
///
/// let err = WikitermError::ArticleNotFound;
/// match err {
///     e if e.is_transport() => println!("network trouble: {}", e),
///     e => println!("{}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum WikitermError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps DNS failures, refused connections, TLS problems and bodies
    /// that could not be decoded as JSON.
    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("HTTP error occurred (status {status})")]
    HttpStatus { status: u16 },

    /// Request timeout.
    #[error("HTTP error: request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Nothing usable was left of the language code after stripping
    /// characters outside `[A-Za-z0-9-]`.
    #[error("Invalid language code: {0:?}")]
    InvalidLanguage(String),

    /// An endpoint or link could not be turned into a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The API reported that the requested page does not exist.
    #[error("Article not found.")]
    ArticleNotFound,

    /// The requested section has no revision content.
    #[error("Section not found.")]
    SectionNotFound,

    /// The render endpoint rejected the submitted wikitext.
    #[error("Error parsing wikitext: {0}")]
    WikitextParseError(String),

    /// The API answered but carried no markup.
    #[error("HTML content is empty or malformed.")]
    NoContent,

    /// HTML could not be processed.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),
}

impl WikitermError {
    /// Returns true for failures where no well-formed answer was received.
    pub fn is_transport(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            WikitermError::HttpError(_) => true,
            WikitermError::HttpStatus { .. } | WikitermError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns true for well-formed negative answers from the service.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            WikitermError::ArticleNotFound
                | WikitermError::SectionNotFound
                | WikitermError::WikitextParseError(_)
                | WikitermError::NoContent
        )
    }
}

/// Result type alias for WikitermError.
///
/// This is a convenience alias for `std::result::Result<T, WikitermError>`.
pub type Result<T> = std::result::Result<T, WikitermError>;
