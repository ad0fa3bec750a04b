#[cfg(feature = "fetch")]
pub mod client;
pub mod error;
pub mod markdown;
pub mod parse;
pub mod query;
pub mod sanitize;
pub mod source;
pub mod wikitext;

#[cfg(feature = "fetch")]
pub use client::{ClientConfig, WikiClient};
pub use error::{Result, WikitermError};
pub use markdown::{ReadableConfig, html_to_readable};
pub use parse::Document;
pub use query::{ArticleQuery, RawContent, SectionInfo, api_url, sanitize_language, wiki_base_url};
pub use sanitize::{clean_html, sanitize, sanitize_with_config};
pub use source::ArticleSource;
pub use wikitext::append_reference_placeholders;
