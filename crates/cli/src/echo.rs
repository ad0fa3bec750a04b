//! Status lines for `--verbose` runs. Everything here goes to stderr so the
//! article on stdout stays clean.

use std::fmt::Display;
use std::path::Path;

use owo_colors::OwoColorize;
use wikiterm_core::sanitize_language;

use crate::VERSION;

/// The steps a run goes through before handing over to the session.
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Configure,
    Search(&'a str),
    Fetch(&'a str),
}

impl Stage<'_> {
    const TOTAL: usize = 2;

    fn number(&self) -> usize {
        match self {
            Stage::Configure => 1,
            Stage::Search(_) | Stage::Fetch(_) => 2,
        }
    }

    fn describe(&self) -> String {
        match self {
            Stage::Configure => "Configuring client".to_string(),
            Stage::Search(query) => format!("Searching for '{}'", query),
            Stage::Fetch(title) => format!("Fetching '{}'", title),
        }
    }
}

pub fn print_banner(lang: &str) {
    eprintln!(
        "\n{} {} {}",
        "wikiterm".bold().bright_blue(),
        VERSION.dimmed(),
        format!("({}.wikipedia.org)", sanitize_language(lang)).dimmed()
    );
}

pub fn print_stage(stage: Stage<'_>) {
    let counter = format!("[{}/{}]", stage.number(), Stage::TOTAL);
    eprintln!("{} {}", counter.dimmed(), stage.describe().bright_cyan());
}

/// One indented `label: value` line under the current stage.
pub fn print_detail(label: &str, value: impl Display) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value);
}

pub fn print_saved(path: &Path, bytes: u64) {
    eprintln!("{} {} to {}", "Wrote".green(), human_size(bytes), path.display().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.bright_red());
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }

    #[test]
    fn test_stage_numbering() {
        assert_eq!(Stage::Configure.number(), 1);
        assert_eq!(Stage::Fetch("Alan Turing").number(), Stage::TOTAL);
        assert_eq!(Stage::Search("enigma").describe(), "Searching for 'enigma'");
    }
}
