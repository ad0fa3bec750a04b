//! The interactive loop: search, pick an article, pick a section, show it.

use std::fmt::Display;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use owo_colors::OwoColorize;
use wikiterm_core::{ArticleQuery, ArticleSource, SectionInfo, WikitermError, sanitize, sanitize_language};

use crate::{pager, render};

/// Behaviour switches taken from the command line.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub lang: String,
    pub search: bool,
    pub section: bool,
    pub output: Option<PathBuf>,
    pub pager: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { lang: "en".to_string(), search: false, section: false, output: None, pager: false }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user got what they asked for, or quit.
    Done,
    /// Missing input or nothing found; already reported to the user.
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// What a section prompt resolved to.
enum SectionChoice {
    Whole,
    Section(u32),
    Back,
    Retry,
}

pub struct Session<'a, S, R, W> {
    source: &'a S,
    options: SessionOptions,
    input: R,
    out: W,
}

impl<'a, S, R, W> Session<'a, S, R, W>
where
    S: ArticleSource,
    R: BufRead,
    W: Write,
{
    pub fn new(source: &'a S, options: SessionOptions, input: R, out: W) -> Self {
        Self { source, options, input, out }
    }

    /// Run the session for the words given on the command line.
    pub async fn run(&mut self, words: &str) -> anyhow::Result<Outcome> {
        let words = words.trim();

        if words.is_empty() {
            let what = if self.options.search { "search query" } else { "article title" };
            self.fail(format!("Error: No {} provided.", what))?;
            return Ok(Outcome::Failed);
        }

        // Report the code as typed; nothing of it would reach a request.
        if sanitize_language(&self.options.lang).is_empty() {
            self.fail(WikitermError::InvalidLanguage(self.options.lang.clone()))?;
            return Ok(Outcome::Failed);
        }

        if self.options.search { self.search_flow(words.to_string()).await } else { self.direct_flow(words).await }
    }

    async fn search_flow(&mut self, mut query: String) -> anyhow::Result<Outcome> {
        loop {
            let results = match self.source.search(&query, &self.options.lang).await {
                Ok(results) => results.unwrap_or_default(),
                Err(e) => {
                    self.fail(&e)?;
                    return Ok(Outcome::Failed);
                }
            };

            if results.is_empty() {
                self.say(format!("No results found for '{}'.", query))?;
                return Ok(Outcome::Done);
            }

            self.say("\nSearch results:")?;
            for (i, title) in results.iter().enumerate() {
                self.say(format!("{}. {}", i + 1, title))?;
            }

            let Some(choice) = self.ask("Select an article by number (or 'q' to quit, 's' to search again): ")? else {
                return Ok(Outcome::Done);
            };

            match choice.to_lowercase().as_str() {
                "q" => return Ok(Outcome::Done),
                "s" => {
                    match self.ask("Enter a new search query: ")? {
                        Some(next) => query = next,
                        None => return Ok(Outcome::Done),
                    }
                    continue;
                }
                _ => {}
            }

            let title = match choice.parse::<usize>() {
                Ok(n) if n >= 1 && n <= results.len() => results[n - 1].clone(),
                _ => {
                    self.fail("Invalid selection.")?;
                    continue;
                }
            };

            self.read_from_search(&title).await?;

            match self.ask("\nWould you like to select another article? (y/n): ")? {
                Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
                _ => return Ok(Outcome::Done),
            }
        }
    }

    /// Show `title` picked from search results. Failures are reported and
    /// hand control back to the search menu.
    async fn read_from_search(&mut self, title: &str) -> anyhow::Result<()> {
        loop {
            let mut sections = Vec::new();
            let mut section = None;

            if self.options.section {
                sections = match self.source.list_sections(title, &self.options.lang).await {
                    Ok(sections) => sections,
                    Err(e) => {
                        self.fail(&e)?;
                        return Ok(());
                    }
                };

                if sections.is_empty() {
                    self.say("No sections available.")?;
                    return Ok(());
                }

                self.show_outline(&sections)?;
                match self.choose_section(&sections, "Select a section by number (or 'b' to go back): ", false)? {
                    SectionChoice::Section(n) => section = Some(n),
                    SectionChoice::Retry => continue,
                    SectionChoice::Back | SectionChoice::Whole => return Ok(()),
                }
            }

            if let Err(e) = self.show_article(title, section, &sections).await? {
                self.fail(e)?;
                if self.options.section {
                    continue;
                }
                return Ok(());
            }

            if !self.options.section || !self.another("\nWould you like to select another section? (y/n): ")? {
                return Ok(());
            }
        }
    }

    async fn direct_flow(&mut self, title: &str) -> anyhow::Result<Outcome> {
        loop {
            let mut sections = Vec::new();
            let mut section = None;

            if self.options.section {
                sections = match self.source.list_sections(title, &self.options.lang).await {
                    Ok(sections) => sections,
                    Err(e) => {
                        self.fail(&e)?;
                        return Ok(Outcome::Failed);
                    }
                };

                if sections.is_empty() {
                    self.say("No sections available.")?;
                } else {
                    self.show_outline(&sections)?;
                    match self.choose_section(&sections, "Select a section by number (or press Enter to skip): ", true)? {
                        SectionChoice::Section(n) => section = Some(n),
                        SectionChoice::Whole => {}
                        SectionChoice::Retry => continue,
                        SectionChoice::Back => return Ok(Outcome::Done),
                    }
                }
            }

            if let Err(e) = self.show_article(title, section, &sections).await? {
                self.fail(e)?;
                return Ok(Outcome::Failed);
            }

            if !self.options.section || !self.another("\nWould you like to select another section? (y/n): ")? {
                return Ok(Outcome::Done);
            }
        }
    }

    fn show_outline(&mut self, sections: &[SectionInfo]) -> anyhow::Result<()> {
        self.say("\nAvailable sections:")?;
        for sec in sections {
            self.say(format!("{}. {}{}", sec.index, sec.indent(), sec.heading))?;
        }
        Ok(())
    }

    /// Prompt for a section index. Only numeric indices listed in `sections`
    /// are accepted.
    fn choose_section(
        &mut self, sections: &[SectionInfo], prompt: &str, enter_skips: bool,
    ) -> anyhow::Result<SectionChoice> {
        let Some(choice) = self.ask(prompt)? else {
            return Ok(SectionChoice::Back);
        };

        if choice.is_empty() && enter_skips {
            return Ok(SectionChoice::Whole);
        }
        if !enter_skips && choice.eq_ignore_ascii_case("b") {
            return Ok(SectionChoice::Back);
        }

        let listed = sections.iter().any(|s| s.index == choice);
        match choice.parse::<u32>() {
            Ok(n) if listed && choice.chars().all(|c| c.is_ascii_digit()) => Ok(SectionChoice::Section(n)),
            _ => {
                self.fail("Invalid selection.")?;
                Ok(SectionChoice::Retry)
            }
        }
    }

    /// Fetch, sanitize and deliver one article or section.
    ///
    /// The outer result carries I/O failures of our own; the inner one carries
    /// retrieval failures the caller reports and recovers from.
    async fn show_article(
        &mut self, title: &str, section: Option<u32>, sections: &[SectionInfo],
    ) -> anyhow::Result<Result<(), WikitermError>> {
        let mut query = ArticleQuery::new(title, &self.options.lang);
        if let Some(n) = section {
            query = query.with_section(n);
        }

        let raw = match self.source.fetch_content(&query).await {
            Ok(raw) => raw,
            Err(e) => return Ok(Err(e)),
        };
        let text = match sanitize(&raw.html, &raw.lang) {
            Ok(text) => text,
            Err(e) => return Ok(Err(e)),
        };

        if let Some(n) = section
            && let Some(sec) = sections.iter().find(|s| s.index == n.to_string())
        {
            self.say(format!("\n# {}\n", sec.heading).bold())?;
        }

        if let Some(path) = self.options.output.clone() {
            fs::write(&path, &text).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "article saved");
            self.say(format!("Article saved to {}", path.display().bold()))?;
        } else if self.options.pager {
            let command = pager::pager_command();
            if let Err(e) = pager::page(&text, &command) {
                self.fail(format!("Error using pager: {}", e))?;
                self.say(render::style_markdown(&text))?;
            }
        } else {
            self.say(render::style_markdown(&text))?;
        }

        Ok(Ok(()))
    }

    fn another(&mut self, prompt: &str) -> anyhow::Result<bool> {
        Ok(matches!(self.ask(prompt)?, Some(answer) if answer.eq_ignore_ascii_case("y")))
    }

    /// Print `prompt` and read one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read input")?;
        if read == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: impl Display) -> anyhow::Result<()> {
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn fail(&mut self, message: impl Display) -> anyhow::Result<()> {
        writeln!(self.out, "{}", message.to_string().bold().red())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use wikiterm_core::{RawContent, Result, WikitermError};

    /// In-memory article source recording every fetch.
    #[derive(Default)]
    struct FakeSource {
        results: Option<Vec<String>>,
        sections: Vec<SectionInfo>,
        fetched: RefCell<Vec<ArticleQuery>>,
    }

    impl FakeSource {
        fn turing() -> Self {
            Self {
                results: Some(vec!["Turing machine".into(), "Alan Turing".into()]),
                sections: vec![
                    SectionInfo { index: "1".into(), heading: "Early life".into(), toc_level: 1 },
                    SectionInfo { index: "2".into(), heading: "School".into(), toc_level: 2 },
                ],
                fetched: RefCell::new(Vec::new()),
            }
        }
    }

    impl ArticleSource for FakeSource {
        async fn search(&self, _query: &str, _lang: &str) -> Result<Option<Vec<String>>> {
            Ok(self.results.clone())
        }

        async fn list_sections(&self, title: &str, _lang: &str) -> Result<Vec<SectionInfo>> {
            if title == "Missing" { Err(WikitermError::ArticleNotFound) } else { Ok(self.sections.clone()) }
        }

        async fn fetch_content(&self, query: &ArticleQuery) -> Result<RawContent> {
            self.fetched.borrow_mut().push(query.clone());
            if query.title == "Missing" {
                return Err(WikitermError::ArticleNotFound);
            }

            let body = match query.section {
                Some(n) => format!("<p>Section {} of {}</p>", n, query.title),
                None => format!(
                    r#"<p>All about <a href="/wiki/{}">{}</a>.</p><script>leak()</script>"#,
                    query.title.replace(' ', "_"),
                    query.title
                ),
            };
            Ok(RawContent { html: body, lang: query.lang.clone() })
        }
    }

    async fn run_session(source: &FakeSource, options: SessionOptions, words: &str, input: &str) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = {
            let mut session = Session::new(source, options, input.as_bytes(), &mut out);
            session.run(words).await.unwrap()
        };
        (outcome, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_direct_whole_article() {
        let source = FakeSource::turing();
        let (outcome, out) = run_session(&source, SessionOptions::default(), "Alan Turing", "").await;

        assert_eq!(outcome, Outcome::Done);
        assert!(out.contains("All about"));
        assert!(out.contains("https://en.wikipedia.org/wiki/Alan_Turing"));
        assert!(!out.contains("leak"));
        assert_eq!(source.fetched.borrow()[0], ArticleQuery::new("Alan Turing", "en"));
    }

    #[tokio::test]
    async fn test_missing_title() {
        let source = FakeSource::turing();
        let (outcome, out) = run_session(&source, SessionOptions::default(), "  ", "").await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("No article title provided."));
        assert!(source.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_missing_search_query() {
        let source = FakeSource::turing();
        let options = SessionOptions { search: true, ..Default::default() };
        let (outcome, out) = run_session(&source, options, "", "").await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("No search query provided."));
    }

    #[tokio::test]
    async fn test_unusable_language_reported_as_typed() {
        let source = FakeSource::turing();
        let options = SessionOptions { lang: "../!".to_string(), ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Alan Turing", "").await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains(r#"Invalid language code: "../!""#));
        assert!(source.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_direct_not_found_fails() {
        let source = FakeSource::turing();
        let (outcome, out) = run_session(&source, SessionOptions::default(), "Missing", "").await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("Article not found."));
    }

    #[tokio::test]
    async fn test_search_select_and_quit() {
        let source = FakeSource::turing();
        let options = SessionOptions { search: true, ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Turing", "abc\n2\nn\n").await;

        assert_eq!(outcome, Outcome::Done);
        assert!(out.contains("1. Turing machine"));
        assert!(out.contains("2. Alan Turing"));
        assert!(out.contains("Invalid selection."));
        assert_eq!(source.fetched.borrow().len(), 1);
        assert_eq!(source.fetched.borrow()[0].title, "Alan Turing");
    }

    #[tokio::test]
    async fn test_search_out_of_range_then_quit() {
        let source = FakeSource::turing();
        let options = SessionOptions { search: true, ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Turing", "0\n3\nq\n").await;

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(out.matches("Invalid selection.").count(), 2);
        assert!(source.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let source = FakeSource { results: None, ..Default::default() };
        let options = SessionOptions { search: true, ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Qwxzv", "").await;

        assert_eq!(outcome, Outcome::Done);
        assert!(out.contains("No results found for 'Qwxzv'."));
    }

    #[tokio::test]
    async fn test_search_again_with_new_query() {
        let source = FakeSource::turing();
        let options = SessionOptions { search: true, ..Default::default() };
        let (_, out) = run_session(&source, options, "Turing", "s\nEnigma\nq\n").await;

        assert_eq!(out.matches("Search results:").count(), 2);
        assert!(out.contains("Enter a new search query: "));
    }

    #[tokio::test]
    async fn test_direct_section_selection() {
        let source = FakeSource::turing();
        let options = SessionOptions { section: true, ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Alan Turing", "7\nx\n2\nn\n").await;

        assert_eq!(outcome, Outcome::Done);
        assert!(out.contains("1. Early life"));
        assert!(out.contains("2.   School"));
        assert_eq!(out.matches("Invalid selection.").count(), 2);
        assert!(out.contains("# School"));
        assert!(out.contains("Section 2 of Alan Turing"));
        assert_eq!(source.fetched.borrow().len(), 1);
        assert_eq!(source.fetched.borrow()[0].section, Some(2));
    }

    #[tokio::test]
    async fn test_direct_section_enter_skips() {
        let source = FakeSource::turing();
        let options = SessionOptions { section: true, ..Default::default() };
        let (_, out) = run_session(&source, options, "Alan Turing", "\ny\n1\nn\n").await;

        let fetched = source.fetched.borrow();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].section, None);
        assert_eq!(fetched[1].section, Some(1));
        assert!(out.contains("# Early life"));
    }

    #[tokio::test]
    async fn test_direct_section_outline_missing_article() {
        let source = FakeSource::turing();
        let options = SessionOptions { section: true, ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Missing", "").await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("Article not found."));
    }

    #[tokio::test]
    async fn test_search_section_back_to_results() {
        let source = FakeSource::turing();
        let options = SessionOptions { search: true, section: true, ..Default::default() };
        let (outcome, _) = run_session(&source, options, "Turing", "1\nb\ny\nq\n").await;

        assert_eq!(outcome, Outcome::Done);
        assert!(source.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_output_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turing.md");
        let source = FakeSource::turing();
        let options = SessionOptions { output: Some(path.clone()), lang: "fr".into(), ..Default::default() };
        let (outcome, out) = run_session(&source, options, "Alan Turing", "").await;

        assert_eq!(outcome, Outcome::Done);
        assert!(out.contains("Article saved to"));

        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("All about"));
        assert!(saved.contains("https://fr.wikipedia.org/wiki/Alan_Turing"));
        assert!(!saved.contains("\u{1b}["));
    }

    #[tokio::test]
    async fn test_end_of_input_quits_search() {
        let source = FakeSource::turing();
        let options = SessionOptions { search: true, ..Default::default() };
        let (outcome, _) = run_session(&source, options, "Turing", "").await;
        assert_eq!(outcome, Outcome::Done);
    }
}
