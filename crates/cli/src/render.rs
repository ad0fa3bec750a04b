//! Terminal styling for readable article text.

use owo_colors::OwoColorize;
use regex::Regex;

/// Markdown inline link: `[label](target)` or `[label](target "title")`.
/// Label and target may contain backslash escapes such as `\[` or `\)`.
const LINK: &str = r#"\[((?:[^\]\\]|\\.)+)\]\(((?:[^()\s\\]|\\.)+)(?:\s+"(?:[^"\\]|\\.)*")?\)"#;

/// Backslash escapes the Markdown converter puts in front of punctuation.
const ESCAPE: &str = r"\\([\\`*_{}\[\]()#+\-.!<>|~])";

/// Style readable text for a terminal.
///
/// Heading lines are bold, links show their text underlined followed by the
/// dimmed target, and Markdown escapes are dropped. Only the display gets this
/// treatment; text written to files or pagers stays Markdown.
pub fn style_markdown(text: &str) -> String {
    let link = Regex::new(LINK).unwrap();
    let escape = Regex::new(ESCAPE).unwrap();
    let unescape = |s: &str| escape.replace_all(s, "$1").into_owned();

    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let heading = unescape(trimmed.trim_start_matches('#').trim());
                return heading.bold().to_string();
            }

            let mut styled = String::with_capacity(line.len());
            let mut last = 0;
            for caps in link.captures_iter(line) {
                let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                    continue;
                };
                styled.push_str(&unescape(&line[last..whole.start()]));
                let label = unescape(label.as_str());
                let target = format!("<{}>", unescape(target.as_str()));
                styled.push_str(&format!("{} {}", label.underline(), target.dimmed()));
                last = whole.end();
            }
            styled.push_str(&unescape(&line[last..]));
            styled
        })
        .collect::<Vec<_>>()
        .join("\n")
}
