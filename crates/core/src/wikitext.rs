use regex::Regex;

/// Collect the distinct reference groups used by `<ref group=...>` tags, in
/// order of first appearance.
///
/// Both `group="..."` and `group='...'` attribute forms are recognised.
pub fn reference_groups(wikitext: &str) -> Vec<String> {
    let double_quoted = Regex::new(r#"<ref\s+group="([^"]+)""#).unwrap();
    let single_quoted = Regex::new(r#"<ref\s+group='([^']+)'"#).unwrap();

    let mut found: Vec<(usize, String)> = double_quoted
        .captures_iter(wikitext)
        .chain(single_quoted.captures_iter(wikitext))
        .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str().to_string())))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    let mut groups: Vec<String> = Vec::new();
    for (_, group) in found {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups
}

/// Append references placeholders so footnotes survive rendering a lone section.
///
/// A section fetched on its own has lost the page's `<references />` lists,
/// so the renderer would drop every footnote. This appends one unscoped
/// placeholder followed by one placeholder per distinct reference group.
///
/// # Example
///
/// ```rust
/// use wikiterm_core::wikitext::append_reference_placeholders;
///
/// let text = r#"Claim.<ref group="note">A</ref> More.<ref group="note">B</ref>"#;
/// let augmented = append_reference_placeholders(text);
/// assert_eq!(augmented.matches(r#"<references group="note" />"#).count(), 1);
/// assert!(augmented.contains("<references />"));
/// ```
pub fn append_reference_placeholders(wikitext: &str) -> String {
    let mut augmented = String::with_capacity(wikitext.len() + 64);
    augmented.push_str(wikitext);
    augmented.push_str("\n\n<references />");

    for group in reference_groups(wikitext) {
        augmented.push_str(&format!("\n\n<references group=\"{}\" />", group));
    }

    augmented
}
