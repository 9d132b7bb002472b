//! Cosmetic formatting of the serialized source
//!
//! Inserts a blank line between neighbouring sibling elements whose tag
//! names differ, and before the closing tag of a section. The output is
//! compared literally by callers that diff generated sources, so the rules
//! here are part of the output contract.

use std::collections::BTreeMap;

/// Tags never preceded by a separator
const NO_SEPARATOR_BEFORE: &[&str] = &["Media", "File", "Wix"];

/// Closing tags always preceded by a separator
const SECTION_TAGS: &[&str] = &["Product", "Module", "Fragment", "Bundle"];

/// Apply the blank-line rules to indented XML text
pub fn format_source(xml: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut last_sibling: BTreeMap<usize, &str> = BTreeMap::new();

    for line in xml.lines() {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if trimmed.is_empty() {
            push_separator(&mut out);
            continue;
        }

        if let Some(name) = closing_tag(trimmed) {
            last_sibling.retain(|&level, _| level <= indent);
            if SECTION_TAGS.contains(&name) {
                push_separator(&mut out);
            }
        } else if let Some(name) = opening_tag(trimmed) {
            last_sibling.retain(|&level, _| level <= indent);
            if let Some(previous) = last_sibling.get(&indent) {
                if *previous != name && !NO_SEPARATOR_BEFORE.contains(&name) {
                    push_separator(&mut out);
                }
            }
            last_sibling.insert(indent, name);
        }

        out.push(line);
    }

    let mut result = out.join("\n");
    result.push('\n');
    result
}

fn push_separator(out: &mut Vec<&str>) {
    if matches!(out.last(), Some(last) if !last.trim().is_empty()) {
        out.push("");
    }
}

fn tag_name(rest: &str) -> &str {
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

fn opening_tag(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('<')?;
    if rest.starts_with(['/', '?', '!']) {
        return None;
    }
    Some(tag_name(rest))
}

fn closing_tag(line: &str) -> Option<&str> {
    line.strip_prefix("</").map(tag_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_between_different_siblings() {
        let input = [
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<Wix>"#,
            r#"  <Product Id="P">"#,
            r#"    <Package />"#,
            r#"    <Media Id="1" />"#,
            r#"    <Directory Id="TARGETDIR">"#,
            r#"      <Component Id="A">"#,
            r#"        <File Id="a" />"#,
            r#"      </Component>"#,
            r#"      <Component Id="B">"#,
            r#"        <CreateFolder />"#,
            r#"        <File Id="b" />"#,
            r#"      </Component>"#,
            r#"    </Directory>"#,
            r#"    <Feature Id="Complete" />"#,
            r#"    <Property Id="X" />"#,
            r#"    <Property Id="Y" />"#,
            r#"  </Product>"#,
            r#"</Wix>"#,
        ]
        .join("\n");

        let expected = [
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<Wix>"#,
            r#"  <Product Id="P">"#,
            r#"    <Package />"#,
            r#"    <Media Id="1" />"#,
            r#""#,
            r#"    <Directory Id="TARGETDIR">"#,
            r#"      <Component Id="A">"#,
            r#"        <File Id="a" />"#,
            r#"      </Component>"#,
            r#"      <Component Id="B">"#,
            r#"        <CreateFolder />"#,
            r#"        <File Id="b" />"#,
            r#"      </Component>"#,
            r#"    </Directory>"#,
            r#""#,
            r#"    <Feature Id="Complete" />"#,
            r#""#,
            r#"    <Property Id="X" />"#,
            r#"    <Property Id="Y" />"#,
            r#""#,
            r#"  </Product>"#,
            r#"</Wix>"#,
            r#""#,
        ]
        .join("\n");

        assert_eq!(format_source(&input), expected);
    }

    #[test]
    fn test_no_double_blank_lines() {
        let input = "<Wix>\n  <A />\n\n  <B />\n</Wix>\n";
        assert_eq!(format_source(input), "<Wix>\n  <A />\n\n  <B />\n</Wix>\n");
    }

    #[test]
    fn test_idempotent() {
        let input = "<Wix>\n  <Product>\n    <A />\n    <B />\n  </Product>\n</Wix>\n";
        let once = format_source(input);
        assert_eq!(format_source(&once), once);
    }
}
