//! Visible text from HTML.
//!
//! Walks the scraper tree instead of calling `text()` so block elements keep
//! their line breaks and script/style bodies never leak into content.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref INLINE_SPACE: Regex = Regex::new(r"[ \t\u{a0}]+").unwrap();
    static ref EXTRA_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "template", "head"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "tr",
    "table", "section", "article", "blockquote", "header", "footer", "main", "nav", "hr",
];

/// Text of an element with block boundaries rendered as newlines.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect(element, &mut out);
    normalize(&out)
}

/// Visible text of a whole document (the `<body>`, or everything if there is none).
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    match document.select(&BODY).next() {
        Some(body) => element_text(body),
        None => element_text(document.root_element()),
    }
}

fn collect(element: ElementRef<'_>, out: &mut String) {
    let tag = element.value().name();
    if SKIPPED_TAGS.contains(&tag) {
        return;
    }

    let block = BLOCK_TAGS.contains(&tag);
    if block && !out.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }

    if block && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Collapse inline whitespace, trim each line, and keep at most one blank line in a row.
pub fn normalize(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| INLINE_SPACE.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");
    EXTRA_NEWLINES.replace_all(&joined, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_scripts_and_keeps_blocks() {
        let html = r#"<html><head><title>t</title></head><body>
            <p>First   paragraph</p>
            <script>var x = "hidden";</script>
            <div>Second <b>bold</b> line</div>
        </body></html>"#;

        let text = visible_text(html);
        assert!(text.contains("First paragraph"));
        assert!(text.contains("Second bold line"));
        assert!(!text.contains("hidden"));
        assert!(text.find("First").unwrap() < text.find("Second").unwrap());
    }

    #[test]
    fn test_normalize_limits_blank_lines() {
        assert_eq!(normalize("a\n\n\n\n  b  \n"), "a\n\nb");
    }
}
