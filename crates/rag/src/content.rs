//! Readable-text extraction from fetched HTML.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose content is never part of the readable text.
const BOILERPLATE: [&str; 9] = [
    "script", "style", "noscript", "template", "nav", "aside", "form", "svg", "iframe",
];

/// Page chrome, skipped only outside a content root.
const CHROME: [&str; 2] = ["header", "footer"];

/// Elements that mark the main content of a page.
const CONTENT_ROOTS: [&str; 3] = ["article", "main", "[role=\"main\"]"];

/// Elements that end a line of text.
const BLOCKS: [&str; 24] = [
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "main", "header",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "dd", "dt", "figcaption", "pre",
];

/// Table cells, separated by a space.
const CELLS: [&str; 2] = ["td", "th"];

/// Extract readable text from an HTML page.
///
/// The richest `<article>`/`<main>` candidate wins when it holds at least
/// half of the page's readable text; otherwise the whole `<body>` is used.
/// Boilerplate subtrees are skipped, whitespace is collapsed and the result
/// is capped to `max_chars` characters. Returns an empty string when nothing
/// is readable.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let body = select_all(&document, "body", false).into_iter().next().unwrap_or_default();
    let body_len = body.chars().count();

    let best = CONTENT_ROOTS
        .iter()
        .flat_map(|selector| select_all(&document, selector, true))
        .map(|text| (text.chars().count(), text))
        .max_by_key(|(len, _)| *len);

    let text = match best {
        Some((len, text)) if len > 0 && len * 2 >= body_len => text,
        _ => body,
    };

    truncate_chars(text, max_chars)
}

/// Normalise plain-text bodies the same way as extracted HTML text.
pub fn clean_plain_text(text: &str, max_chars: usize) -> String {
    truncate_chars(normalise_whitespace(text), max_chars)
}

fn select_all(document: &Html, selector: &str, in_content: bool) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|root| {
            let mut raw = String::new();
            collect_text(root, in_content, &mut raw);
            normalise_whitespace(&raw)
        })
        .collect()
}

fn collect_text(element: ElementRef<'_>, in_content: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if BOILERPLATE.contains(&name) || (!in_content && CHROME.contains(&name)) {
                    continue;
                }
                let nested = in_content || name == "article" || name == "main";
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, nested, out);
                }
                if BLOCKS.contains(&name) {
                    out.push('\n');
                } else if CELLS.contains(&name) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of spaces inside lines and keep at most one blank line.
fn normalise_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(collapsed);
            previous_blank = false;
        }
    }

    lines.join("\n").trim().to_string()
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text,
    }
}
