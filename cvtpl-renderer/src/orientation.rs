//! Orientation styling: marks the CV root wrapper with an orientation class
//! and injects the A4 `@page` rules for that orientation.
//!
//! The pass only inserts text, except for a previously applied orientation:
//! its class token and style block are swapped for the new one. Running it
//! twice with the same orientation leaves the output unchanged.

use cvtpl_core::Orientation;

/// Class that identifies the CV root wrapper.
pub const ROOT_CLASS: &str = "cv-document";

/// Attribute carried by the injected `<style>` block.
pub const STYLE_MARKER: &str = "data-cv-orientation";

/// `orientation-portrait` / `orientation-landscape`.
pub fn orientation_class(orientation: Orientation) -> String {
    format!("orientation-{}", orientation.as_str())
}

/// The `<style>` block injected for `orientation`.
pub fn orientation_style(orientation: Orientation) -> String {
    let (width, height) = orientation.page_size_mm();
    let o = orientation.as_str();
    format!(
        "<style {STYLE_MARKER}=\"{o}\">\n\
         @page {{ size: A4 {o}; margin: 0; }}\n\
         .{ROOT_CLASS}.orientation-{o} {{ width: {width}mm; min-height: {height}mm; box-sizing: border-box; }}\n\
         @media print {{ .{ROOT_CLASS}.orientation-{o} {{ width: {width}mm; height: {height}mm; }} }}\n\
         </style>\n"
    )
}

fn is_orientation_class(token: &str) -> bool {
    [Orientation::Portrait, Orientation::Landscape]
        .into_iter()
        .any(|o| orientation_class(o) == token)
}

/// Apply `orientation` to a rendered document or fragment.
pub fn apply_orientation(html: &str, orientation: Orientation) -> String {
    let marked = mark_root(html, orientation);
    inject_style(&marked, orientation)
}

// ---------------------------------------------------------------------------
// Root wrapper
// ---------------------------------------------------------------------------

fn mark_root(html: &str, orientation: Orientation) -> String {
    let class = orientation_class(orientation);

    if let Some(range) = find_root_class(html) {
        let value = &html[range.clone()];
        let stale = value
            .split_whitespace()
            .any(|c| c != class && is_orientation_class(c));
        if !stale && value.split_whitespace().any(|c| c == class) {
            return html.to_string();
        }
        let mut out = String::with_capacity(html.len() + class.len() + 1);
        if stale {
            let kept: Vec<&str> = value
                .split_whitespace()
                .filter(|c| !is_orientation_class(c))
                .chain([class.as_str()])
                .collect();
            out.push_str(&html[..range.start]);
            out.push_str(&kept.join(" "));
        } else {
            out.push_str(&html[..range.end]);
            if !value.is_empty() && !value.ends_with(char::is_whitespace) {
                out.push(' ');
            }
            out.push_str(&class);
        }
        out.push_str(&html[range.end..]);
        return out;
    }

    let open = format!("<div class=\"{ROOT_CLASS} {class}\">");
    let close = "</div>";
    let lower = html.to_ascii_lowercase();

    let (start, end) = match find_open_tag_end(&lower, "<body") {
        Some(body_start) => {
            let body_end = lower[body_start..]
                .find("</body")
                .map_or(html.len(), |i| body_start + i);
            (body_start, body_end)
        }
        None => match lower.find("</head>") {
            Some(i) => (i + "</head>".len(), html.len()),
            None => (0, html.len()),
        },
    };

    let mut out = String::with_capacity(html.len() + open.len() + close.len());
    out.push_str(&html[..start]);
    out.push_str(&open);
    out.push_str(&html[start..end]);
    out.push_str(close);
    out.push_str(&html[end..]);
    out
}

/// Byte range of the `class` value of the first tag whose class list
/// contains [`ROOT_CLASS`].
fn find_root_class(html: &str) -> Option<std::ops::Range<usize>> {
    let mut pos = 0;
    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        let Some(len) = html[start..].find('>') else {
            break;
        };
        let tag = &html[start..start + len];
        pos = start + len + 1;

        if tag.starts_with("</") || tag.starts_with("<!") {
            continue;
        }
        if let Some(range) = class_value(tag) {
            if tag[range.clone()].split_whitespace().any(|c| c == ROOT_CLASS) {
                return Some(start + range.start..start + range.end);
            }
        }
    }
    None
}

/// Byte range of the quoted `class="…"` value inside a single tag.
fn class_value(tag: &str) -> Option<std::ops::Range<usize>> {
    let lower = tag.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut search = 0;

    while let Some(offset) = lower[search..].find("class") {
        let at = search + offset;
        search = at + "class".len();

        if at == 0 || !bytes[at - 1].is_ascii_whitespace() {
            continue;
        }
        let mut i = search;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let quote = match bytes.get(i) {
            Some(q @ (b'"' | b'\'')) => *q,
            _ => continue,
        };
        let value_start = i + 1;
        let value_end = bytes[value_start..]
            .iter()
            .position(|&b| b == quote)
            .map(|p| value_start + p)?;
        return Some(value_start..value_end);
    }
    None
}

/// Index just past the `>` that closes the first `tag` opener, e.g. `<body`.
fn find_open_tag_end(lower: &str, tag: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(offset) = lower[search..].find(tag) {
        let at = search + offset + tag.len();
        match lower.as_bytes().get(at) {
            Some(b'>') => return Some(at + 1),
            Some(b) if b.is_ascii_whitespace() => {
                return lower[at..].find('>').map(|i| at + i + 1);
            }
            _ => search = at,
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Style block
// ---------------------------------------------------------------------------

fn inject_style(html: &str, orientation: Orientation) -> String {
    let marker = format!("{STYLE_MARKER}=\"{}\"", orientation.as_str());
    if html.contains(&marker) && html.matches(STYLE_MARKER).count() == 1 {
        return html.to_string();
    }
    let html = strip_style_blocks(html);
    let style = orientation_style(orientation);

    match html.to_ascii_lowercase().find("</head>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + style.len());
            out.push_str(&html[..at]);
            out.push_str(&style);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{style}{html}"),
    }
}

/// Remove every `<style data-cv-orientation=…>` block and its trailing newline.
fn strip_style_blocks(html: &str) -> String {
    let opener = format!("<style {STYLE_MARKER}=");
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(&opener) {
        let Some(len) = rest[start..].find("</style>") else {
            break;
        };
        let mut end = start + len + "</style>".len();
        if rest[end..].starts_with('\n') {
            end += 1;
        }
        out.push_str(&rest[..start]);
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_class_to_existing_root() {
        let html = r#"<head></head><body><div id="cv" class="cv-document dark">x</div></body>"#;
        let out = apply_orientation(html, Orientation::Landscape);
        assert!(out.contains(r#"class="cv-document dark orientation-landscape""#));
        assert_eq!(out.matches(ROOT_CLASS).count(), 3, "class attribute plus two css selectors");
    }

    #[test]
    fn ignores_lookalike_classes() {
        let html = r#"<div class="cv-document-header">h</div><section class='cv-document'>b</section>"#;
        let out = mark_root(html, Orientation::Portrait);
        assert_eq!(
            out,
            r#"<div class="cv-document-header">h</div><section class='cv-document orientation-portrait'>b</section>"#
        );
    }

    #[test]
    fn wraps_body_content_without_root() {
        let html = "<html><head><title>t</title></head><body class=\"page\"><p>Ann</p></body></html>";
        let out = mark_root(html, Orientation::Portrait);
        assert_eq!(
            out,
            "<html><head><title>t</title></head><body class=\"page\">\
             <div class=\"cv-document orientation-portrait\"><p>Ann</p></div></body></html>"
        );
    }

    #[test]
    fn wraps_bare_fragment() {
        let out = mark_root("<p>Ann</p>", Orientation::Landscape);
        assert_eq!(out, "<div class=\"cv-document orientation-landscape\"><p>Ann</p></div>");
    }

    #[test]
    fn style_goes_before_head_close_case_insensitively() {
        let html = "<HTML><HEAD><TITLE>t</TITLE></HEAD><BODY></BODY></HTML>";
        let out = inject_style(html, Orientation::Portrait);
        let style_at = out.find("<style data-cv-orientation=\"portrait\">").expect("style");
        assert!(style_at < out.find("</HEAD>").expect("head close"));
        assert!(out.contains("@page { size: A4 portrait; margin: 0; }"));
        assert!(out.contains("width: 210mm; min-height: 297mm"));
    }

    #[test]
    fn style_is_prepended_without_head() {
        let out = inject_style("<p>x</p>", Orientation::Landscape);
        assert!(out.starts_with("<style data-cv-orientation=\"landscape\">"));
        assert!(out.contains("width: 297mm; min-height: 210mm"));
        assert!(out.ends_with("<p>x</p>"));
    }

    #[test]
    fn never_removes_existing_text() {
        let html = "<html><head></head><body><main class=\"cv-document\">A</main></body></html>";
        let out = apply_orientation(html, Orientation::Portrait);
        let mut rest = out.as_str();
        for piece in ["<html><head>", "</head><body><main class=\"cv-document", "\">A</main></body></html>"] {
            let at = rest.find(piece).unwrap_or_else(|| panic!("missing {piece}"));
            rest = &rest[at + piece.len()..];
        }
    }

    #[test]
    fn reapplying_replaces_previous_orientation() {
        let portrait = apply_orientation("<p>x</p>", Orientation::Portrait);
        let landscape = apply_orientation(&portrait, Orientation::Landscape);
        assert_eq!(landscape, apply_orientation("<p>x</p>", Orientation::Landscape));
        assert!(!landscape.contains("orientation-portrait"));
        assert!(!landscape.contains("A4 portrait"));
        assert_eq!(landscape.matches(STYLE_MARKER).count(), 1);
    }

    #[test]
    fn reapplying_inside_a_document_keeps_one_style_block() {
        let html = "<html><head><title>t</title></head>\
                    <body><main class=\"dark cv-document orientation-landscape\">A</main></body></html>";
        let once = apply_orientation(html, Orientation::Landscape);
        let flipped = apply_orientation(&once, Orientation::Portrait);

        assert!(flipped.contains(r#"class="dark cv-document orientation-portrait""#));
        assert_eq!(flipped.matches("<style").count(), 1);
        assert!(flipped.contains("@page { size: A4 portrait; margin: 0; }"));
        assert!(flipped.find("<style").expect("style") < flipped.find("</head>").expect("head"));
        assert!(flipped.contains("<title>t</title>"));
    }

    #[test]
    fn applying_twice_is_stable() {
        let once = apply_orientation("<p>x</p>", Orientation::Portrait);
        assert_eq!(apply_orientation(&once, Orientation::Portrait), once);
    }
}
