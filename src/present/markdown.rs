use std::sync::LazyLock;

use regex::{Captures, Regex};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$").unwrap());
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*+]\s+(.*)$").unwrap());
static ORDERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[.)]\s+(.*)$").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static EM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

#[derive(Debug)]
enum Line<'a> {
    Empty,
    Heading { level: usize, text: &'a str },
    Rule,
    Bullet(&'a str),
    Ordered(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Empty;
    }
    if RULE_RE.is_match(line) {
        return Line::Rule;
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        return Line::Heading {
            level: caps[1].len(),
            text: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    if let Some(m) = BULLET_RE.captures(line).and_then(|c| c.get(1)) {
        return Line::Bullet(m.as_str());
    }
    if let Some(m) = ORDERED_RE.captures(line).and_then(|c| c.get(1)) {
        return Line::Ordered(m.as_str());
    }
    Line::Text(line)
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Only web, mail and scheme-less (relative) targets become live links.
fn safe_href(url: &str) -> bool {
    let scheme_end = url.find(':');
    let path_start = url.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => {
            let scheme = url[..colon].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        (None, _) => true,
    }
}

/// Links, bold and emphasis on text outside code spans.
fn spans(text: &str) -> String {
    let s = escape_html(text);
    let s = LINK_RE.replace_all(&s, |caps: &Captures| {
        if safe_href(&caps[2]) {
            format!(r#"<a href="{}">{}</a>"#, &caps[2], &caps[1])
        } else {
            caps[1].to_string()
        }
    });
    let s = BOLD_RE.replace_all(&s, "<strong>$1</strong>");
    EM_RE.replace_all(&s, "<em>$1</em>").into_owned()
}

/// Code spans are escaped verbatim; the rest gets inline markup.
fn inline(text: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for caps in CODE_RE.captures_iter(text) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&spans(&text[last..whole.start()]));
        out.push_str(&format!("<code>{}</code>", escape_html(code.as_str())));
        last = whole.end();
    }
    out.push_str(&spans(&text[last..]));
    out
}

enum Open {
    Nothing,
    Paragraph(Vec<String>),
    List { ordered: bool, items: Vec<String> },
}

fn close(open: Open, out: &mut Vec<String>) {
    match open {
        Open::Nothing => {}
        Open::Paragraph(lines) => out.push(format!("<p>{}</p>", lines.join("\n"))),
        Open::List { ordered, items } => {
            let tag = if ordered { "ol" } else { "ul" };
            let items: String = items.iter().map(|i| format!("<li>{}</li>", i)).collect();
            out.push(format!("<{tag}>{items}</{tag}>"));
        }
    }
}

fn flush(open: &mut Open, out: &mut Vec<String>) {
    close(std::mem::replace(open, Open::Nothing), out);
}

fn push_item(open: &mut Open, out: &mut Vec<String>, ordered: bool, item: String) {
    if let Open::List { ordered: o, items } = open {
        if *o == ordered {
            items.push(item);
            return;
        }
    }
    let next = Open::List {
        ordered,
        items: vec![item],
    };
    close(std::mem::replace(open, next), out);
}

fn push_text(open: &mut Open, out: &mut Vec<String>, text: String) {
    if let Open::Paragraph(lines) = open {
        lines.push(text);
        return;
    }
    close(std::mem::replace(open, Open::Paragraph(vec![text])), out);
}

/// Convert a document body to HTML for the detail view.
///
/// Covers what event write-ups use: headings, paragraphs, bullet and
/// numbered lists, horizontal rules, links, bold, emphasis and code spans.
pub fn to_html(body: &str) -> String {
    let mut out = Vec::new();
    let mut open = Open::Nothing;

    for line in body.lines() {
        match classify(line) {
            Line::Empty => flush(&mut open, &mut out),
            Line::Rule => {
                flush(&mut open, &mut out);
                out.push("<hr>".to_string());
            }
            Line::Heading { level, text } => {
                flush(&mut open, &mut out);
                out.push(format!("<h{level}>{}</h{level}>", inline(text)));
            }
            Line::Bullet(text) => push_item(&mut open, &mut out, false, inline(text)),
            Line::Ordered(text) => push_item(&mut open, &mut out, true, inline(text)),
            Line::Text(text) => push_text(&mut open, &mut out, inline(text)),
        }
    }
    flush(&mut open, &mut out);

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let html = to_html("# Title\n\nFirst line\nsecond line\n\nNext");
        assert_eq!(html, "<h1>Title</h1>\n<p>First line\nsecond line</p>\n<p>Next</p>");
    }

    #[test]
    fn horizontal_rule_splits_paragraphs() {
        let html = to_html("above\n---\nbelow");
        assert_eq!(html, "<p>above</p>\n<hr>\n<p>below</p>");
    }

    #[test]
    fn lists() {
        let html = to_html("- a\n- b\n1. one\n2. two");
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>\n<ol><li>one</li><li>two</li></ol>");
    }

    #[test]
    fn inline_markup() {
        let html = to_html("See **this** and *that* at [the site](https://example.org/a?b=1&c=2) with `code`.");
        assert_eq!(
            html,
            "<p>See <strong>this</strong> and <em>that</em> at \
             <a href=\"https://example.org/a?b=1&amp;c=2\">the site</a> with <code>code</code>.</p>"
        );
    }

    #[test]
    fn code_spans_are_left_alone() {
        assert_eq!(
            to_html("Use `**not bold**` and `[a](b)` but **bold**"),
            "<p>Use <code>**not bold**</code> and <code>[a](b)</code> but <strong>bold</strong></p>"
        );
        assert_eq!(to_html("`<b>`"), "<p><code>&lt;b&gt;</code></p>");
    }

    #[test]
    fn unsafe_link_targets_lose_their_href() {
        assert_eq!(to_html("[x](javascript:alert(1)"), "<p>x</p>");
        assert_eq!(to_html("[click](JavaScript:void)"), "<p>click</p>");
        assert_eq!(to_html("[data](data:text/html,hi)"), "<p>data</p>");
        assert_eq!(
            to_html("[rel](../events/002.md) [mail](mailto:a@b.org) [q](/s?a=b:c)"),
            "<p><a href=\"../events/002.md\">rel</a> <a href=\"mailto:a@b.org\">mail</a> \
             <a href=\"/s?a=b:c\">q</a></p>"
        );
    }

    #[test]
    fn heading_keeps_trailing_hash_in_words() {
        assert_eq!(to_html("# C#"), "<h1>C#</h1>");
        assert_eq!(to_html("## Closed ##"), "<h2>Closed</h2>");
        assert_eq!(to_html("### Spaced  "), "<h3>Spaced</h3>");
    }

    #[test]
    fn raw_html_is_escaped() {
        assert_eq!(to_html("<script>x</script>"), "<p>&lt;script&gt;x&lt;/script&gt;</p>");
    }

    #[test]
    fn empty_body() {
        assert_eq!(to_html(""), "");
        assert_eq!(to_html("\n\n"), "");
    }

    #[test]
    fn fixture_body() {
        let md = std::fs::read_to_string("tests/fixtures/events/001.md").unwrap();
        let doc = crate::parser::parse(&md);
        let html = to_html(&doc.body);
        assert!(html.starts_with("<h1>Spring Hackathon</h1>"));
        assert!(html.contains("<hr>"));
        assert!(html.contains("<li>Doors open at 09:00</li>"));
        assert!(html.contains(r#"<a href="https://example.org/hackathon">the event page</a>"#));
    }
}
