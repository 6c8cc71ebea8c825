pub mod cards;
pub mod markdown;

use crate::parser::ParsedDocument;
use cards::{DetailView, Pager, SummaryView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Html,
}

/// Summary cards for the first `reveal` batches of a category.
pub fn render_listing(
    category: &str,
    docs: &[ParsedDocument],
    batch: usize,
    reveal: usize,
    format: Format,
) -> String {
    let mut pager = Pager::new(docs, batch);
    let mut cards = Vec::new();
    for _ in 0..reveal {
        let start = pager.revealed();
        let shown = pager.next_batch();
        if shown.is_empty() {
            break;
        }
        for (i, doc) in shown.iter().enumerate() {
            let card = SummaryView::of(doc);
            cards.push(match format {
                Format::Text => card.to_text(start + i + 1),
                Format::Html => card.to_html(start + i + 1),
            });
        }
    }

    match format {
        Format::Text => {
            let mut out = format!("== {} ({}) ==\n", category, docs.len());
            if docs.is_empty() {
                out.push_str("Nothing found.\n");
                return out;
            }
            out.push_str(&cards.join("\n\n"));
            out.push('\n');
            if !pager.is_exhausted() {
                out.push_str(&format!(
                    "\n... {} more (use --reveal {} to view more)\n",
                    pager.remaining(),
                    reveal + 1
                ));
            }
            out
        }
        Format::Html => {
            let mut out = format!(
                "<section class=\"category\" data-category=\"{}\">\n",
                markdown::escape_html(category)
            );
            if docs.is_empty() {
                out.push_str("<p class=\"empty\">Nothing found.</p>\n");
            }
            for card in &cards {
                out.push_str(card);
                out.push('\n');
            }
            if !pager.is_exhausted() {
                out.push_str(&format!(
                    "<button class=\"view-more\" data-remaining=\"{}\">View more</button>\n",
                    pager.remaining()
                ));
            }
            out.push_str("</section>\n");
            out
        }
    }
}

pub fn render_detail(doc: &ParsedDocument, format: Format) -> String {
    let view = DetailView::of(doc);
    match format {
        Format::Text => view.to_text(),
        Format::Html => view.to_html(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn docs(n: usize) -> Vec<ParsedDocument> {
        (1..=n)
            .map(|i| parse(&format!("---\ntitle: Doc {}\n---\nbody", i)))
            .collect()
    }

    #[test]
    fn first_batch_then_hint() {
        let all = docs(5);
        let out = render_listing("events", &all, 3, 1, Format::Text);
        assert!(out.starts_with("== events (5) ==\n[1] Doc 1\n\n[2] Doc 2\n\n[3] Doc 3\n"));
        assert!(out.contains("... 2 more (use --reveal 2 to view more)"));
        assert!(!out.contains("Doc 4"));
    }

    #[test]
    fn reveal_until_exhausted() {
        let all = docs(5);
        let out = render_listing("events", &all, 3, 4, Format::Text);
        assert!(out.contains("[5] Doc 5"));
        assert!(!out.contains("more"));
    }

    #[test]
    fn empty_category_says_nothing_found() {
        assert_eq!(
            render_listing("events", &[], 3, 1, Format::Text),
            "== events (0) ==\nNothing found.\n"
        );
        let html = render_listing("events", &[], 3, 1, Format::Html);
        assert!(html.contains("Nothing found."));
        assert!(!html.contains("view-more"));
    }

    #[test]
    fn html_listing_has_view_more_control() {
        let all = docs(4);
        let html = render_listing("events", &all, 3, 1, Format::Html);
        assert_eq!(html.matches("class=\"event-card\"").count(), 3);
        assert!(html.contains("data-remaining=\"1\""));
    }

    #[test]
    fn detail_formats() {
        let doc = parse("---\ntitle: T\n---\nhello");
        assert_eq!(render_detail(&doc, Format::Html), "<h1>T</h1><p>hello</p>");
        assert_eq!(render_detail(&doc, Format::Text), "T\n===\n\nhello");
    }
}
