use crate::parser::ParsedDocument;

use super::markdown::{escape_html, to_html};

pub const DATE_LABEL: &str = "日時";
pub const LOCATION_LABEL: &str = "場所";

fn field<'a>(doc: &'a ParsedDocument, key: &str) -> Option<&'a str> {
    doc.metadata.get(key).filter(|v| !v.is_empty())
}

/// Card shown in a listing. Only the fields a document has are rendered.
#[derive(Debug)]
pub struct SummaryView<'a> {
    pub title: &'a str,
    pub date: Option<&'a str>,
    pub location: Option<&'a str>,
    pub summary: Option<&'a str>,
}

impl<'a> SummaryView<'a> {
    pub fn of(doc: &'a ParsedDocument) -> Self {
        Self {
            title: doc.metadata.get_or("title", ""),
            date: field(doc, "date"),
            location: field(doc, "location"),
            summary: field(doc, "summary"),
        }
    }

    pub fn to_text(&self, position: usize) -> String {
        let mut lines = vec![format!("[{}] {}", position, self.title)];
        if let Some(date) = self.date {
            lines.push(format!("    {}: {}", DATE_LABEL, date));
        }
        if let Some(location) = self.location {
            lines.push(format!("    {}: {}", LOCATION_LABEL, location));
        }
        if let Some(summary) = self.summary {
            lines.push(format!("    {}", summary));
        }
        lines.join("\n")
    }

    pub fn to_html(&self, position: usize) -> String {
        let mut html = format!(
            "<div class=\"event-card\" data-position=\"{}\">\n  <h3>{}</h3>\n",
            position,
            escape_html(self.title)
        );
        if let Some(date) = self.date {
            html.push_str(&format!(
                "  <p><strong>{}:</strong> {}</p>\n",
                DATE_LABEL,
                escape_html(date)
            ));
        }
        if let Some(location) = self.location {
            html.push_str(&format!(
                "  <p><strong>{}:</strong> {}</p>\n",
                LOCATION_LABEL,
                escape_html(location)
            ));
        }
        if let Some(summary) = self.summary {
            html.push_str(&format!("  <p>{}</p>\n", escape_html(summary)));
        }
        html.push_str("</div>");
        html
    }
}

/// Expanded view of one document: title and rendered body.
#[derive(Debug)]
pub struct DetailView<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> DetailView<'a> {
    pub fn of(doc: &'a ParsedDocument) -> Self {
        Self {
            title: doc.metadata.get_or("title", ""),
            body: &doc.body,
        }
    }

    pub fn to_html(&self) -> String {
        format!("<h1>{}</h1>{}", escape_html(self.title), to_html(self.body))
    }

    pub fn to_text(&self) -> String {
        let rule = "=".repeat(self.title.chars().count().max(3));
        format!("{}\n{}\n\n{}", self.title, rule, self.body.trim())
    }
}

/// Reveals a finalized collection one batch at a time.
pub struct Pager<'a> {
    docs: &'a [ParsedDocument],
    revealed: usize,
    batch: usize,
}

impl<'a> Pager<'a> {
    pub fn new(docs: &'a [ParsedDocument], batch: usize) -> Self {
        Self {
            docs,
            revealed: 0,
            batch: batch.max(1),
        }
    }

    /// The next batch, empty once exhausted.
    pub fn next_batch(&mut self) -> &'a [ParsedDocument] {
        let start = self.revealed;
        let end = (start + self.batch).min(self.docs.len());
        self.revealed = end;
        &self.docs[start..end]
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn remaining(&self) -> usize {
        self.docs.len() - self.revealed
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
