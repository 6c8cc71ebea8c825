pub mod metadata;

use serde::Serialize;

use metadata::Metadata;

/// Separates the front matter from the body.
pub const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub body: String,
}

impl ParsedDocument {
    pub fn title(&self) -> Option<&str> {
        self.metadata.title()
    }
}

/// Split raw text into front matter and body.
///
/// `---\n<key: value lines>\n---<body>`: the segment before the first
/// delimiter is expected to be empty, the second segment holds the
/// metadata, and everything after the second delimiter is the body,
/// verbatim (further `---` sequences included). Text with fewer than two
/// delimiters has no front matter and is returned whole as the body.
pub fn parse(raw: &str) -> ParsedDocument {
    let mut segments = raw.splitn(3, DELIMITER);
    let (Some(_lead), Some(front), Some(body)) = (segments.next(), segments.next(), segments.next())
    else {
        return ParsedDocument {
            metadata: Metadata::default(),
            body: raw.to_string(),
        };
    };

    ParsedDocument {
        metadata: Metadata::from_block(front),
        body: body.to_string(),
    }
}

// ── Tests ──
