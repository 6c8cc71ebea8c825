use std::collections::BTreeMap;

use serde::Serialize;

/// Front-matter fields of a document. Keys and values are stored trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    /// Parse a block of `key: value` lines. The first colon separates key
    /// from value; lines without a colon or with a blank key are skipped.
    pub fn from_block(block: &str) -> Self {
        let mut fields = BTreeMap::new();
        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            // Later duplicates overwrite earlier ones
            fields.insert(key.to_string(), value.trim().to_string());
        }
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
