use std::collections::HashMap;
use std::sync::Arc;

use indicatif::ProgressBar;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, warn};

use crate::parser::{self, ParsedDocument};
use crate::sorter;
use crate::source::DocumentSource;

/// Width of the zero-padded document number in an address.
pub const INDEX_WIDTH: usize = 3;

/// `events`, 1 → `events/001`
pub fn address(category: &str, index: u32) -> String {
    format!("{}/{:0width$}", category, index, width = INDEX_WIDTH)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanLimits {
    /// Stop after probing this many indices even if the source keeps answering.
    pub max_documents: Option<u32>,
}

#[derive(Debug)]
pub enum ScanState {
    Probing {
        index: u32,
        collection: Vec<ParsedDocument>,
    },
    Done(Vec<ParsedDocument>),
}

impl ScanState {
    pub fn start() -> Self {
        ScanState::Probing {
            index: 1,
            collection: Vec::new(),
        }
    }
}

/// Advance a category scan by one lookup.
///
/// Any failed lookup ends the scan: the numbering is contiguous, so the
/// first hole is the end of the category. A present document without a
/// title is dropped but does not end the scan.
pub async fn step<S>(source: &S, category: &str, state: ScanState, limits: ScanLimits) -> ScanState
where
    S: DocumentSource + ?Sized,
{
    let (index, mut collection) = match state {
        ScanState::Probing { index, collection } => (index, collection),
        done @ ScanState::Done(_) => return done,
    };

    if limits.max_documents.is_some_and(|max| index > max) {
        warn!("{}: lookup limit reached at index {}", category, index);
        return ScanState::Done(collection);
    }

    let addr = address(category, index);
    let raw = match source.fetch(&addr).await {
        Ok(raw) => raw,
        Err(e) => {
            if e.is_transport() {
                warn!("{}", e);
            } else {
                debug!("{}", e);
            }
            return ScanState::Done(collection);
        }
    };

    let doc = parser::parse(&raw);
    if doc.title().is_some() {
        collection.push(doc);
    } else if doc.metadata.is_empty() {
        debug!("{}: no front matter, skipped", addr);
    } else {
        debug!("{}: no title among {} fields, skipped", addr, doc.metadata.len());
    }

    ScanState::Probing {
        index: index + 1,
        collection,
    }
}

/// Scan one category to its end and return its documents, newest first.
pub async fn load_category<S>(source: &S, category: &str, limits: ScanLimits) -> Vec<ParsedDocument>
where
    S: DocumentSource + ?Sized,
{
    let mut state = ScanState::start();
    let mut lookups = 0u32;
    let collection = loop {
        state = match state {
            ScanState::Done(collection) => break collection,
            probing => {
                lookups += 1;
                step(source, category, probing, limits).await
            }
        };
    };

    info!(
        "{}: {} documents ({} lookups)",
        category,
        collection.len(),
        lookups
    );
    sorter::sort(collection)
}

/// Finalized collections, in configured category order.
#[derive(Debug, Default)]
pub struct Catalog {
    categories: Vec<(String, Vec<ParsedDocument>)>,
}

impl Catalog {
    pub fn get(&self, category: &str) -> Option<&[ParsedDocument]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, docs)| docs.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ParsedDocument])> {
        self.categories
            .iter()
            .map(|(name, docs)| (name.as_str(), docs.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(|(_, docs)| docs.len()).sum()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (name, docs) in &self.categories {
            map.serialize_entry(name, docs)?;
        }
        map.end()
    }
}

/// Load every category concurrently, one task per category.
pub async fn load_all<S>(
    source: Arc<S>,
    categories: &[String],
    limits: ScanLimits,
    pb: &ProgressBar,
) -> Catalog
where
    S: DocumentSource + ?Sized + 'static,
{
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(String, Vec<ParsedDocument>)>(
        categories.len().max(1),
    );

    for category in categories {
        let source = Arc::clone(&source);
        let category = category.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let docs = load_category(&*source, &category, limits).await;
            let _ = tx.send((category, docs)).await;
        });
    }

    // rx closes once every task has sent or died
    drop(tx);

    let mut loaded: HashMap<String, Vec<ParsedDocument>> = HashMap::new();
    while let Some((category, docs)) = rx.recv().await {
        loaded.insert(category, docs);
        pb.inc(1);
    }

    let categories = categories
        .iter()
        .map(|name| {
            let docs = loaded.remove(name).unwrap_or_else(|| {
                warn!("{}: load did not complete", name);
                Vec::new()
            });
            (name.clone(), docs)
        })
        .collect();

    Catalog { categories }
}

// ── Tests ──
