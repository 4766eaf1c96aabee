//! One-shot copy of collections between document stores.

use ndiambour_core::store::{DocumentStore, ID_FIELD, StoreError};
use serde_json::Value;
use tracing::{info, warn};

/// Outcome for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionCopy {
    /// Collection name.
    pub collection: String,
    /// Documents written to the target.
    pub copied: usize,
    /// Documents already present in the target, or without an ID.
    pub skipped: usize,
}

/// Outcome of a copy run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Per-collection outcomes, in the order copied.
    pub collections: Vec<CollectionCopy>,
}

impl CopyReport {
    /// Documents written across all collections.
    #[must_use]
    pub fn copied(&self) -> usize {
        self.collections.iter().map(|c| c.copied).sum()
    }

    /// Documents skipped across all collections.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.collections.iter().map(|c| c.skipped).sum()
    }
}

/// Copy every document of `collections` from `source` to `target`.
///
/// IDs are preserved. Documents whose ID already exists in the target are
/// left untouched, so a run can be repeated after a partial failure.
///
/// # Errors
///
/// Stops at the first read or write failure.
pub async fn copy_collections<A, B>(
    source: &A,
    target: &B,
    collections: &[&str],
) -> Result<CopyReport, StoreError>
where
    A: DocumentStore,
    B: DocumentStore,
{
    let mut report = CopyReport::default();

    for &collection in collections {
        let mut outcome = CollectionCopy {
            collection: collection.to_string(),
            ..CollectionCopy::default()
        };

        for doc in source.get_all(collection).await? {
            let Some(id) = doc.get(ID_FIELD).and_then(Value::as_str).map(str::to_string) else {
                warn!(collection, "Skipping document without an id");
                outcome.skipped += 1;
                continue;
            };
            if target.get_by_id(collection, &id).await?.is_some() {
                outcome.skipped += 1;
                continue;
            }
            match target.create(collection, doc).await {
                Ok(_) => outcome.copied += 1,
                Err(StoreError::Duplicate { .. }) => outcome.skipped += 1,
                Err(e) => return Err(e),
            }
        }

        info!(
            collection,
            copied = outcome.copied,
            skipped = outcome.skipped,
            "Collection copied"
        );
        report.collections.push(outcome);
    }

    Ok(report)
}
