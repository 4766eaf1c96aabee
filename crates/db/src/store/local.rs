//! Local key-value document store.
//!
//! All collections live in one map guarded by a `RwLock`. When opened on a
//! path, every mutation rewrites the whole file (write to a temporary file,
//! then rename), so the file always holds a complete snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndiambour_core::store::{Document, DocumentStore, ID_FIELD, StoreError, document_id_or_new};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// Document store kept in process memory, optionally persisted to a JSON file.
#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    state: RwLock<Collections>,
}

impl LocalStore {
    /// A store that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading the file if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => Collections::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collections::new(),
            Err(e) => return Err(io_error(&path, &e)),
        };

        info!(
            path = %path.display(),
            collections = state.len(),
            "Local document store opened"
        );
        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// The backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply `change` to a copy of the state, persist it, then publish it.
    ///
    /// Nothing is published when the change or the write fails.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Collections) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(out)
    }

    async fn persist(&self, state: &Collections) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }

        let raw = serde_json::to_vec_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| io_error(&tmp, &e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error(path, &e))?;

        debug!(path = %path.display(), "Local document store persisted");
        Ok(())
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> StoreError {
    StoreError::backend(format!("{}: {err}", path.display()))
}

impl DocumentStore for LocalStore {
    async fn create(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = document_id_or_new(&doc);
        doc.insert(ID_FIELD.to_string(), Value::from(id.clone()));

        self.mutate(|state| {
            let docs = state.entry(collection.to_string()).or_default();
            if docs.contains_key(&id) {
                return Err(StoreError::duplicate(collection, id.as_str()));
            }
            docs.insert(id.clone(), doc);
            Ok(())
        })
        .await?;
        Ok(id)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(state.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        self.mutate(|state| {
            let doc = state
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::missing(collection, id))?;
            for (field, value) in patch {
                if field == ID_FIELD {
                    continue;
                }
                if value.is_null() {
                    doc.remove(&field);
                } else {
                    doc.insert(field, value);
                }
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let present = {
            let state = self.state.read().await;
            state
                .get(collection)
                .is_some_and(|docs| docs.contains_key(id))
        };
        if !present {
            return Ok(());
        }
        self.mutate(|state| {
            if let Some(docs) = state.get_mut(collection) {
                docs.remove(id);
            }
            Ok(())
        })
        .await
    }
}
