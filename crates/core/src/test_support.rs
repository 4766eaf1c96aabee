//! In-memory stores with failure injection for service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use serde_json::Value;

use crate::storage::{BlobStore, StorageError};
use crate::store::{Document, DocumentStore, ID_FIELD, StoreError, document_id_or_new};

/// Mock document store.
#[derive(Default)]
pub(crate) struct MockStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
    failing_updates: Mutex<HashSet<(String, String)>>,
    fail_queries: AtomicBool,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every update of `collection/id` fail with a backend error.
    pub(crate) fn fail_updates_of(&self, collection: &str, id: &str) {
        self.failing_updates
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()));
    }

    pub(crate) fn heal(&self) {
        self.failing_updates.lock().unwrap().clear();
        self.fail_queries.store(false, Ordering::SeqCst);
    }

    pub(crate) fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    /// Write a raw document, bypassing the catalog.
    pub(crate) fn put(&self, collection: &str, doc: Document) {
        let id = document_id_or_new(&doc);
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc);
    }

    pub(crate) fn raw(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub(crate) fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

impl DocumentStore for MockStore {
    async fn create(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = document_id_or_new(&doc);
        doc.insert(ID_FIELD.to_string(), Value::from(id.clone()));
        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::duplicate(collection, id));
        }
        docs.insert(id.clone(), doc);
        Ok(id)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.raw(collection, id))
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
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
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::backend("query unavailable"));
        }
        Ok(self
            .get_all(collection)
            .await?
            .into_iter()
            .filter(|doc| doc.get(field) == Some(value))
            .collect())
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        let key = (collection.to_string(), id.to_string());
        if self.failing_updates.lock().unwrap().contains(&key) {
            return Err(StoreError::backend(format!("injected failure on {collection}/{id}")));
        }
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::missing(collection, id))?;
        for (field, value) in patch {
            if value.is_null() {
                doc.remove(&field);
            } else {
                doc.insert(field, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.collections.lock().unwrap().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

/// Public URL prefix of [`FakeBlobs`].
pub(crate) const BLOB_BASE: &str = "https://blobs.test";

/// Fake blob store keeping objects in a map.
#[derive(Default)]
pub(crate) struct FakeBlobs {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_deletes: AtomicBool,
}

impl FakeBlobs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl BlobStore for FakeBlobs {
    async fn upload(
        &self,
        bytes: Bytes,
        path: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.validate_upload(content_type, bytes.len() as u64)?;
        self.objects.lock().unwrap().insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    async fn resolve_url(&self, locator: &str) -> Result<String, StorageError> {
        Ok(format!("{BLOB_BASE}/{locator}"))
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::backend("delete refused"));
        }
        self.objects.lock().unwrap().remove(locator);
        Ok(())
    }

    fn managed_locator(&self, url: &str) -> Option<String> {
        url.strip_prefix(BLOB_BASE)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    }

    fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if !content_type.starts_with("image/") {
            return Err(StorageError::unsupported_type(content_type));
        }
        if size > 1024 {
            return Err(StorageError::too_large(size, 1024));
        }
        Ok(())
    }
}
