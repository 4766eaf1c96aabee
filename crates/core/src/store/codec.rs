//! Conversions between typed records and documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Document, StoreError};

/// Serialize a record into a document.
///
/// # Errors
///
/// Returns [`StoreError::Codec`] if the record does not serialize to a JSON object.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Codec(format!(
            "expected an object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Deserialize a document into a record.
///
/// # Errors
///
/// Returns [`StoreError::Codec`] if the document does not match the record shape.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Deserialize a list of documents.
///
/// # Errors
///
/// Fails on the first document that does not match the record shape.
pub fn from_documents<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.into_iter().map(from_document).collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        count: u64,
    }

    #[test]
    fn test_to_document_object() {
        let doc = to_document(&Record {
            id: "a".into(),
            count: 3,
        })
        .unwrap();
        assert_eq!(doc.get("id"), Some(&Value::from("a")));
        assert_eq!(doc.get("count"), Some(&Value::from(3)));
    }

    #[test]
    fn test_to_document_rejects_scalars() {
        let err = to_document(&42).unwrap_err();
        assert!(matches!(err, StoreError::Codec(msg) if msg.contains("a number")));
    }

    #[test]
    fn test_from_document_shape_mismatch() {
        let mut doc = Document::new();
        doc.insert("id".into(), Value::from("a"));
        let err = from_document::<Record>(doc).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }
}
