use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::RecordError;

/// Serialized wire form of one record: compact UTF-8 JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Compact encoding with `,`/`:` separators and no whitespace. Object keys
    /// keep the order they had in the source document.
    pub fn encode(record: &Value) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(record).map(Payload)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered, non-empty, immutable set of records to replay.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    records: Vec<Value>,
}

impl RecordSet {
    /// Load a JSON document. A top-level array contributes its elements; any
    /// other value is treated as a single record.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RecordError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| RecordError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Parsed record document from {}", path.display());
        Self::from_document(document, path.display().to_string())
    }

    pub fn from_document(document: Value, origin: impl Into<String>) -> Result<Self, RecordError> {
        let records = match document {
            Value::Array(items) => items,
            other => vec![other],
        };
        Self::from_records(records, origin)
    }

    pub fn from_records(records: Vec<Value>, origin: impl Into<String>) -> Result<Self, RecordError> {
        if records.is_empty() {
            return Err(RecordError::Empty {
                origin: origin.into(),
            });
        }
        Ok(RecordSet { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`: construction rejects an empty set.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.records.get(index)
    }

    /// Encode every record up front, preserving order.
    pub fn payloads(&self) -> Result<Vec<Payload>, RecordError> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                Payload::encode(record).map_err(|source| RecordError::Encode { index, source })
            })
            .collect()
    }
}
