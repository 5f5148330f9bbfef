//! Document request aggregate
//!
//! A document request references reference data for its source system,
//! document type, document name and status. It owns metadata values, an
//! optional content blob and the batches it was processed in; a batch owns
//! its error details.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ErrorDetailId, MetadataValueId, ReferenceDataId, RequestId};

/// A monitored document generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: RequestId,
    pub source_system_id: ReferenceDataId,
    pub document_type_id: ReferenceDataId,
    pub document_name_id: ReferenceDataId,
    pub status_id: ReferenceDataId,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// A processing batch of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub request_id: RequestId,
    pub external_batch_id: Option<String>,
    pub status_id: ReferenceDataId,
    pub created_at: DateTime<Utc>,
}

/// One key/value metadata entry of a request; the key is a reference data id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataValue {
    pub id: MetadataValueId,
    pub request_id: RequestId,
    pub key_id: ReferenceDataId,
    pub value: String,
}

/// An error recorded against a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub id: ErrorDetailId,
    pub batch_id: BatchId,
    pub error_code: Option<String>,
    pub error_message: String,
    pub created_at: DateTime<Utc>,
}

/// Stored request payloads; either side may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredContent {
    pub json: Option<String>,
    pub xml: Option<String>,
}

impl StoredContent {
    /// Returns the payload of one content type, if stored
    pub fn get(&self, content_type: ContentType) -> Option<&str> {
        match content_type {
            ContentType::Json => self.json.as_deref(),
            ContentType::Xml => self.xml.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Json,
    Xml,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "JSON",
            ContentType::Xml => "XML",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One content payload of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub request_id: RequestId,
    pub content_type: ContentType,
    pub content: String,
}

/// Status reference data as seen by the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRef {
    pub id: ReferenceDataId,
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_content_lookup() {
        let content = StoredContent {
            json: Some("{}".to_string()),
            xml: None,
        };
        assert_eq!(content.get(ContentType::Json), Some("{}"));
        assert_eq!(content.get(ContentType::Xml), None);
    }

    #[test]
    fn test_content_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ContentType::Xml).unwrap(), "\"XML\"");
        assert_eq!(ContentType::Json.to_string(), "JSON");
    }
}
