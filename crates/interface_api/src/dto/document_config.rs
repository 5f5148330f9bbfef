//! Document configuration DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{DocumentConfigId, ReferenceDataId};
use domain_reference::{DocumentConfigFilter, DocumentConfigRecord, DocumentConfiguration};

/// Body of document configuration create and update calls
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfigRequest {
    #[validate(range(min = 1))]
    pub footer_id: i64,
    #[validate(range(min = 1))]
    pub app_doc_spec_id: i64,
    #[validate(range(min = 1))]
    pub code_id: i64,
    #[validate(length(min = 1, max = 4000, message = "must be 1 to 4000 characters"))]
    pub value: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
}

impl DocumentConfigRequest {
    pub fn into_payload(self) -> DocumentConfiguration {
        DocumentConfiguration {
            footer_id: ReferenceDataId::new(self.footer_id),
            app_doc_spec_id: ReferenceDataId::new(self.app_doc_spec_id),
            code_id: ReferenceDataId::new(self.code_id),
            value: self.value,
            description: self.description,
        }
    }
}

/// Query of `GET /document-configurations/search`; unset fields do not filter
///
/// `footer`, `documentName` and `code` match the referenced reference data
/// by value; the `*Id` fields match by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfigSearchParams {
    pub footer_id: Option<i64>,
    pub app_doc_spec_id: Option<i64>,
    pub code_id: Option<i64>,
    pub value: Option<String>,
    pub footer: Option<String>,
    pub document_name: Option<String>,
    pub code: Option<String>,
    #[serde(default)]
    pub historic: bool,
}

impl DocumentConfigSearchParams {
    pub fn filter(&self) -> DocumentConfigFilter {
        DocumentConfigFilter {
            footer_id: self.footer_id.map(ReferenceDataId::new),
            app_doc_spec_id: self.app_doc_spec_id.map(ReferenceDataId::new),
            code_id: self.code_id.map(ReferenceDataId::new),
            value: self.value.clone(),
            footer_value: self.footer.clone(),
            document_name: self.document_name.clone(),
            code_value: self.code.clone(),
        }
    }
}

/// One document configuration version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfigResponse {
    pub id: DocumentConfigId,
    pub footer_id: ReferenceDataId,
    pub app_doc_spec_id: ReferenceDataId,
    pub code_id: ReferenceDataId,
    pub value: String,
    pub description: Option<String>,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: String,
    pub last_updated_at: DateTime<Utc>,
}

impl From<DocumentConfigRecord> for DocumentConfigResponse {
    fn from(record: DocumentConfigRecord) -> Self {
        Self {
            id: record.id,
            footer_id: record.payload.footer_id,
            app_doc_spec_id: record.payload.app_doc_spec_id,
            code_id: record.payload.code_id,
            value: record.payload.value,
            description: record.payload.description,
            effective_from: record.period.from,
            effective_to: record.period.to,
            created_by: record.audit.created_by,
            created_at: record.audit.created_at,
            last_updated_by: record.audit.last_updated_by,
            last_updated_at: record.audit.last_updated_at,
        }
    }
}
