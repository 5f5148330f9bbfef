//! Reference data DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ReferenceDataId;
use domain_reference::{ReferenceData, ReferenceDataRecord};

fn default_editable() -> bool {
    true
}

/// Body of reference data create and update calls
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDataRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub ref_data_type: String,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub ref_data_value: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[serde(default = "default_editable")]
    pub editable: bool,
}

impl ReferenceDataRequest {
    pub fn into_payload(self) -> ReferenceData {
        ReferenceData {
            ref_data_type: self.ref_data_type,
            ref_data_value: self.ref_data_value,
            description: self.description,
            editable: self.editable,
        }
    }
}

/// One reference data version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDataResponse {
    pub id: ReferenceDataId,
    pub ref_data_type: String,
    pub ref_data_value: String,
    pub description: Option<String>,
    pub editable: bool,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: String,
    pub last_updated_at: DateTime<Utc>,
}

impl From<ReferenceDataRecord> for ReferenceDataResponse {
    fn from(record: ReferenceDataRecord) -> Self {
        Self {
            id: record.id,
            ref_data_type: record.payload.ref_data_type,
            ref_data_value: record.payload.ref_data_value,
            description: record.payload.description,
            editable: record.payload.editable,
            effective_from: record.period.from,
            effective_to: record.period.to,
            created_by: record.audit.created_by,
            created_at: record.audit.created_at,
            last_updated_by: record.audit.last_updated_by,
            last_updated_at: record.audit.last_updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_type_fails_validation() {
        let request: ReferenceDataRequest =
            serde_json::from_str(r#"{"refDataType":"","refDataValue":"WEB"}"#).unwrap();

        assert!(request.editable);
        assert!(request.validate().is_err());
    }
}
