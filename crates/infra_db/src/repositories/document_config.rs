//! Document configuration table mapping

use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};

use core_kernel::{DocumentConfigId, EffectivePeriod, ReferenceDataId};
use domain_reference::{AuditStamp, DocumentConfigFilter, DocumentConfiguration, VersionedRecord};

use super::versioned::{PgVersionStore, VersionedTable};
use crate::temporal::push_eq;

/// Appends `AND column IN (reference data ids carrying value)` when set
fn push_references_value<'args>(
    builder: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    value: Option<String>,
) {
    if let Some(value) = value {
        builder.push(" AND ");
        builder.push(column);
        builder.push(" IN (SELECT rd.id FROM reference_data rd WHERE rd.ref_data_value = ");
        builder.push_bind(value);
        builder.push(")");
    }
}

/// PostgreSQL repository for document configuration versions
pub type DocumentConfigRepository = PgVersionStore<DocumentConfiguration>;

/// Database row for `document_config`
#[derive(Debug, Clone, FromRow)]
pub struct DocumentConfigRow {
    pub id: i64,
    pub footer_id: i64,
    pub app_doc_spec_id: i64,
    pub code_id: i64,
    pub value: String,
    pub description: Option<String>,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: String,
    pub last_updated_at: DateTime<Utc>,
}

impl VersionedTable for DocumentConfiguration {
    const TABLE: &'static str = "document_config";
    const PAYLOAD_COLUMNS: &'static str = "footer_id, app_doc_spec_id, code_id, value, description";

    type Row = DocumentConfigRow;

    fn push_payload<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(self.footer_id.value())
            .push_bind(self.app_doc_spec_id.value())
            .push_bind(self.code_id.value())
            .push_bind(self.value.clone())
            .push_bind(self.description.clone());
    }

    fn push_filter<'args>(filter: &DocumentConfigFilter, builder: &mut QueryBuilder<'args, Postgres>) {
        push_eq(builder, "footer_id", filter.footer_id.map(|id| id.value()));
        push_eq(builder, "app_doc_spec_id", filter.app_doc_spec_id.map(|id| id.value()));
        push_eq(builder, "code_id", filter.code_id.map(|id| id.value()));
        push_eq(builder, "value", filter.value.clone());
        push_references_value(builder, "footer_id", filter.footer_value.clone());
        push_references_value(builder, "app_doc_spec_id", filter.document_name.clone());
        push_references_value(builder, "code_id", filter.code_value.clone());
    }

    fn from_row(row: DocumentConfigRow) -> VersionedRecord<Self> {
        VersionedRecord {
            id: DocumentConfigId::new(row.id),
            payload: DocumentConfiguration {
                footer_id: ReferenceDataId::new(row.footer_id),
                app_doc_spec_id: ReferenceDataId::new(row.app_doc_spec_id),
                code_id: ReferenceDataId::new(row.code_id),
                value: row.value,
                description: row.description,
            },
            period: EffectivePeriod::new(row.effective_from, row.effective_to),
            audit: AuditStamp {
                created_by: row.created_by,
                created_at: row.created_at,
                last_updated_by: row.last_updated_by,
                last_updated_at: row.last_updated_at,
            },
        }
    }
}
