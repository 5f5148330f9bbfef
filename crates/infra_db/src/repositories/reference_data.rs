//! Reference data table mapping

use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};

use core_kernel::{EffectivePeriod, ReferenceDataId};
use domain_reference::{AuditStamp, ReferenceData, ReferenceDataFilter, VersionedRecord};

use super::versioned::{PgVersionStore, VersionedTable};
use crate::temporal::push_eq;

/// PostgreSQL repository for reference data versions
pub type ReferenceDataRepository = PgVersionStore<ReferenceData>;

/// Database row for `reference_data`
#[derive(Debug, Clone, FromRow)]
pub struct ReferenceDataRow {
    pub id: i64,
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

impl VersionedTable for ReferenceData {
    const TABLE: &'static str = "reference_data";
    const PAYLOAD_COLUMNS: &'static str = "ref_data_type, ref_data_value, description, editable";

    type Row = ReferenceDataRow;

    fn push_payload<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(self.ref_data_type.clone())
            .push_bind(self.ref_data_value.clone())
            .push_bind(self.description.clone())
            .push_bind(self.editable);
    }

    fn push_filter<'args>(filter: &ReferenceDataFilter, builder: &mut QueryBuilder<'args, Postgres>) {
        push_eq(builder, "ref_data_type", filter.ref_data_type.clone());
        push_eq(builder, "ref_data_value", filter.ref_data_value.clone());
    }

    fn from_row(row: ReferenceDataRow) -> VersionedRecord<Self> {
        VersionedRecord {
            id: ReferenceDataId::new(row.id),
            payload: ReferenceData {
                ref_data_type: row.ref_data_type,
                ref_data_value: row.ref_data_value,
                description: row.description,
                editable: row.editable,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_open_version() {
        let at = Utc::now();
        let row = ReferenceDataRow {
            id: 42,
            ref_data_type: "SOURCE_SYSTEM".to_string(),
            ref_data_value: "WEB".to_string(),
            description: None,
            editable: true,
            effective_from: at,
            effective_to: None,
            created_by: "admin".to_string(),
            created_at: at,
            last_updated_by: "admin".to_string(),
            last_updated_at: at,
        };

        let record = ReferenceData::from_row(row);
        assert_eq!(record.id, ReferenceDataId::new(42));
        assert_eq!(record.payload, ReferenceData::new("SOURCE_SYSTEM", "WEB"));
        assert!(record.period.is_open());
    }

    #[test]
    fn test_filter_binds_only_set_fields() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM reference_data WHERE 1=1");
        ReferenceData::push_filter(&ReferenceDataFilter::by_type("STATUS"), &mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM reference_data WHERE 1=1 AND ref_data_type = $1"
        );
    }
}
