//! Effective-dated query patterns
//!
//! Versioned tables carry a half-open effective period
//! `[effective_from, effective_to)` where a NULL `effective_to` means the row
//! is still open. A version is active at `t` when
//!
//! ```sql
//! effective_from <= t AND (effective_to IS NULL OR t < effective_to)
//! ```
//!
//! Predicates are pushed onto a [`QueryBuilder`] so the instant is always a
//! bound parameter.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

/// Columns shared by every versioned table, in select order
pub const PERIOD_AND_AUDIT_COLUMNS: &str =
    "effective_from, effective_to, created_by, created_at, last_updated_by, last_updated_at";

/// Appends `AND <active at instant>` to a query that already has a WHERE clause
pub fn push_active_at(builder: &mut QueryBuilder<'_, Postgres>, at: DateTime<Utc>) {
    builder.push(" AND effective_from <= ");
    builder.push_bind(at);
    builder.push(" AND (effective_to IS NULL OR ");
    builder.push_bind(at);
    builder.push(" < effective_to)");
}

/// Appends `AND column = value` when a filter field is set
pub fn push_eq<'args, T>(builder: &mut QueryBuilder<'args, Postgres>, column: &str, value: Option<T>)
where
    T: 'args + Send + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres>,
{
    if let Some(value) = value {
        builder.push(" AND ");
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_at_binds_instant_twice() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM reference_data WHERE 1=1");
        push_active_at(&mut builder, Utc::now());

        assert_eq!(
            builder.sql(),
            "SELECT id FROM reference_data WHERE 1=1 AND effective_from <= $1 \
             AND (effective_to IS NULL OR $2 < effective_to)"
        );
    }

    #[test]
    fn test_eq_skips_unset_fields() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM reference_data WHERE 1=1");
        push_eq(&mut builder, "ref_data_type", Some("STATUS".to_string()));
        push_eq::<String>(&mut builder, "ref_data_value", None);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM reference_data WHERE 1=1 AND ref_data_type = $1"
        );
    }
}
