//! SQL rendering of document request searches
//!
//! Turns a validated [`SearchQuery`] into a page query and a count query over
//! `document_request dr`. Clauses on related tables become correlated
//! `EXISTS` subqueries so a request is returned once however many of its
//! batches or metadata rows match.

use sqlx::{Postgres, QueryBuilder};

use core_kernel::DateRange;
use domain_requests::{FilterClause, MembershipField, RequestFilter, SearchQuery, SortOrder};

/// Columns selected for a document request row
pub const REQUEST_COLUMNS: &str = "dr.id, dr.source_system_id, dr.document_type_id, \
     dr.document_name_id, dr.status_id, dr.created_at, dr.last_updated_at, dr.created_by";

fn membership_column(field: MembershipField) -> &'static str {
    match field {
        MembershipField::SourceSystem => "dr.source_system_id",
        MembershipField::DocumentType => "dr.document_type_id",
        MembershipField::DocumentName => "dr.document_name_id",
        MembershipField::Status => "dr.status_id",
        MembershipField::RequestId => "dr.id",
    }
}

/// Appends `AND created_at` bounds for the set ends of `range`
pub fn push_created_within(builder: &mut QueryBuilder<'_, Postgres>, range: &DateRange) {
    if let Some(from) = range.from {
        builder.push(" AND dr.created_at >= ");
        builder.push_bind(from);
    }
    if let Some(to) = range.to {
        builder.push(" AND dr.created_at <= ");
        builder.push_bind(to);
    }
}

fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, clause: &FilterClause) {
    match clause {
        FilterClause::Membership { field, ids } => {
            builder.push(" AND ");
            builder.push(membership_column(*field));
            builder.push(" = ANY(");
            builder.push_bind(ids.clone());
            builder.push(")");
        }
        FilterClause::CreatedWithin(range) => push_created_within(builder, range),
        FilterClause::BatchExists { batch_ids } => {
            let raw: Vec<i64> = batch_ids.iter().map(|id| id.value()).collect();
            builder.push(
                " AND EXISTS (SELECT 1 FROM th_batch b WHERE b.request_id = dr.id AND b.id = ANY(",
            );
            builder.push_bind(raw);
            builder.push("))");
        }
        FilterClause::MetadataExists(chip) => {
            builder.push(
                " AND EXISTS (SELECT 1 FROM request_metadata_value m \
                 WHERE m.request_id = dr.id AND m.key_id = ",
            );
            builder.push_bind(chip.key_id.value());
            builder.push(" AND m.metadata_value = ");
            builder.push_bind(chip.value.clone());
            builder.push(")");
        }
    }
}

/// Appends the WHERE clause for `filter`; an empty filter still yields a valid WHERE
pub fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RequestFilter) {
    builder.push(" WHERE 1=1");
    for clause in filter.clauses() {
        push_clause(builder, clause);
    }
}

fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, sort: &[SortOrder]) {
    let orders: &[SortOrder] = if sort.is_empty() {
        std::slice::from_ref(&SortOrder::DEFAULT)
    } else {
        sort
    };
    builder.push(" ORDER BY ");
    let mut separated = builder.separated(", ");
    for order in orders {
        separated.push(format!(
            "dr.{} {}",
            order.field.column(),
            order.direction.as_sql()
        ));
    }
}

/// The page query: filtered, distinct, ordered, limited
pub fn search_query(query: &SearchQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT DISTINCT ");
    builder.push(REQUEST_COLUMNS);
    builder.push(" FROM document_request dr");
    push_filter(&mut builder, &query.filter);
    push_order_by(&mut builder, &query.sort);
    builder.push(" LIMIT ");
    builder.push_bind(i64::from(query.page.size));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));
    builder
}

/// The count of distinct requests matching the filter
pub fn count_query(filter: &RequestFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(DISTINCT dr.id) FROM document_request dr");
    push_filter(&mut builder, filter);
    builder
}

/// Status reference data of every request created within `range`
pub fn statuses_query(range: &DateRange) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT rd.id, rd.ref_data_value AS name, rd.description \
         FROM document_request dr JOIN reference_data rd ON rd.id = dr.status_id WHERE 1=1",
    );
    push_created_within(&mut builder, range);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::{BatchId, ReferenceDataId};
    use domain_requests::{
        CriteriaQueryBuilder, MetadataChip, SearchCriteria, SearchLimits, SortSpec,
    };

    fn build(criteria: &SearchCriteria, page: i64, size: i64) -> SearchQuery {
        CriteriaQueryBuilder::new(SearchLimits::default())
            .build(criteria, page, size)
            .unwrap()
    }

    #[test]
    fn test_empty_criteria_selects_everything_newest_id_first() {
        let query = build(&SearchCriteria::new(), 1, 10);
        let builder = search_query(&query);

        assert_eq!(
            builder.sql(),
            format!(
                "SELECT DISTINCT {REQUEST_COLUMNS} FROM document_request dr WHERE 1=1 \
                 ORDER BY dr.id DESC LIMIT $1 OFFSET $2"
            )
        );
    }

    #[test]
    fn test_membership_lists_render_as_any() {
        let criteria = SearchCriteria::new()
            .with_statuses([ReferenceDataId::new(4), ReferenceDataId::new(5)]);
        let query = build(&criteria, 1, 10);

        assert!(search_query(&query)
            .sql()
            .contains("WHERE 1=1 AND dr.status_id = ANY($1)"));
    }

    #[test]
    fn test_related_rows_use_exists_subqueries() {
        let criteria = SearchCriteria::new()
            .with_batch_ids([BatchId::new(7)])
            .with_chip(MetadataChip::new(ReferenceDataId::new(9), "C-1001"));
        let query = build(&criteria, 1, 10);
        let builder = count_query(&query.filter);
        let sql = builder.sql();

        assert!(sql.starts_with("SELECT COUNT(DISTINCT dr.id) FROM document_request dr WHERE 1=1"));
        assert!(sql.contains(
            "EXISTS (SELECT 1 FROM th_batch b WHERE b.request_id = dr.id AND b.id = ANY($1))"
        ));
        assert!(sql.contains("m.key_id = $2 AND m.metadata_value = $3)"));
        assert!(!sql.contains(" JOIN "));
    }

    #[test]
    fn test_sorts_follow_request_order() {
        let criteria = SearchCriteria::new()
            .sorted_by(SortSpec::new("createdAt", "asc"))
            .sorted_by(SortSpec::new("id", "DESC"));
        let query = build(&criteria, 2, 25);

        assert!(search_query(&query)
            .sql()
            .contains("ORDER BY dr.created_at ASC, dr.id DESC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let criteria = SearchCriteria::new().created_between(Some(from), None);
        let query = build(&criteria, 1, 10);

        let builder = search_query(&query);
        assert!(builder.sql().contains("AND dr.created_at >= $1"));
        assert!(!builder.sql().contains("dr.created_at <="));
    }

    #[test]
    fn test_statuses_query_joins_reference_data() {
        let range = DateRange::new(None, Some(Utc::now())).unwrap();
        let builder = statuses_query(&range);

        assert!(builder.sql().contains("JOIN reference_data rd ON rd.id = dr.status_id"));
        assert!(builder.sql().ends_with("AND dr.created_at <= $1"));
    }
}
