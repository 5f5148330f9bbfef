//! Criteria query builder
//!
//! Validates [`SearchCriteria`] against [`SearchLimits`] and compiles it into a
//! [`SearchQuery`]: a filter tree, a 0-based page request and a sort list.
//! Validation happens before anything reaches an adapter and stops at the
//! first violation.

use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::DateRange;

use crate::criteria::{SearchCriteria, SortSpec};
use crate::error::RequestError;
use crate::filter::{raw_ids, raw_request_ids, FilterClause, MembershipField, RequestFilter};

/// Path the envelope links point at
pub const DEFAULT_LINKS_BASE_PATH: &str = "/api/v1/document-requests/search";

/// Sortable request columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    Id,
    CreatedAt,
    LastUpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Id, SortField::CreatedAt, SortField::LastUpdatedAt];

    /// Name callers use in sort specs
    pub fn property(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CreatedAt => "createdAt",
            SortField::LastUpdatedAt => "lastUpdatedAt",
        }
    }

    /// Column of `document_request` the field sorts on
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CreatedAt => "created_at",
            SortField::LastUpdatedAt => "last_updated_at",
        }
    }

    pub fn from_property(property: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.property() == property)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses ASC or DESC, ignoring case
    pub fn parse(direction: &str) -> Option<Self> {
        if direction.eq_ignore_ascii_case("ASC") {
            Some(SortDirection::Asc)
        } else if direction.eq_ignore_ascii_case("DESC") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One validated sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    /// `id DESC`, used when no sort is requested
    pub const DEFAULT: SortOrder = SortOrder {
        field: SortField::Id,
        direction: SortDirection::Desc,
    };
}

/// A 0-based page of `size` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    /// 1-based page number as seen by callers
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    /// Rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.index) * u64::from(self.size)
    }
}

/// Limits and allow-lists applied by the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_page_size: u32,
    pub max_id_list_size: usize,
    pub default_page_size: u32,
    pub sortable: Vec<SortField>,
    pub links_base_path: String,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
            max_id_list_size: 100,
            default_page_size: 10,
            sortable: SortField::ALL.to_vec(),
            links_base_path: DEFAULT_LINKS_BASE_PATH.to_string(),
        }
    }
}

impl SearchLimits {
    fn sortable_list(&self) -> String {
        let names: Vec<&str> = self.sortable.iter().map(SortField::property).collect();
        format!("[{}]", names.join(", "))
    }
}

/// A validated, adapter-ready search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: RequestFilter,
    pub page: PageRequest,
    pub sort: Vec<SortOrder>,
    /// Sort specs as requested, echoed in the envelope
    pub requested_sorts: Vec<SortSpec>,
}

/// Compiles search criteria into queries
#[derive(Debug, Clone, Default)]
pub struct CriteriaQueryBuilder {
    limits: SearchLimits,
}

impl CriteriaQueryBuilder {
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Validates `criteria` and the 1-based `page`/`size` and builds the query
    pub fn build(
        &self,
        criteria: &SearchCriteria,
        page: i64,
        size: i64,
    ) -> Result<SearchQuery, RequestError> {
        let page = self.validate_paging(page, size)?;
        self.validate_id_lists(criteria)?;
        let sort = self.compile_sorts(&criteria.sorts)?;
        let range = DateRange::new(criteria.from, criteria.to)
            .map_err(|_| RequestError::invalid("fromDate must not be after toDate"))?;

        Ok(SearchQuery {
            filter: Self::compile_filter(criteria, range),
            page,
            sort,
            requested_sorts: criteria.sorts.clone(),
        })
    }

    fn validate_paging(&self, page: i64, size: i64) -> Result<PageRequest, RequestError> {
        if page < 1 {
            return Err(RequestError::invalid("Page number must be >= 1"));
        }
        if size < 1 {
            return Err(RequestError::invalid("Page size must be >= 1"));
        }
        if size > i64::from(self.limits.max_page_size) {
            return Err(RequestError::invalid(format!(
                "Page size must not exceed {} (requested: {})",
                self.limits.max_page_size, size
            )));
        }
        let index = u32::try_from(page - 1)
            .map_err(|_| RequestError::invalid(format!("Page number is too large: {page}")))?;
        // size is within 1..=max_page_size here
        let size = u32::try_from(size).unwrap_or(self.limits.max_page_size);
        Ok(PageRequest { index, size })
    }

    fn validate_id_lists(&self, criteria: &SearchCriteria) -> Result<(), RequestError> {
        let max = self.limits.max_id_list_size;
        let lists = [
            ("requestIds", criteria.request_ids.len()),
            ("batchIds", criteria.batch_ids.len()),
        ];
        for (name, provided) in lists {
            if provided > max {
                return Err(RequestError::invalid(format!(
                    "{name} list size must not exceed {max} (provided: {provided})"
                )));
            }
        }
        Ok(())
    }

    fn compile_sorts(&self, specs: &[SortSpec]) -> Result<Vec<SortOrder>, RequestError> {
        if specs.is_empty() {
            return Ok(vec![SortOrder::DEFAULT]);
        }

        specs.iter().map(|spec| self.compile_sort(spec)).collect()
    }

    fn compile_sort(&self, spec: &SortSpec) -> Result<SortOrder, RequestError> {
        let property = spec
            .property
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| RequestError::invalid("Sort property cannot be null or blank"))?;

        let field = SortField::from_property(property)
            .filter(|field| self.limits.sortable.contains(field))
            .ok_or_else(|| {
                RequestError::invalid(format!(
                    "Invalid sort property: {}. Valid properties are: {}",
                    property,
                    self.limits.sortable_list()
                ))
            })?;

        let direction = spec
            .direction
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| RequestError::invalid("Sort direction cannot be null or blank"))?;

        let direction = SortDirection::parse(direction).ok_or_else(|| {
            RequestError::invalid(format!(
                "Invalid sort direction: {direction}. Must be ASC or DESC"
            ))
        })?;

        Ok(SortOrder { field, direction })
    }

    fn compile_filter(criteria: &SearchCriteria, range: DateRange) -> RequestFilter {
        let mut filter = RequestFilter::all()
            .and_member_of(MembershipField::SourceSystem, raw_ids(&criteria.source_systems))
            .and_member_of(MembershipField::DocumentType, raw_ids(&criteria.document_types))
            .and_member_of(MembershipField::DocumentName, raw_ids(&criteria.document_names))
            .and_member_of(MembershipField::Status, raw_ids(&criteria.statuses))
            .and_member_of(MembershipField::RequestId, raw_request_ids(&criteria.request_ids));

        if !criteria.batch_ids.is_empty() {
            filter = filter.and(FilterClause::BatchExists {
                batch_ids: criteria.batch_ids.clone(),
            });
        }
        if !range.is_unbounded() {
            filter = filter.and(FilterClause::CreatedWithin(range));
        }
        for chip in &criteria.metadata_chips {
            filter = filter.and(FilterClause::MetadataExists(chip.clone()));
        }
        filter
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.property(), self.direction.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::MetadataChip;
    use chrono::{TimeZone, Utc};
    use core_kernel::{BatchId, ReferenceDataId, RequestId};

    fn builder() -> CriteriaQueryBuilder {
        CriteriaQueryBuilder::new(SearchLimits::default())
    }

    fn invalid_message(result: Result<SearchQuery, RequestError>) -> String {
        match result {
            Err(RequestError::InvalidRequest(message)) => message,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_criteria_builds_unfiltered_default_sorted_query() {
        let query = builder().build(&SearchCriteria::new(), 1, 10).unwrap();

        assert!(query.filter.is_empty());
        assert_eq!(query.page, PageRequest { index: 0, size: 10 });
        assert_eq!(query.sort, vec![SortOrder::DEFAULT]);
        assert!(query.requested_sorts.is_empty());
    }

    #[test]
    fn test_page_and_size_bounds() {
        let criteria = SearchCriteria::new();
        assert_eq!(
            invalid_message(builder().build(&criteria, 0, 10)),
            "Page number must be >= 1"
        );
        assert_eq!(
            invalid_message(builder().build(&criteria, 1, 0)),
            "Page size must be >= 1"
        );
        assert_eq!(
            invalid_message(builder().build(&criteria, 1, 1001)),
            "Page size must not exceed 1000 (requested: 1001)"
        );
        assert!(builder().build(&criteria, 1, 1000).is_ok());
    }

    #[test]
    fn test_request_id_list_limit() {
        let criteria = SearchCriteria::new().with_request_ids((1..=101).map(RequestId::new));
        assert_eq!(
            invalid_message(builder().build(&criteria, 1, 10)),
            "requestIds list size must not exceed 100 (provided: 101)"
        );

        let criteria = SearchCriteria::new().with_request_ids((1..=100).map(RequestId::new));
        assert!(builder().build(&criteria, 1, 10).is_ok());
    }

    #[test]
    fn test_batch_id_list_limit() {
        let criteria = SearchCriteria::new().with_batch_ids((1..=101).map(BatchId::new));
        assert_eq!(
            invalid_message(builder().build(&criteria, 1, 10)),
            "batchIds list size must not exceed 100 (provided: 101)"
        );
    }

    #[test]
    fn test_limits_are_overridable() {
        let limits = SearchLimits {
            max_id_list_size: 2,
            max_page_size: 5,
            ..Default::default()
        };
        let builder = CriteriaQueryBuilder::new(limits);
        let criteria = SearchCriteria::new().with_request_ids((1..=3).map(RequestId::new));

        assert!(builder.build(&criteria, 1, 5).is_err());
        assert!(builder.build(&SearchCriteria::new(), 1, 6).is_err());
    }

    #[test]
    fn test_unknown_sort_property_is_rejected() {
        let criteria = SearchCriteria::new().sorted_by(SortSpec::new("secretField", "ASC"));
        assert_eq!(
            invalid_message(builder().build(&criteria, 1, 10)),
            "Invalid sort property: secretField. Valid properties are: [id, createdAt, lastUpdatedAt]"
        );
    }

    #[test]
    fn test_blank_sort_parts_are_rejected() {
        let blank_property = SearchCriteria::new().sorted_by(SortSpec::new("  ", "ASC"));
        assert_eq!(
            invalid_message(builder().build(&blank_property, 1, 10)),
            "Sort property cannot be null or blank"
        );

        let missing_direction = SearchCriteria::new().sorted_by(SortSpec {
            property: Some("id".to_string()),
            direction: None,
        });
        assert_eq!(
            invalid_message(builder().build(&missing_direction, 1, 10)),
            "Sort direction cannot be null or blank"
        );

        let bad_direction = SearchCriteria::new().sorted_by(SortSpec::new("id", "UP"));
        assert_eq!(
            invalid_message(builder().build(&bad_direction, 1, 10)),
            "Invalid sort direction: UP. Must be ASC or DESC"
        );
    }

    #[test]
    fn test_sorts_apply_in_order_case_insensitively() {
        let criteria = SearchCriteria::new()
            .sorted_by(SortSpec::new("createdAt", "asc"))
            .sorted_by(SortSpec::new("id", "Desc"));
        let query = builder().build(&criteria, 2, 25).unwrap();

        assert_eq!(
            query.sort,
            vec![
                SortOrder { field: SortField::CreatedAt, direction: SortDirection::Asc },
                SortOrder { field: SortField::Id, direction: SortDirection::Desc },
            ]
        );
        assert_eq!(query.page.offset(), 25);
        assert_eq!(query.requested_sorts.len(), 2);
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let criteria = SearchCriteria::new().created_between(Some(from), Some(to));

        assert_eq!(
            invalid_message(builder().build(&criteria, 1, 10)),
            "fromDate must not be after toDate"
        );
    }

    #[test]
    fn test_each_chip_becomes_its_own_clause() {
        let criteria = SearchCriteria::new()
            .with_chip(MetadataChip::new(ReferenceDataId::new(5), "A"))
            .with_chip(MetadataChip::new(ReferenceDataId::new(6), "B"))
            .with_statuses([ReferenceDataId::new(1)])
            .with_batch_ids([BatchId::new(9)]);
        let query = builder().build(&criteria, 1, 10).unwrap();

        let chips = query
            .filter
            .clauses()
            .iter()
            .filter(|c| matches!(c, FilterClause::MetadataExists(_)))
            .count();
        assert_eq!(chips, 2);
        assert_eq!(query.filter.clauses().len(), 4);
    }

    #[test]
    fn test_open_date_bound_adds_clause() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let criteria = SearchCriteria::new().created_between(Some(from), None);
        let query = builder().build(&criteria, 1, 10).unwrap();

        assert!(matches!(
            query.filter.clauses(),
            [FilterClause::CreatedWithin(range)] if range.from == Some(from) && range.to.is_none()
        ));
    }
}
