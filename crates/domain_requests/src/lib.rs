//! Document Request Monitoring Domain
//!
//! Read side of the document request aggregate:
//!
//! - **Criteria search**: [`SearchCriteria`] is validated and compiled by the
//!   [`CriteriaQueryBuilder`] into a [`SearchQuery`] (AND-ed filter tree,
//!   page, sort). Results come back in a [`SearchPage`] envelope with
//!   navigation links.
//! - **Summary**: request counts per status over a creation date range.
//! - **Details**: metadata, JSON/XML content, batches and batch errors.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = DocumentRequestService::new(port, SearchLimits::default());
//! let criteria = SearchCriteria::new()
//!     .with_statuses([failed_status_id])
//!     .with_chip(MetadataChip::new(customer_key_id, "C-1001"));
//! let page = service.search(&criteria, 1, 10).await?;
//! ```

pub mod request;
pub mod criteria;
pub mod filter;
pub mod query;
pub mod page;
pub mod summary;
pub mod ports;
pub mod service;
pub mod error;

pub use request::{
    Batch, ContentType, DocumentContent, DocumentRequest, ErrorDetail, MetadataValue, StatusRef,
    StoredContent,
};
pub use criteria::{MetadataChip, SearchCriteria, SortSpec};
pub use filter::{FilterClause, MembershipField, RequestFilter};
pub use query::{
    CriteriaQueryBuilder, PageRequest, SearchLimits, SearchQuery, SortDirection, SortField,
    SortOrder, DEFAULT_LINKS_BASE_PATH,
};
pub use page::{PageLinks, SearchPage};
pub use summary::{RequestSummary, StatusCount};
pub use ports::{DocumentRequestPort, Slice};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockDocumentRequestPort;
pub use service::DocumentRequestService;
pub use error::RequestError;
