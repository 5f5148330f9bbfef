//! Document configuration
//!
//! Per-document settings keyed by footer, application document spec and code
//! (all reference data ids) plus a free-text value.
//!
//! Searches may also name the footer, document name (the application document
//! spec) and code by the `ref_data_value` of the referenced rows, e.g.
//! footer "0", document name "IVBRKCOM", code "SIGNEE_1". Any version of the
//! referenced row counts, so configurations pointing at a since-superseded
//! reference version are still found.

use serde::{Deserialize, Serialize};

use core_kernel::{DocumentConfigId, ReferenceDataId};

use crate::record::{EmptyLookup, RecordPayload, ReferenceLabels, VersionedRecord};

/// A stored document configuration version
pub type DocumentConfigRecord = VersionedRecord<DocumentConfiguration>;

/// Content of a document configuration version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfiguration {
    pub footer_id: ReferenceDataId,
    pub app_doc_spec_id: ReferenceDataId,
    pub code_id: ReferenceDataId,
    pub value: String,
    pub description: Option<String>,
}

/// Equality filter over the (footer, app doc spec, code, value) business key
///
/// The `*_value` fields match the referenced reference data by value rather
/// than by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentConfigFilter {
    pub footer_id: Option<ReferenceDataId>,
    pub app_doc_spec_id: Option<ReferenceDataId>,
    pub code_id: Option<ReferenceDataId>,
    pub value: Option<String>,
    pub footer_value: Option<String>,
    pub document_name: Option<String>,
    pub code_value: Option<String>,
}

impl DocumentConfigFilter {
    /// Filter on the referenced rows' values, as in
    /// `?footer=0&documentName=IVBRKCOM&code=SIGNEE_1`
    pub fn by_values(
        footer: impl Into<String>,
        document_name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            footer_value: Some(footer.into()),
            document_name: Some(document_name.into()),
            code_value: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.footer_id.is_none()
            && self.app_doc_spec_id.is_none()
            && self.code_id.is_none()
            && self.value.is_none()
            && self.footer_value.is_none()
            && self.document_name.is_none()
            && self.code_value.is_none()
    }
}

fn label_is(labels: &ReferenceLabels, id: ReferenceDataId, wanted: &Option<String>) -> bool {
    wanted
        .as_ref()
        .map_or(true, |w| labels.get(&id).is_some_and(|label| label == w))
}

impl RecordPayload for DocumentConfiguration {
    type Id = DocumentConfigId;
    type Filter = DocumentConfigFilter;

    const KIND: &'static str = "Document configuration";

    fn key_filter(&self) -> Self::Filter {
        DocumentConfigFilter {
            footer_id: Some(self.footer_id),
            app_doc_spec_id: Some(self.app_doc_spec_id),
            code_id: Some(self.code_id),
            value: Some(self.value.clone()),
            ..DocumentConfigFilter::default()
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.footer_id.map_or(true, |id| id == self.footer_id)
            && filter.app_doc_spec_id.map_or(true, |id| id == self.app_doc_spec_id)
            && filter.code_id.map_or(true, |id| id == self.code_id)
            && filter.value.as_ref().map_or(true, |v| *v == self.value)
    }

    fn matches_with_labels(&self, filter: &Self::Filter, labels: &ReferenceLabels) -> bool {
        self.matches(filter)
            && label_is(labels, self.footer_id, &filter.footer_value)
            && label_is(labels, self.app_doc_spec_id, &filter.document_name)
            && label_is(labels, self.code_id, &filter.code_value)
    }

    fn on_empty_lookup(_filter: &Self::Filter, _include_historic: bool) -> EmptyLookup {
        EmptyLookup::Empty
    }
}
