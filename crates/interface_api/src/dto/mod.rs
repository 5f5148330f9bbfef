//! Request/response data transfer objects
//!
//! JSON field names are camelCase throughout.

pub mod common;
pub mod reference_data;
pub mod document_config;
pub mod document_requests;
