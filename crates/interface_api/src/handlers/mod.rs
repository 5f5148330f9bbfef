//! Request handlers, one module per resource

pub mod health;
pub mod reference_data;
pub mod document_config;
pub mod document_requests;
pub mod batches;
