//! HTTP API Layer
//!
//! This crate provides the REST API for the document monitoring service using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each resource
//! - **Middleware**: Authentication, tracing, request ids, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::postgres(pool, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{Clock, HealthCheckable, SystemClock};
use domain_reference::{DocumentConfiguration, ReferenceData, TemporalRecordStore};
use domain_requests::DocumentRequestService;
use infra_db::{
    DocumentConfigRepository, DocumentRequestRepository, PgHealthCheck, ReferenceDataRepository,
};

use crate::config::ApiConfig;
use crate::handlers::{batches, document_config, document_requests, health, reference_data};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub reference_data: TemporalRecordStore<ReferenceData>,
    pub document_configs: TemporalRecordStore<DocumentConfiguration>,
    pub document_requests: Arc<DocumentRequestService>,
    pub health: Arc<dyn HealthCheckable>,
}

impl AppState {
    /// Wires every service to PostgreSQL repositories sharing `pool`
    pub fn postgres(pool: PgPool, config: ApiConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let limits = config.search_limits();

        Self {
            reference_data: TemporalRecordStore::new(
                Arc::new(ReferenceDataRepository::new(pool.clone())),
                Arc::clone(&clock),
            ),
            document_configs: TemporalRecordStore::new(
                Arc::new(DocumentConfigRepository::new(pool.clone())),
                clock,
            ),
            document_requests: Arc::new(DocumentRequestService::new(
                Arc::new(DocumentRequestRepository::new(pool.clone())),
                limits,
            )),
            health: Arc::new(PgHealthCheck::new(pool)),
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Services and configuration shared by the handlers
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let reference_data_routes = Router::new()
        .route(
            "/",
            get(reference_data::list_reference_data).post(reference_data::create_reference_data),
        )
        .route(
            "/:id",
            get(reference_data::get_reference_data)
                .put(reference_data::update_reference_data)
                .delete(reference_data::delete_reference_data),
        )
        .route("/type/:type", get(reference_data::list_reference_data_by_type));

    let document_config_routes = Router::new()
        .route(
            "/",
            get(document_config::list_document_configs)
                .post(document_config::create_document_config),
        )
        .route("/search", get(document_config::search_document_configs))
        .route(
            "/:id",
            get(document_config::get_document_config)
                .put(document_config::update_document_config)
                .delete(document_config::delete_document_config),
        );

    let document_request_routes = Router::new()
        .route("/search", post(document_requests::search_document_requests))
        .route("/summary", get(document_requests::document_request_summary))
        .route("/:id/metadata", get(document_requests::get_metadata))
        .route("/:id/json-content", get(document_requests::get_json_content))
        .route("/:id/xml-content", get(document_requests::get_xml_content))
        .route("/:id/batches", get(document_requests::get_batches));

    let batch_routes = Router::new().route("/:id/errors", get(batches::get_batch_errors));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/reference-data", reference_data_routes)
        .nest("/document-configurations", document_config_routes)
        .nest("/document-requests", document_request_routes)
        .nest("/batches", batch_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
