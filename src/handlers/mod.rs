pub mod add_course;
pub mod catalog;
pub mod course_details;
pub mod diagnostics;
pub mod health;
pub mod home;
pub mod metrics_handler;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use crate::error::StorageError;
use crate::metrics;
use crate::observability::{LogEvent, ObservabilityContext, SpanGuard};
use crate::storage::CatalogStore;
use crate::tracker::RequestContext;
use crate::views;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub observability: ObservabilityContext,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, observability: ObservabilityContext) -> Self {
        Self {
            store,
            observability,
        }
    }
}

const STORAGE_FAILURE_NOTICE: &str = "The course catalog could not be read. Please try again later.";

/// Log, tag the span and render the error page for a failed catalog read
fn storage_failure(
    state: &AppState,
    span: &mut SpanGuard,
    req: &RequestContext,
    route: &str,
    error: &StorageError,
) -> Response {
    state.observability.log(
        LogEvent::error("Failed to load course catalog.")
            .in_span(span)
            .field("error", error.to_string())
            .field("client_ip", req.client_ip.clone()),
    );
    span.fail(error);
    metrics::record_error(route, error.kind());

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::error_page(STORAGE_FAILURE_NOTICE)),
    )
        .into_response()
}
