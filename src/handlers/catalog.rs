use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Instant;

use super::{storage_failure, AppState};
use crate::flash::IncomingFlash;
use crate::observability::LogEvent;
use crate::tracker::RequestContext;
use crate::views;

const ROUTE: &str = "/catalog";

/// GET /catalog
pub async fn list_catalog(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
    flash: IncomingFlash,
) -> Response {
    let start = Instant::now();

    let mut span = state
        .observability
        .child_span(&req.span, "render-course-catalog");
    span.set_attribute("http.method", "GET");
    span.set_attribute("http.route", ROUTE);
    span.set_attribute("user.ip", req.client_ip.clone());

    let courses = match state.store.load().await {
        Ok(courses) => courses,
        Err(e) => return storage_failure(&state, &mut span, &req, ROUTE, &e),
    };

    state.observability.log(
        LogEvent::info("Course catalog accessed.")
            .in_span(&span)
            .field("total_courses", courses.len())
            .field("client_ip", req.client_ip.clone()),
    );

    let body = views::catalog(&courses, flash.notice());

    span.set_attribute("course.count", courses.len());
    span.set_attribute("processing_time_ms", start.elapsed().as_secs_f64() * 1000.0);

    flash.page(StatusCode::OK, body)
}
