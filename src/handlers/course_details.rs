use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::Response;

use super::{storage_failure, AppState};
use crate::flash::{redirect_with_flash, Flash, IncomingFlash};
use crate::metrics;
use crate::models::find_by_code;
use crate::observability::{LogEvent, SpanStatus};
use crate::tracker::RequestContext;
use crate::views;

const ROUTE: &str = "/course/:code";

/// GET /course/:code
pub async fn course_details(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
    Path(code): Path<String>,
    flash: IncomingFlash,
) -> Response {
    let mut span = state.observability.child_span(&req.span, "course-details");
    span.set_attribute("http.method", "GET");
    span.set_attribute("http.route", ROUTE);
    span.set_attribute("user.ip", req.client_ip.clone());

    let courses = match state.store.load().await {
        Ok(courses) => courses,
        Err(e) => return storage_failure(&state, &mut span, &req, ROUTE, &e),
    };

    let Some(course) = find_by_code(&courses, &code) else {
        state.observability.log(
            LogEvent::warn("Course not found.")
                .in_span(&span)
                .field("course_code", code.clone())
                .field("client_ip", req.client_ip.clone()),
        );
        span.set_attribute("course.exists", false);
        span.set_status(SpanStatus::Error("Course not found".to_string()));
        metrics::record_error(ROUTE, "not_found");

        return redirect_with_flash(
            "/catalog",
            Flash::error(format!("No course found with code '{}'.", code)),
        );
    };

    state.observability.log(
        LogEvent::info("Course details accessed.")
            .in_span(&span)
            .field("course_code", code.clone())
            .field("client_ip", req.client_ip.clone()),
    );
    span.set_attribute("course.exists", true);
    span.set_attribute("course.code", course.code.clone());

    flash.page(StatusCode::OK, views::course_details(course, flash.notice()))
}
