use axum::extract::rejection::FormRejection;
use axum::extract::{Extension, Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;

use super::AppState;
use crate::error::AddCourseError;
use crate::flash::{redirect_with_flash, Flash, IncomingFlash};
use crate::metrics;
use crate::models::Course;
use crate::observability::LogEvent;
use crate::storage::CatalogStore;
use crate::tracker::RequestContext;
use crate::views;

const ROUTE: &str = "/add_course";
const FAILURE_NOTICE: &str = "Failed to add the course. Please check the form inputs.";

/// GET /add_course
pub async fn show_form(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
    flash: IncomingFlash,
) -> Response {
    let mut span = state.observability.child_span(&req.span, "add-course");
    span.set_attribute("http.method", "GET");
    span.set_attribute("http.route", ROUTE);
    span.set_attribute("user.ip", req.client_ip.clone());

    flash.page(StatusCode::OK, views::add_course_form(|_| None, flash.notice()))
}

/// POST /add_course
///
/// Always answers: a redirect to the catalog on success, the refilled form
/// with an error notice otherwise. A body that is not urlencoded counts as
/// an empty submission.
pub async fn submit(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let mut span = state.observability.child_span(&req.span, "add-course");
    span.set_attribute("http.method", "POST");
    span.set_attribute("http.route", ROUTE);
    span.set_attribute("user.ip", req.client_ip.clone());

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            span.set_attribute("form.rejected", rejection.body_text());
            HashMap::new()
        }
    };

    match add(state.store.as_ref(), &form).await {
        Ok(course) => {
            state.observability.log(
                LogEvent::info("Course added successfully.")
                    .in_span(&span)
                    .field("course", serde_json::to_value(&course).unwrap_or_default())
                    .field("client_ip", req.client_ip.clone()),
            );
            span.set_attribute("course.code", course.code.clone());
            span.add_event("Course saved to catalog.");
            metrics::record_course_added();

            redirect_with_flash(
                "/catalog",
                Flash::success(format!("Course '{}' added successfully!", course.name)),
            )
        }
        Err(e) => {
            state.observability.log(
                LogEvent::error("Error adding course.")
                    .in_span(&span)
                    .field("error", e.to_string())
                    .field("client_ip", req.client_ip.clone()),
            );
            span.fail(&e);
            metrics::record_error(ROUTE, e.kind());

            let body = views::add_course_form(
                |name| form.get(name).map(String::as_str),
                Some(&Flash::error(FAILURE_NOTICE)),
            );
            (StatusCode::OK, Html(body)).into_response()
        }
    }
}

async fn add(
    store: &dyn CatalogStore,
    form: &HashMap<String, String>,
) -> Result<Course, AddCourseError> {
    let course = Course::from_form(form)?;
    store.save(course.clone()).await?;
    Ok(course)
}
