use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Response;

use super::AppState;
use crate::flash::IncomingFlash;
use crate::observability::LogEvent;
use crate::tracker::RequestContext;
use crate::views;

/// GET /
pub async fn home(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
    flash: IncomingFlash,
) -> Response {
    let mut span = state.observability.child_span(&req.span, "render-home");
    span.set_attribute("http.method", "GET");
    span.set_attribute("http.route", "/");
    span.set_attribute("user.ip", req.client_ip.clone());

    state.observability.log(
        LogEvent::info("Home page accessed.")
            .in_span(&span)
            .field("client_ip", req.client_ip.clone()),
    );

    flash.page(StatusCode::OK, views::home(flash.notice()))
}
