//! Routes for checking the tracing pipeline end to end

use axum::extract::{Extension, State};

use super::AppState;
use crate::observability::{LogEvent, SpanKind};
use crate::tracker::RequestContext;

/// GET /manual-trace
///
/// Opens an explicit server span under the request span.
pub async fn manual_trace(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
) -> &'static str {
    let mut manual = req.span.child("manual-span");
    manual.kind = SpanKind::Server;
    let mut span = state.observability.open(manual);

    span.set_attribute("http.method", "GET");
    if let Some(url) = req.span.attribute("http.url").cloned() {
        span.set_attribute("http.url", url);
    }
    span.add_event("Processing manual trace request.");

    state.observability.log(
        LogEvent::info("Manual trace recorded.")
            .in_span(&span)
            .field("client_ip", req.client_ip.clone()),
    );

    "Manual trace recorded!"
}

/// GET /auto-instrumented
///
/// No span of its own: only the request tracker covers it.
pub async fn auto_instrumented(
    State(state): State<AppState>,
    Extension(req): Extension<RequestContext>,
) -> &'static str {
    state.observability.log(
        LogEvent::info("Auto-instrumented route accessed.")
            .in_span(&req.span)
            .field("client_ip", req.client_ip.clone()),
    );

    "This route is auto-instrumented!"
}
