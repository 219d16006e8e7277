//! Request tracker middleware
//!
//! Wraps every catalog route in a server span named `request-tracker`. The
//! span is opened before the handler runs, tagged with the caller's method,
//! URL and address, and closed after the response is built. Handlers find it
//! through the [`RequestContext`] extension and hang their own spans off it.

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::http::header::HOST;
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use std::time::Instant;

use crate::handlers::AppState;
use crate::metrics;
use crate::observability::{SpanContext, SpanStatus};

const UNKNOWN_IP: &str = "unknown";

/// Request-scoped state shared with handlers
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Snapshot of the request span, used as the parent for handler spans
    pub span: SpanContext,
    pub client_ip: String,
}

pub async fn track_request(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string());

    let mut span = state.observability.root_span("request-tracker");
    span.set_attribute("http.method", method.clone());
    span.set_attribute("http.url", absolute_url(req.uri(), req.headers().get(HOST)));
    span.set_attribute("net.peer.ip", client_ip.clone());
    span.add_event("New request tracked");

    req.extensions_mut().insert(RequestContext {
        span: (*span).clone(),
        client_ip,
    });

    let response = next.run(req).await;

    let status = response.status();
    span.set_attribute("http.route", route.clone());
    span.set_attribute("http.status_code", status.as_u16());
    if status.is_server_error() {
        span.set_status(SpanStatus::Error(format!("HTTP {}", status.as_u16())));
    }

    metrics::record_request(&method, &route, status.as_u16(), start.elapsed());

    response
}

/// Rebuild the absolute request URL from the `Host` header
fn absolute_url(uri: &Uri, host: Option<&axum::http::HeaderValue>) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let host = host
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    format!("http://{}{}", host, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_absolute_url_from_host() {
        let uri: Uri = "/course/CS101?x=1".parse().unwrap();
        let host = HeaderValue::from_static("catalog.local:5000");

        assert_eq!(
            absolute_url(&uri, Some(&host)),
            "http://catalog.local:5000/course/CS101?x=1"
        );
    }

    #[test]
    fn test_absolute_url_without_host() {
        let uri: Uri = "/catalog".parse().unwrap();
        assert_eq!(absolute_url(&uri, None), "http://localhost/catalog");
    }

    #[test]
    fn test_absolute_url_passthrough() {
        let uri: Uri = "http://example.com/".parse().unwrap();
        assert_eq!(absolute_url(&uri, None), "http://example.com/");
    }
}
