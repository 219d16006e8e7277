//! Shared harness for router-level tests
#![allow(dead_code)]

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use course_catalog::handlers::AppState;
use course_catalog::models::Course;
use course_catalog::observability::{
    LogEvent, ObservabilityContext, SpanContext, SpanRecord, TelemetrySink,
};
use course_catalog::server::create_router;
use course_catalog::storage::{CatalogStore, JsonFileStore};

/// Records every span start/end and log event
#[derive(Default)]
pub struct RecordingSink {
    pub started: Mutex<Vec<SpanContext>>,
    pub ended: Mutex<Vec<SpanRecord>>,
    pub logs: Mutex<Vec<LogEvent>>,
}

impl TelemetrySink for RecordingSink {
    fn on_span_start(&self, span: &SpanContext) {
        self.started.lock().unwrap().push(span.clone());
    }

    fn on_span_end(&self, span: SpanRecord) {
        self.ended.lock().unwrap().push(span);
    }

    fn on_log(&self, event: &LogEvent) {
        self.logs.lock().unwrap().push(event.clone());
    }
}

impl RecordingSink {
    pub fn started_count(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    pub fn ended(&self) -> Vec<SpanRecord> {
        self.ended.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<LogEvent> {
        self.logs.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.started.lock().unwrap().clear();
        self.ended.lock().unwrap().clear();
        self.logs.lock().unwrap().clear();
    }

    pub fn span(&self, name: &str) -> Option<SpanRecord> {
        self.ended().into_iter().find(|s| s.name == name)
    }
}

pub struct TestApp {
    pub router: Router,
    pub sink: Arc<RecordingSink>,
    pub store: JsonFileStore,
    _dir: TempDir,
}

pub const CLIENT_ADDR: ([u8; 4], u16) = ([10, 1, 2, 3], 40000);

impl TestApp {
    /// Router over an empty catalog in a fresh temp dir
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("course_catalog.json"));
        Self::with_store(dir, store, true)
    }

    /// Router whose requests carry no peer address
    pub fn without_connect_info() -> Self {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("course_catalog.json"));
        Self::with_store(dir, store, false)
    }

    fn with_store(dir: TempDir, store: JsonFileStore, connect_info: bool) -> Self {
        let sink = Arc::new(RecordingSink::default());
        let observability = ObservabilityContext::builder("course-catalog-service")
            .sink(sink.clone())
            .build();
        let state = AppState::new(Arc::new(store.clone()), observability);

        let router = create_router(state, None);
        let router = if connect_info {
            router.layer(MockConnectInfo(SocketAddr::from(CLIENT_ADDR)))
        } else {
            router
        };

        Self {
            router,
            sink,
            store,
            _dir: dir,
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response<Body> {
        self.request(
            Request::get(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        self.request(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn catalog(&self) -> Vec<Course> {
        self.store.load().await.unwrap()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
}

/// CS101 form fields, without prerequisites
pub fn cs101_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("code", "CS101"),
        ("name", "Intro"),
        ("instructor", "A"),
        ("semester", "Fall"),
        ("schedule", "MWF"),
        ("classroom", "R1"),
        ("grading", "A-F"),
        ("description", "d"),
    ]
}
