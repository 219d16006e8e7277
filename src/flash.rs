//! One-shot flash notices
//!
//! A notice travels in the `flash` cookie across a redirect, is rendered by
//! the next page and cleared in the same response. The cookie value is the
//! urlencoded pair list `kind=<kind>&message=<text>`.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::convert::Infallible;
use url::form_urlencoded;

const COOKIE_NAME: &str = "flash";
const CLEAR_COOKIE: &str = "flash=; Path=/; Max-Age=0; HttpOnly";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashKind::Success),
            "error" => Some(FlashKind::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("kind", self.kind.as_str())
            .append_pair("message", &self.message)
            .finish()
    }

    pub fn decode(value: &str) -> Option<Self> {
        let mut kind = None;
        let mut message = None;
        for (key, val) in form_urlencoded::parse(value.as_bytes()) {
            match &*key {
                "kind" => kind = FlashKind::parse(&val),
                "message" => message = Some(val.into_owned()),
                _ => {}
            }
        }
        Some(Self {
            kind: kind?,
            message: message?,
        })
    }

    /// Find the flash cookie among the request's `Cookie` headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().strip_prefix("flash="))
            .find_map(Flash::decode)
    }

    fn set_cookie(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", COOKIE_NAME, self.encode())
    }
}

/// Flash notice carried by the incoming request, if any
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Option<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(IncomingFlash(Flash::from_headers(&parts.headers)))
    }
}

impl IncomingFlash {
    pub fn notice(&self) -> Option<&Flash> {
        self.0.as_ref()
    }

    /// Render a page, clearing the cookie if a notice was shown
    pub fn page(&self, status: StatusCode, body: String) -> Response {
        let mut response = (status, Html(body)).into_response();
        if self.0.is_some() {
            response
                .headers_mut()
                .insert(SET_COOKIE, axum::http::HeaderValue::from_static(CLEAR_COOKIE));
        }
        response
    }
}

/// 303 redirect carrying a notice for the next page
pub fn redirect_with_flash(to: &str, flash: Flash) -> Response {
    let cookie = flash.set_cookie();
    ([(SET_COOKIE, cookie)], Redirect::to(to)).into_response()
}
