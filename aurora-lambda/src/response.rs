use aurora_core::{AuroraError, Result};
use lambda_http::{Body, Response};
use serde::Serialize;
use std::collections::BTreeMap;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// API Gateway proxy response, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok_json(body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
        Self {
            status_code: 200,
            headers,
            is_base64_encoded: false,
            body,
        }
    }

    /// Every failure collapses to this: status 500, no headers, empty body.
    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            headers: BTreeMap::new(),
            is_base64_encoded: false,
            body: String::new(),
        }
    }

    pub fn into_http(self) -> std::result::Result<Response<Body>, lambda_http::http::Error> {
        let mut builder = Response::builder().status(self.status_code);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Body::Text(self.body))
    }
}

#[derive(Serialize)]
struct BIds<'a> {
    b_ids: &'a [i64],
}

/// `{"b_ids":[...]}`, made safe to embed in HTML.
pub fn encode_body(ids: &[i64]) -> Result<String> {
    let raw = serde_json::to_string(&BIds { b_ids: ids })
        .map_err(|e| AuroraError::Serialize(e.to_string()))?;
    Ok(html_escape(&raw))
}

/// Escape `<`, `>`, `&`, U+2028 and U+2029 inside already-encoded JSON.
pub fn html_escape(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
