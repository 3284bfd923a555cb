//! Request-side accessors.

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Method};

use crate::http::request::InboundRequest;
use crate::resource::{ResourceError, ResourceResult};

pub fn method(req: &InboundRequest) -> &Method {
    req.method()
}

/// Host the request was addressed to, port included when present.
///
/// Absolute-form targets win over the `Host` header.
pub fn host(req: &InboundRequest) -> String {
    if let Some(authority) = req.uri().authority() {
        return authority.as_str().to_owned();
    }
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Path component only, without the query string.
pub fn path(req: &InboundRequest) -> &str {
    req.uri().path()
}

/// First value of a header. Names match case-insensitively.
pub fn header<'a>(req: &'a InboundRequest, name: &str) -> ResourceResult<&'a HeaderValue> {
    req.headers()
        .get(name)
        .ok_or_else(|| ResourceError::not_found("header", name))
}

/// Value of the first cookie with the given name.
pub fn cookie(req: &InboundRequest, name: &str) -> ResourceResult<String> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .ok_or_else(|| ResourceError::not_found("cookie", name))
}

/// First value of a query parameter.
pub fn param(req: &InboundRequest, name: &str) -> ResourceResult<String> {
    let query = req.uri().query().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ResourceError::not_found("param", name))
}

/// First value of a decoded form field.
pub fn form<'a>(req: &'a InboundRequest, name: &str) -> ResourceResult<&'a str> {
    req.form_fields()
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| ResourceError::not_found("form field", name))
}

/// Variable captured by the route that delegated the request.
pub fn route_match<'a>(req: &'a InboundRequest, name: &str) -> ResourceResult<&'a str> {
    req.matches()
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ResourceError::not_found("match", name))
}

/// Original filename of an uploaded file.
pub fn file_name<'a>(req: &'a InboundRequest, name: &str) -> ResourceResult<&'a str> {
    req.files()
        .iter()
        .find(|f| f.field == name)
        .map(|f| f.filename.as_str())
        .ok_or_else(|| ResourceError::not_found("file", name))
}

/// Content of an uploaded file. Zero-length uploads yield an empty buffer.
pub fn file_content(req: &InboundRequest, name: &str) -> ResourceResult<Bytes> {
    req.files()
        .iter()
        .find(|f| f.field == name)
        .map(|f| f.content.clone())
        .ok_or_else(|| ResourceError::not_found("file", name))
}

pub fn body(req: &InboundRequest) -> Bytes {
    req.body().clone()
}
