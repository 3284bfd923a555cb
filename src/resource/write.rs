//! Response-side mutators.

use std::io;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use futures_util::StreamExt;

use crate::http::response::{closed, ResponseSink};
use crate::resource::{ResourceError, ResourceResult};

/// Set the response status from a decimal code such as `404`.
///
/// Only final statuses are accepted; `1xx` codes are rejected.
pub fn status(res: &ResponseSink, value: &[u8]) -> ResourceResult<()> {
    let code = std::str::from_utf8(value)
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .and_then(|v| StatusCode::from_u16(v).ok())
        .filter(|code| !code.is_informational())
        .ok_or_else(|| malformed("status", value))?;
    res.set_status(code)
}

/// Add a response header.
pub fn header(res: &ResponseSink, name: &str, value: &[u8]) -> ResourceResult<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| malformed("header name", name.as_bytes()))?;
    let value = HeaderValue::from_bytes(value).map_err(|_| malformed("header value", value))?;
    res.append_header(name, value)
}

/// Add a `Set-Cookie` header for `name=value`.
pub fn cookie(res: &ResponseSink, name: &str, value: &[u8]) -> ResourceResult<()> {
    let invalid_name = name.is_empty()
        || name
            .bytes()
            .any(|b| b.is_ascii_whitespace() || b.is_ascii_control() || b == b'=' || b == b';');
    if invalid_name {
        return Err(malformed("cookie name", name.as_bytes()));
    }

    let value = std::str::from_utf8(value)
        .ok()
        .filter(|v| !v.contains(';'))
        .ok_or_else(|| malformed("cookie value", value))?;
    let cookie = HeaderValue::from_str(&format!("{name}={value}"))
        .map_err(|_| malformed("cookie value", value.as_bytes()))?;
    res.append_header(header::SET_COOKIE, cookie)
}

/// Copy the whole source into the response body as one write.
pub async fn body(res: &ResponseSink, source: Body) -> ResourceResult<()> {
    let content = axum::body::to_bytes(source, usize::MAX)
        .await
        .map_err(|e| ResourceError::Transport(io::Error::other(e)))?;

    let tx = res.body_writer()?;
    tx.send(Ok(content))
        .await
        .map_err(|_| closed("client disconnected"))
}

/// Forward the source into the response body chunk by chunk.
///
/// The head is committed before the first chunk is read, so unbounded
/// sources reach the client as they are produced. A failing source aborts
/// the client response as well.
pub async fn stream(res: &ResponseSink, source: Body) -> ResourceResult<()> {
    let tx = res.body_writer()?;
    let mut chunks = source.into_data_stream();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(chunk) => tx
                .send(Ok(chunk))
                .await
                .map_err(|_| closed("client disconnected"))?,
            Err(e) => {
                let err = io::Error::other(e);
                let _ = tx
                    .send(Err(io::Error::new(err.kind(), err.to_string())))
                    .await;
                return Err(ResourceError::Transport(err));
            }
        }
    }
    Ok(())
}

fn malformed(what: &str, value: &[u8]) -> ResourceError {
    ResourceError::MalformedInput(format!("invalid {what}: {:?}", String::from_utf8_lossy(value)))
}
