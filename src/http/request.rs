//! Inbound request snapshot.
//!
//! # Responsibilities
//! - Capture method, target, headers and route matches of a delegated request
//! - Decode urlencoded and multipart bodies once, at intake
//! - Keep the raw body so it can be handed to the external process
//!
//! # Design Decisions
//! - The body is buffered at intake (bounded by `intake.max_body_size`) since
//!   form and multipart decoding consume it anyway
//! - Data API reads hand out `Bytes` clones, never copies
//! - Multipart parts with an empty filename are plain form fields

use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart};
use axum::http::{header, request::Parts, HeaderMap, Method, Request, Uri, Version};
use thiserror::Error;
use tower::{Layer, ServiceExt};

use crate::config::IntakeConfig;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Errors raised while turning a live request into an [`InboundRequest`].
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Body could not be read or exceeded the configured limit.
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// Multipart body could not be decoded.
    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

/// An uploaded file part of a multipart request.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name the file was uploaded under.
    pub field: String,
    /// Original filename reported by the client.
    pub filename: String,
    /// Content type of the part, if the client sent one.
    pub content_type: Option<String>,
    /// Raw file content.
    pub content: Bytes,
}

/// The request half of a [`Handler`](crate::registry::Handler).
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    matches: HashMap<String, String>,
    form: Vec<(String, String)>,
    files: Vec<FilePart>,
    body: Bytes,
}

impl InboundRequest {
    /// Consume a live request, decoding its body.
    ///
    /// `matches` are the variables captured by the route that delegated the
    /// request.
    pub async fn from_request(
        request: Request<Body>,
        matches: HashMap<String, String>,
        config: &IntakeConfig,
    ) -> Result<Self, IntakeError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, config.max_body_size)
            .await
            .map_err(IntakeError::Body)?;

        let mut inbound = Self::from_parts(parts, body).with_matches(matches);
        if inbound.has_content_type(MULTIPART_FORM_DATA) {
            inbound.decode_multipart().await?;
        }

        tracing::debug!(
            method = %inbound.method,
            path = %inbound.uri.path(),
            form_fields = inbound.form.len(),
            files = inbound.files.len(),
            "Request snapshot taken"
        );
        Ok(inbound)
    }

    /// Build a snapshot from already-read parts.
    ///
    /// Urlencoded bodies are decoded here; multipart bodies are only decoded
    /// by [`InboundRequest::from_request`].
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let mut inbound = Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            matches: HashMap::new(),
            form: Vec::new(),
            files: Vec::new(),
            body,
        };
        if inbound.has_content_type(FORM_URLENCODED) {
            inbound.form = url::form_urlencoded::parse(&inbound.body)
                .into_owned()
                .collect();
        }
        inbound
    }

    /// Attach the route variables of the delegating route.
    pub fn with_matches(mut self, matches: HashMap<String, String>) -> Self {
        self.matches = matches;
        self
    }

    /// Append a decoded form field.
    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    /// Append an uploaded file part.
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn matches(&self) -> &HashMap<String, String> {
        &self.matches
    }

    /// Decoded form fields in body order.
    pub fn form_fields(&self) -> &[(String, String)] {
        &self.form
    }

    /// Uploaded file parts in body order.
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    fn has_content_type(&self, expected: &str) -> bool {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    }

    async fn decode_multipart(&mut self) -> Result<(), IntakeError> {
        let mut request = Request::new(Body::from(self.body.clone()));
        *request.headers_mut() = self.headers.clone();

        // The body is already bounded; the extractor would otherwise apply
        // its own default limit.
        let decode = tower::service_fn(|request: Request<Body>| async move {
            let mut multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| IntakeError::Multipart(e.to_string()))?;

            let mut form = Vec::new();
            let mut files = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| IntakeError::Multipart(e.to_string()))?
            {
                let name = field.name().unwrap_or_default().to_owned();
                let filename = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| IntakeError::Multipart(e.to_string()))?;

                match filename {
                    Some(filename) if !filename.is_empty() => files.push(FilePart {
                        field: name,
                        filename,
                        content_type,
                        content,
                    }),
                    _ => form.push((name, String::from_utf8_lossy(&content).into_owned())),
                }
            }
            Ok::<_, IntakeError>((form, files))
        });

        let (form, files) = DefaultBodyLimit::disable()
            .layer(decode)
            .oneshot(request)
            .await?;
        self.form.extend(form);
        self.files.extend(files);
        Ok(())
    }
}
