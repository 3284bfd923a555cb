//! Addressable request and response resources.

/// A readable piece of the stored request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResource {
    Method,
    Host,
    Path,
    Match(String),
    Param(String),
    Header(String),
    Cookie(String),
    Form(String),
    FileName(String),
    FileContent(String),
    Body,
}

/// A writable piece of the stored response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseResource {
    Status,
    Header(String),
    Cookie(String),
    Body,
    Stream,
}

/// A resolved resource, tagged with the side it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Request(RequestResource),
    Response(ResponseResource),
}

impl RequestResource {
    /// Category label for logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Host => "host",
            Self::Path => "path",
            Self::Match(_) => "matches",
            Self::Param(_) => "params",
            Self::Header(_) => "headers",
            Self::Cookie(_) => "cookies",
            Self::Form(_) => "form",
            Self::FileName(_) => "files.filename",
            Self::FileContent(_) => "files.content",
            Self::Body => "body",
        }
    }
}

impl ResponseResource {
    /// Category label for logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Header(_) => "headers",
            Self::Cookie(_) => "cookies",
            Self::Body => "body",
            Self::Stream => "stream",
        }
    }
}

impl Resource {
    pub fn side(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Request(r) => r.category(),
            Self::Response(r) => r.category(),
        }
    }
}

/// Entry kinds of the request-side dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadKind {
    Method,
    Host,
    Path,
    Match,
    Param,
    Header,
    Cookie,
    Form,
    FileName,
    FileContent,
    Body,
}

impl ReadKind {
    pub(crate) fn bind(self, name: String) -> RequestResource {
        match self {
            Self::Method => RequestResource::Method,
            Self::Host => RequestResource::Host,
            Self::Path => RequestResource::Path,
            Self::Match => RequestResource::Match(name),
            Self::Param => RequestResource::Param(name),
            Self::Header => RequestResource::Header(name),
            Self::Cookie => RequestResource::Cookie(name),
            Self::Form => RequestResource::Form(name),
            Self::FileName => RequestResource::FileName(name),
            Self::FileContent => RequestResource::FileContent(name),
            Self::Body => RequestResource::Body,
        }
    }
}

/// Entry kinds of the response-side dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Status,
    Header,
    Cookie,
    Body,
    Stream,
}

impl WriteKind {
    pub(crate) fn bind(self, name: String) -> ResponseResource {
        match self {
            Self::Status => ResponseResource::Status,
            Self::Header => ResponseResource::Header(name),
            Self::Cookie => ResponseResource::Cookie(name),
            Self::Body => ResponseResource::Body,
            Self::Stream => ResponseResource::Stream,
        }
    }
}

/// GET `/handlers/{handler_id}/request/...` entries.
pub(crate) const READ_ROUTES: &[(&str, ReadKind)] = &[
    ("method", ReadKind::Method),
    ("host", ReadKind::Host),
    ("path", ReadKind::Path),
    ("matches/{name}", ReadKind::Match),
    ("params/{name}", ReadKind::Param),
    ("headers/{name}", ReadKind::Header),
    ("cookies/{name}", ReadKind::Cookie),
    ("form/{name}", ReadKind::Form),
    ("files/{name}/filename", ReadKind::FileName),
    ("files/{name}/content", ReadKind::FileContent),
    ("body", ReadKind::Body),
];

/// PUT `/handlers/{handler_id}/response/...` entries.
pub(crate) const WRITE_ROUTES: &[(&str, WriteKind)] = &[
    ("status", WriteKind::Status),
    ("headers/{name}", WriteKind::Header),
    ("cookies/{name}", WriteKind::Cookie),
    ("body", WriteKind::Body),
    ("stream", WriteKind::Stream),
];
