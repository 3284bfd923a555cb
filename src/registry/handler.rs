//! A delegated request/response pair.

use uuid::Uuid;

use crate::http::request::InboundRequest;
use crate::http::response::ResponseSink;

/// One in-flight delegated request, addressed by its id.
#[derive(Debug)]
pub struct Handler {
    id: String,
    request: InboundRequest,
    response: ResponseSink,
}

impl Handler {
    pub fn new(id: impl Into<String>, request: InboundRequest, response: ResponseSink) -> Self {
        Self {
            id: id.into(),
            request,
            response,
        }
    }

    /// Generate a fresh opaque handler id.
    pub fn generate_id() -> String {
        format!("HANDLER_{}", Uuid::new_v4().simple())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request(&self) -> &InboundRequest {
        &self.request
    }

    pub fn response(&self) -> &ResponseSink {
        &self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_path_tokens() {
        let a = Handler::generate_id();
        let b = Handler::generate_id();
        assert_ne!(a, b);
        assert!(a.starts_with("HANDLER_"));
        assert!(!a.contains('/'));
    }
}
