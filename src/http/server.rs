//! Data API server.
//!
//! # Responsibilities
//! - Build the Axum app serving `/handlers/{handler_id}/...`
//! - Resolve each call through the resource router
//! - Look the handler up in the injected registry
//! - Run the matching accessor and map its outcome to an HTTP response
//! - Record per-call logs and metrics

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::observability::metrics;
use crate::registry::{Handler, HandlerRegistry};
use crate::resource::{read, write, ResourceError, ResourceResult};
use crate::routing::{RequestResource, Resource, ResourceRouter, ResponseResource, RouterError};

/// Largest scalar value (status, header, cookie) accepted on a write.
const MAX_VALUE_SIZE: usize = 64 * 1024;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub registry: HandlerRegistry,
    pub router: Arc<ResourceRouter>,
}

/// HTTP server for the data API.
pub struct DataServer {
    router: Router,
    registry: HandlerRegistry,
}

impl DataServer {
    /// Create a server over the given registry.
    pub fn new(registry: HandlerRegistry) -> Result<Self, RouterError> {
        let state = AppState {
            registry: registry.clone(),
            router: Arc::new(ResourceRouter::new()?),
        };
        Ok(Self {
            router: Self::build_router(state),
            registry,
        })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum app, for embedding or driving in tests.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Data API server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Data API server stopped");
        Ok(())
    }
}

/// Single entry for every data API call.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let Some(route) = state.router.resolve(&method, &path) else {
        tracing::debug!(method = %method, path = %path, "No route matched");
        return (StatusCode::NOT_FOUND, "no route").into_response();
    };

    let side = route.resource.side();
    let category = route.resource.category();
    let outcome = match route.resource {
        Resource::Request(resource) => {
            read_request_resources(&state.registry, &route.handler_id, &resource)
        }
        Resource::Response(resource) => {
            write_response_resources(
                &state.registry,
                &route.handler_id,
                &resource,
                request.into_body(),
            )
            .await
        }
    };

    match outcome {
        Ok(response) => {
            tracing::debug!(
                handler_id = %route.handler_id,
                side,
                resource = %route.resource_path,
                "Resource served"
            );
            metrics::record_request(side, category, "ok");
            response
        }
        Err(err) => {
            match &err {
                ResourceError::Transport(_) => tracing::warn!(
                    handler_id = %route.handler_id,
                    side,
                    resource = %route.resource_path,
                    error = %err,
                    "Resource transfer failed"
                ),
                _ => tracing::debug!(
                    handler_id = %route.handler_id,
                    side,
                    resource = %route.resource_path,
                    error = %err,
                    "Resource unavailable"
                ),
            }
            metrics::record_request(side, category, err.outcome());
            err.into_response()
        }
    }
}

fn lookup(registry: &HandlerRegistry, handler_id: &str) -> ResourceResult<Arc<Handler>> {
    registry
        .get(handler_id)
        .ok_or_else(|| ResourceError::HandlerNotFound(handler_id.to_owned()))
}

/// Serve one request-side resource of a registered handler.
pub fn read_request_resources(
    registry: &HandlerRegistry,
    handler_id: &str,
    resource: &RequestResource,
) -> ResourceResult<Response> {
    let handler = lookup(registry, handler_id)?;
    let req = handler.request();

    let body = match resource {
        RequestResource::Method => Body::from(read::method(req).as_str().to_owned()),
        RequestResource::Host => Body::from(read::host(req)),
        RequestResource::Path => Body::from(read::path(req).to_owned()),
        RequestResource::Match(name) => Body::from(read::route_match(req, name)?.to_owned()),
        RequestResource::Param(name) => Body::from(read::param(req, name)?),
        RequestResource::Header(name) => {
            Body::from(Bytes::copy_from_slice(read::header(req, name)?.as_bytes()))
        }
        RequestResource::Cookie(name) => Body::from(read::cookie(req, name)?),
        RequestResource::Form(name) => Body::from(read::form(req, name)?.to_owned()),
        RequestResource::FileName(name) => Body::from(read::file_name(req, name)?.to_owned()),
        RequestResource::FileContent(name) => Body::from(read::file_content(req, name)?),
        RequestResource::Body => Body::from(read::body(req)),
    };
    Ok(Response::new(body))
}

/// Apply one response-side write to a registered handler.
pub async fn write_response_resources(
    registry: &HandlerRegistry,
    handler_id: &str,
    resource: &ResponseResource,
    payload: Body,
) -> ResourceResult<Response> {
    let handler = lookup(registry, handler_id)?;
    let res = handler.response();

    match resource {
        ResponseResource::Status => write::status(res, &read_value(payload).await?)?,
        ResponseResource::Header(name) => write::header(res, name, &read_value(payload).await?)?,
        ResponseResource::Cookie(name) => write::cookie(res, name, &read_value(payload).await?)?,
        ResponseResource::Body => write::body(res, payload).await?,
        ResponseResource::Stream => write::stream(res, payload).await?,
    }
    Ok(StatusCode::OK.into_response())
}

/// Collect a scalar write payload. Oversized values are malformed input;
/// only a failing body is a transport error.
async fn read_value(payload: Body) -> ResourceResult<Bytes> {
    let mut chunks = payload.into_data_stream();
    let mut value = Vec::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| ResourceError::Transport(std::io::Error::other(e)))?;
        if value.len() + chunk.len() > MAX_VALUE_SIZE {
            return Err(ResourceError::MalformedInput(format!(
                "value exceeds {} KiB",
                MAX_VALUE_SIZE / 1024
            )));
        }
        value.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::InboundRequest;
    use crate::http::response::{PendingResponse, ResponseSink};
    use std::collections::HashMap;
    use tower::ServiceExt;

    const ID: &str = "HANDLER_TEST";

    fn register(registry: &HandlerRegistry) -> (Arc<Handler>, PendingResponse) {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri("http://www.example.com/this/is/a/test?with=params")
            .header("A-Header", "With-Value")
            .header("Cookie", "A-Cookie=With-Value")
            .body(())
            .unwrap()
            .into_parts();
        let request = InboundRequest::from_parts(
            parts,
            Bytes::from_static(b"This is a body content for testing purposes"),
        )
        .with_matches(HashMap::from([("foo".to_string(), "bar".to_string())]));
        let (sink, pending) = ResponseSink::channel();
        let handler = Arc::new(Handler::new(ID, request, sink));
        registry.add(handler.clone());
        (handler, pending)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: &'static str) -> (StatusCode, Bytes) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_reads() {
        let server = DataServer::new(HandlerRegistry::new()).unwrap();
        let _handler = register(server.registry());
        let app = server.app();

        let cases = [
            ("method", "POST"),
            ("host", "www.example.com"),
            ("path", "/this/is/a/test"),
            ("params/with", "params"),
            ("headers/A-Header", "With-Value"),
            ("cookies/A-Cookie", "With-Value"),
            ("matches/foo", "bar"),
            ("body", "This is a body content for testing purposes"),
        ];
        for (resource, expected) in cases {
            let (status, body) =
                call(&app, "GET", &format!("/handlers/{ID}/request/{resource}"), "").await;
            assert_eq!(status, StatusCode::OK, "{resource}");
            assert_eq!(body, expected, "{resource}");
        }
    }

    #[tokio::test]
    async fn test_not_found_outcomes_are_distinct() {
        let server = DataServer::new(HandlerRegistry::new()).unwrap();
        let _handler = register(server.registry());
        let app = server.app();

        let (status, body) = call(&app, "GET", "/handlers/MISSING/request/method", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "handler not found: MISSING");

        let (status, body) =
            call(&app, "GET", &format!("/handlers/{ID}/request/headers/Other-Header"), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "resource not found: header Other-Header");

        let (status, body) =
            call(&app, "PUT", &format!("/handlers/{ID}/request/headers/A-Header"), "x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "no route");
    }

    #[tokio::test]
    async fn test_writes() {
        let server = DataServer::new(HandlerRegistry::new()).unwrap();
        let (handler, pending) = register(server.registry());
        let app = server.app();

        let (status, _) = call(&app, "PUT", &format!("/handlers/{ID}/response/status"), "500").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(handler.response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) =
            call(&app, "PUT", &format!("/handlers/{ID}/response/headers/X-Out"), "yes").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            call(&app, "PUT", &format!("/handlers/{ID}/response/cookies/A-Cookie"), "v").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "PUT", &format!("/handlers/{ID}/response/body"), "done").await;
        assert_eq!(status, StatusCode::OK);

        server.registry().remove(ID);
        handler.response().finish();

        let response = pending.into_response().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-out"], "yes");
        assert_eq!(response.headers()["set-cookie"], "A-Cookie=v");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "done");
    }

    #[tokio::test]
    async fn test_oversized_value_is_bad_request() {
        let server = DataServer::new(HandlerRegistry::new()).unwrap();
        let (handler, _pending) = register(server.registry());
        let app = server.app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/handlers/{ID}/response/headers/X-Big"))
                    .body(Body::from(vec![b'a'; 70_000]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(handler.response().headers().get("x-big").is_none());

        let (status, _) =
            call(&app, "PUT", &format!("/handlers/{ID}/response/headers/X-Small"), "ok").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_status_is_bad_request() {
        let server = DataServer::new(HandlerRegistry::new()).unwrap();
        let (handler, _pending) = register(server.registry());
        let app = server.app();

        let (status, _) =
            call(&app, "PUT", &format!("/handlers/{ID}/response/status"), "teapot").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(handler.response().status(), StatusCode::OK);
    }
}
