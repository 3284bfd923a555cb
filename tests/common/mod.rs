//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use tokio::net::TcpListener;

use handler_data_api::config::IntakeConfig;
use handler_data_api::http::{InboundRequest, PendingResponse, ResponseSink};
use handler_data_api::{DataServer, Handler, HandlerRegistry, Shutdown};

/// A running data API bound to a loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: HandlerRegistry,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let registry = HandlerRegistry::new();
        let shutdown = Shutdown::new();

        let server = DataServer::new(registry.clone()).unwrap();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            registry,
            shutdown,
        }
    }

    /// URL of a resource of the given handler.
    pub fn url(&self, handler_id: &str, resource: &str) -> String {
        format!("http://{}/handlers/{}/{}", self.addr, handler_id, resource)
    }

    /// Do what the delegating component does: snapshot, bind a sink, register.
    pub async fn delegate(
        &self,
        request: Request<Body>,
        matches: &[(&str, &str)],
    ) -> (Arc<Handler>, PendingResponse) {
        let matches: HashMap<String, String> = matches
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let inbound = InboundRequest::from_request(request, matches, &IntakeConfig::default())
            .await
            .unwrap();
        let (sink, pending) = ResponseSink::channel();
        let handler = Arc::new(Handler::new(Handler::generate_id(), inbound, sink));
        self.registry.add(handler.clone());
        (handler, pending)
    }

    /// Do what the delegating component does once the external process exits.
    pub fn complete(&self, handler: &Handler) {
        self.registry.remove(handler.id());
        handler.response().finish();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
