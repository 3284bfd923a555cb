//! Outbound response sink.
//!
//! # Responsibilities
//! - Accumulate status, headers and cookies written by the external process
//! - Commit the head on the first body write and hand it to the waiting
//!   delegating component
//! - Feed body chunks to the client as they are written
//!
//! # Design Decisions
//! - Head writes after commit are rejected, not silently dropped
//! - The body is a bounded channel, so a slow client applies backpressure to
//!   the writer instead of buffering in memory
//! - Dropping the sink commits whatever head it holds

use std::io;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::resource::{ResourceError, ResourceResult};

/// Body chunks in flight between a writer and the client.
const BODY_CHANNEL_CAPACITY: usize = 16;

pub(crate) type BodyChunk = Result<Bytes, io::Error>;

#[derive(Debug)]
struct Head {
    status: StatusCode,
    headers: HeaderMap,
    committed: bool,
    commit_tx: Option<oneshot::Sender<(StatusCode, HeaderMap)>>,
}

/// The response half of a [`Handler`](crate::registry::Handler).
#[derive(Debug)]
pub struct ResponseSink {
    head: Mutex<Head>,
    body_tx: Mutex<Option<mpsc::Sender<BodyChunk>>>,
}

/// Receiving end of a [`ResponseSink`], awaited by the delegating component.
#[derive(Debug)]
pub struct PendingResponse {
    commit_rx: oneshot::Receiver<(StatusCode, HeaderMap)>,
    body_rx: mpsc::Receiver<BodyChunk>,
}

impl ResponseSink {
    /// Create a sink and the pending response it feeds.
    pub fn channel() -> (Self, PendingResponse) {
        let (commit_tx, commit_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);

        let sink = Self {
            head: Mutex::new(Head {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                committed: false,
                commit_tx: Some(commit_tx),
            }),
            body_tx: Mutex::new(Some(body_tx)),
        };
        (sink, PendingResponse { commit_rx, body_rx })
    }

    /// Current status of the response.
    pub fn status(&self) -> StatusCode {
        self.head.lock().status
    }

    /// Snapshot of the response headers.
    pub fn headers(&self) -> HeaderMap {
        self.head.lock().headers.clone()
    }

    /// Whether the head has already been sent.
    pub fn is_committed(&self) -> bool {
        self.head.lock().committed
    }

    pub fn set_status(&self, status: StatusCode) -> ResourceResult<()> {
        let mut head = self.head.lock();
        ensure_open(&head)?;
        head.status = status;
        Ok(())
    }

    /// Add a header value, keeping earlier values for the same name.
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) -> ResourceResult<()> {
        let mut head = self.head.lock();
        ensure_open(&head)?;
        head.headers.append(name, value);
        Ok(())
    }

    /// Send the head to the client if it has not been sent yet.
    pub fn commit(&self) {
        let mut head = self.head.lock();
        if head.committed {
            return;
        }
        head.committed = true;
        if let Some(tx) = head.commit_tx.take() {
            let _ = tx.send((head.status, head.headers.clone()));
        }
    }

    /// Commit the head and close the body.
    pub fn finish(&self) {
        self.commit();
        self.body_tx.lock().take();
    }

    /// Commit the head and return a sender for body chunks.
    pub(crate) fn body_writer(&self) -> ResourceResult<mpsc::Sender<BodyChunk>> {
        let tx = self
            .body_tx
            .lock()
            .clone()
            .ok_or_else(|| closed("response already finished"))?;
        self.commit();
        Ok(tx)
    }
}

impl Drop for ResponseSink {
    fn drop(&mut self) {
        self.commit();
    }
}

impl PendingResponse {
    /// Wait for the head and build a response streaming the body.
    pub async fn into_response(self) -> Response {
        let (status, headers) = match self.commit_rx.await {
            Ok(head) => head,
            Err(_) => {
                tracing::warn!("Response sink vanished before commit");
                (StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new())
            }
        };

        let chunks = futures_util::stream::unfold(self.body_rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        });

        let mut response = Response::new(Body::from_stream(chunks));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

fn ensure_open(head: &Head) -> ResourceResult<()> {
    // Out-of-order writes are the caller's fault, so they surface as 400.
    if head.committed {
        return Err(ResourceError::MalformedInput(
            "response already committed".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn closed(reason: &str) -> ResourceError {
    ResourceError::Transport(io::Error::new(io::ErrorKind::BrokenPipe, reason.to_string()))
}
