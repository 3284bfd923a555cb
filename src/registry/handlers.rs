//! Concurrent map of in-flight handlers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::observability::metrics;
use crate::registry::Handler;

/// Registry of handlers keyed by id.
///
/// Cloning yields another view of the same map.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<Handler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handler, replacing any previous entry with the same id.
    pub fn add(&self, handler: Arc<Handler>) {
        let id = handler.id().to_owned();
        let count = {
            let mut map = self.inner.write();
            map.insert(id.clone(), handler);
            // Set under the lock so the gauge never lags a concurrent writer.
            metrics::record_registered_handlers(map.len());
            map.len()
        };
        tracing::debug!(handler_id = %id, registered = count, "Handler added");
    }

    /// Remove a handler. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        let (removed, count) = {
            let mut map = self.inner.write();
            let removed = map.remove(id).is_some();
            if removed {
                metrics::record_registered_handlers(map.len());
            }
            (removed, map.len())
        };
        if removed {
            tracing::debug!(handler_id = %id, registered = count, "Handler removed");
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Handler>> {
        self.inner.read().get(id).cloned()
    }

    /// Snapshot of the registered ids, in no particular order.
    pub fn list_ids(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::InboundRequest;
    use crate::http::response::ResponseSink;
    use axum::body::Bytes;
    use axum::http::Request;
    use ::metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::sync::atomic::{AtomicU64, Ordering};

    fn handler(id: &str) -> Arc<Handler> {
        let (parts, _) = Request::builder()
            .uri(format!("/items/{id}"))
            .body(())
            .unwrap()
            .into_parts();
        let (sink, _pending) = ResponseSink::channel();
        Arc::new(Handler::new(id, InboundRequest::from_parts(parts, Bytes::new()), sink))
    }

    #[test]
    fn test_add_get_remove() {
        let registry = HandlerRegistry::new();
        assert!(registry.get("HANDLER_1").is_none());

        let h = handler("HANDLER_1");
        registry.add(h.clone());
        let found = registry.get("HANDLER_1").unwrap();
        assert!(Arc::ptr_eq(&found, &h));

        registry.remove("HANDLER_1");
        assert!(registry.get("HANDLER_1").is_none());

        // Removing again is a no-op.
        registry.remove("HANDLER_1");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_overwrites() {
        let registry = HandlerRegistry::new();
        let first = handler("H");
        let second = handler("H");
        registry.add(first);
        registry.add(second.clone());

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("H").unwrap(), &second));
    }

    #[test]
    fn test_list_ids() {
        let registry = HandlerRegistry::new();
        assert!(registry.list_ids().is_empty());

        registry.add(handler("a"));
        registry.add(handler("b"));
        let mut ids = registry.list_ids();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = HandlerRegistry::new();
        let view = registry.clone();
        registry.add(handler("shared"));
        assert!(view.get("shared").is_some());
    }

    struct GaugeRecorder(Arc<AtomicU64>);

    impl Recorder for GaugeRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::from_arc(self.0.clone())
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_gauge_tracks_registered_count() {
        let value = Arc::new(AtomicU64::new(0));
        let recorder = GaugeRecorder(value.clone());
        let gauge = || f64::from_bits(value.load(Ordering::Acquire));

        ::metrics::with_local_recorder(&recorder, || {
            let registry = HandlerRegistry::new();
            registry.add(handler("a"));
            registry.add(handler("b"));
            assert_eq!(gauge(), 2.0);

            registry.add(handler("a"));
            assert_eq!(gauge(), 2.0);

            registry.remove("a");
            assert_eq!(gauge(), 1.0);

            registry.remove("missing");
            assert_eq!(gauge(), 1.0);
            assert_eq!(gauge(), registry.len() as f64);
        });
    }

    #[test]
    fn test_concurrent_access() {
        let registry = HandlerRegistry::new();
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let id = format!("T{t}_{i}");
                        registry.add(handler(&id));
                        let found = registry.get(&id).expect("just added");
                        assert_eq!(found.id(), id);
                        assert_eq!(found.request().uri().path(), format!("/items/{id}"));
                        if i % 2 == 0 {
                            registry.remove(&id);
                            assert!(registry.get(&id).is_none());
                        }
                        let _ = registry.list_ids();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(registry.len(), 8 * 100);
    }
}
