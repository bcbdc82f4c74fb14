use parking_lot::Mutex;
use std::sync::Arc;
use strata_events::{Event, EventSource, SharedListener};

pub type TestEvent = Event<u32>;

/// Ordered record of which listener saw which event payload.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<(&'static str, u32)>>>);

impl Journal {
    /// Registers a listener on `source` that records `label`.
    pub fn listen(&self, source: &EventSource<u32>, label: &'static str) -> SharedListener<u32> {
        let entries = Arc::clone(&self.0);
        source.subscribe(move |event| entries.lock().push((label, *event.payload())))
    }

    /// Registers a listener that records `label` and then stops propagation.
    pub fn listen_and_stop(
        &self,
        source: &EventSource<u32>,
        label: &'static str,
    ) -> SharedListener<u32> {
        let entries = Arc::clone(&self.0);
        source.subscribe(move |event| {
            entries.lock().push((label, *event.payload()));
            event.stop_propagation();
        })
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.0.lock().iter().map(|(label, _)| *label).collect()
    }

    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.0.lock().iter().filter(|(l, _)| *l == label).count()
    }
}

/// Builds `child -> mid -> root` and returns `(root, mid, child)`.
#[must_use]
pub fn chain() -> (EventSource<u32>, EventSource<u32>, EventSource<u32>) {
    let root = EventSource::new();
    let mid = EventSource::with_parent(&root);
    let child = EventSource::with_parent(&mid);
    (root, mid, child)
}
