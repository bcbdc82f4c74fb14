use crate::listener::{SharedListener, WeakListener, listener_key};
use crate::source::{EventSource, SourceAnchor, SourceId};
use chrono::{DateTime, Utc};
use fxhash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Hierarchical,
    Direct,
}

/// Envelope for one firing of a notification.
///
/// A hierarchical event remembers which listeners and parent sources it has
/// already reached, so firing the same instance along several paths delivers
/// it at most once per listener and once per parent.
///
/// The event holds weak handles to everything it has reached. They keep the
/// allocations, and with them the identities, from being reused while the
/// event is alive, without keeping the listeners or sources themselves alive.
#[derive(Debug)]
pub struct Event<T> {
    kind: u32,
    payload: T,
    delivery: Delivery,
    pub(crate) source: Option<SourceAnchor<T>>,
    timestamp: DateTime<Utc>,
    pub(crate) stopped: bool,
    pub(crate) notified_listeners: FxHashMap<usize, WeakListener<T>>,
    pub(crate) notified_parents: FxHashMap<SourceId, SourceAnchor<T>>,
}

impl<T> Event<T> {
    /// Creates an event that propagates to parent sources before local dispatch.
    pub fn new(kind: u32, payload: T) -> Self {
        Self::with_delivery(kind, payload, Delivery::Hierarchical)
    }

    /// Creates a payload-only event.
    ///
    /// It reaches exactly the local listeners of the source it is fired on,
    /// with no source binding, no parent propagation and no de-duplication.
    pub fn direct(kind: u32, payload: T) -> Self {
        Self::with_delivery(kind, payload, Delivery::Direct)
    }

    fn with_delivery(kind: u32, payload: T, delivery: Delivery) -> Self {
        Self {
            kind,
            payload,
            delivery,
            source: None,
            timestamp: Utc::now(),
            stopped: false,
            notified_listeners: FxHashMap::default(),
            notified_parents: FxHashMap::default(),
        }
    }

    /// Application-defined type tag.
    pub const fn kind(&self) -> u32 {
        self.kind
    }

    pub const fn payload(&self) -> &T {
        &self.payload
    }

    pub const fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// The source the event was first fired on; unset until then.
    pub fn source(&self) -> Option<SourceId> {
        self.source.as_ref().map(SourceId::of)
    }

    /// Returns `true` if the event was first fired on `source`.
    pub fn is_from(&self, source: &EventSource<T>) -> bool
    where
        T: 'static,
    {
        self.source() == Some(source.id())
    }

    /// Creation time.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn is_hierarchical(&self) -> bool {
        matches!(self.delivery, Delivery::Hierarchical)
    }

    /// Skips the remaining listeners of the source currently dispatching.
    ///
    /// Sources that already delivered the event are unaffected, and so are
    /// sources further down the firing chain.
    pub const fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Returns `true` once `listener` has received this event.
    pub fn was_delivered_to(&self, listener: &SharedListener<T>) -> bool {
        self.notified_listeners.contains_key(&listener_key(listener))
    }

    /// Number of parent sources the event was propagated to.
    pub fn notified_parent_count(&self) -> usize {
        self.notified_parents.len()
    }
}
