//! Event sources and hierarchical dispatch.

use crate::error::EventError;
use crate::event::Event;
use crate::listener::{EventListener, SharedListener, listener_key};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Stable identity of an [`EventSource`], valid while the source is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    pub(crate) fn of<T>(anchor: &SourceAnchor<T>) -> Self {
        Self(Weak::as_ptr(anchor).cast::<()>() as usize)
    }
}

/// Weak handle an [`Event`] keeps to the sources it was fired on or reached.
pub(crate) type SourceAnchor<T> = Weak<SourceInner<T>>;

pub(crate) struct SourceInner<T> {
    listeners: ArcSwap<Vec<SharedListener<T>>>,
    parent: RwLock<Option<Weak<SourceInner<T>>>>,
}

/// A node of the event hierarchy.
///
/// Handles are cheap to clone and share one listener list. The list is
/// copy-on-write: every dispatch iterates over the snapshot taken when it
/// started, so listeners may add or remove listeners while being notified.
///
/// The parent link is weak and one-way; a parent knows nothing about its
/// children, and several sources may share a parent.
pub struct EventSource<T> {
    inner: Arc<SourceInner<T>>,
}

impl<T: 'static> EventSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SourceInner {
                listeners: ArcSwap::from_pointee(Vec::new()),
                parent: RwLock::new(None),
            }),
        }
    }

    /// Creates a source whose events propagate to `parent` first.
    #[must_use]
    pub fn with_parent(parent: &Self) -> Self {
        let source = Self::new();
        source.set_parent(Some(parent));
        source
    }

    #[must_use]
    pub fn id(&self) -> SourceId {
        SourceId(Arc::as_ptr(&self.inner).cast::<()>() as usize)
    }

    /// Replaces the parent link. `None` detaches the source.
    pub fn set_parent(&self, parent: Option<&Self>) {
        *self.inner.parent.write() = parent.map(|p| Arc::downgrade(&p.inner));
    }

    /// The parent, if one is set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner.parent.read().as_ref().and_then(Weak::upgrade).map(|inner| Self { inner })
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.load().len()
    }

    /// Snapshot of the listeners in dispatch order.
    #[must_use]
    pub fn listeners(&self) -> Vec<SharedListener<T>> {
        Vec::clone(&self.inner.listeners.load())
    }

    /// Appends a listener.
    pub fn add_listener(&self, listener: SharedListener<T>) {
        self.inner.listeners.rcu(|current| {
            let mut next = (**current).clone();
            next.push(Arc::clone(&listener));
            next
        });
    }

    /// Appends a closure and returns the handle needed to remove it again.
    pub fn subscribe<F>(&self, listener: F) -> SharedListener<T>
    where
        F: Fn(&mut Event<T>) + Send + Sync + 'static,
    {
        let listener: SharedListener<T> = Arc::new(listener);
        self.add_listener(Arc::clone(&listener));
        listener
    }

    /// Inserts a listener at `index`, shifting later ones back.
    ///
    /// # Errors
    /// Returns [`EventError::InvalidArgument`] if `index` exceeds the listener count.
    pub fn insert_listener(&self, index: usize, listener: SharedListener<T>) -> Result<(), EventError> {
        let mut outcome = Ok(());
        self.inner.listeners.rcu(|current| {
            let mut next = (**current).clone();
            if index > next.len() {
                outcome = Err(EventError::InvalidArgument {
                    message: format!("index {index} is out of bounds").into(),
                    context: Some(format!("{} listeners", next.len()).into()),
                });
            } else {
                outcome = Ok(());
                next.insert(index, Arc::clone(&listener));
            }
            next
        });
        outcome
    }

    /// Removes the first occurrence of `listener`. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &SharedListener<T>) -> bool {
        let key = listener_key(listener);
        let mut removed = false;
        self.inner.listeners.rcu(|current| {
            let mut next = (**current).clone();
            removed = next.iter().position(|l| listener_key(l) == key).is_some_and(|at| {
                next.remove(at);
                true
            });
            next
        });
        removed
    }

    /// Fires `event`, propagating it to the parent chain before local dispatch.
    pub fn notify(&self, event: &mut Event<T>) {
        self.notify_with(event, true);
    }

    /// Fires `event` on this source.
    ///
    /// For a hierarchical event the source is bound to this node if unset.
    /// Unless `propagate_to_parent` is `false`, the parent is notified first,
    /// provided it is neither this node nor the event's source and has not
    /// seen the event yet. Local listeners then run in order, skipping the
    /// event's source and every listener that already received the event,
    /// until one of them stops propagation.
    ///
    /// A direct event simply reaches every local listener.
    pub fn notify_with(&self, event: &mut Event<T>, propagate_to_parent: bool) {
        if !event.is_hierarchical() {
            for listener in self.inner.listeners.load_full().iter() {
                listener.on_event(event);
            }
            return;
        }

        let id = self.id();
        let source = SourceId::of(event.source.get_or_insert_with(|| Arc::downgrade(&self.inner)));

        if propagate_to_parent && let Some(parent) = self.parent() {
            let parent_id = parent.id();
            if parent_id != id
                && parent_id != source
                && let Entry::Vacant(slot) = event.notified_parents.entry(parent_id)
            {
                slot.insert(Arc::downgrade(&parent.inner));
                trace!(kind = event.kind(), "Propagating event to parent source");
                parent.notify(event);
            }
        }

        self.dispatch_local(event, source);
    }

    fn dispatch_local(&self, event: &mut Event<T>, source: SourceId) {
        let listeners = self.inner.listeners.load_full();
        let inherited = std::mem::take(&mut event.stopped);

        for listener in listeners.iter() {
            if listener.source_id() == Some(source) {
                continue;
            }
            match event.notified_listeners.entry(listener_key(listener)) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(Arc::downgrade(listener));
                },
            }
            listener.on_event(event);
            if event.stopped {
                trace!(kind = event.kind(), "Event propagation stopped by listener");
                break;
            }
        }

        event.stopped |= inherited;
    }

    /// Forwards every event `source` receives to `target`.
    ///
    /// The forwarding listener holds `target` weakly and is returned so it can
    /// be passed to [`EventSource::remove_listener`] later.
    ///
    /// # Errors
    /// Returns [`EventError::InvalidArgument`] if both handles are the same source.
    pub fn relay(source: &Self, target: &Self) -> Result<SharedListener<T>, EventError> {
        if source.ptr_eq(target) {
            return Err(EventError::InvalidArgument {
                message: "a source cannot relay to itself".into(),
                context: None,
            });
        }
        let listener: SharedListener<T> = Arc::new(Relay { target: Arc::downgrade(&target.inner) });
        source.add_listener(Arc::clone(&listener));
        Ok(listener)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: 'static> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("id", &self.id())
            .field("listeners", &self.listener_count())
            .field("has_parent", &self.parent().is_some())
            .finish()
    }
}

impl<T: 'static> EventListener<T> for EventSource<T> {
    fn on_event(&self, event: &mut Event<T>) {
        self.notify(event);
    }

    fn source_id(&self) -> Option<SourceId> {
        Some(self.id())
    }
}

struct Relay<T> {
    target: Weak<SourceInner<T>>,
}

impl<T: 'static> EventListener<T> for Relay<T> {
    fn on_event(&self, event: &mut Event<T>) {
        match self.target.upgrade() {
            Some(inner) => EventSource { inner }.notify(event),
            None => trace!(kind = event.kind(), "Relay target dropped, event not forwarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn counter(source: &EventSource<()>) -> Arc<Mutex<usize>> {
        let hits = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&hits);
        source.subscribe(move |_| *seen.lock() += 1);
        hits
    }

    #[test]
    fn source_is_bound_on_first_notify() {
        let source = EventSource::<()>::new();
        let mut event = Event::new(1, ());
        assert!(event.source().is_none());

        source.notify(&mut event);
        assert!(event.is_from(&source));
    }

    #[test]
    fn parent_is_weak() {
        let parent = EventSource::<()>::new();
        let child = EventSource::with_parent(&parent);
        assert!(child.parent().is_some_and(|p| p.ptr_eq(&parent)));

        drop(parent);
        assert!(child.parent().is_none());
    }

    #[test]
    fn self_parent_is_ignored() {
        let source = EventSource::<()>::new();
        source.set_parent(Some(&source));
        let hits = counter(&source);

        let mut event = Event::new(0, ());
        source.notify(&mut event);
        assert_eq!(*hits.lock(), 1);
        assert_eq!(event.notified_parent_count(), 0);
    }

    #[test]
    fn parent_cycles_terminate() {
        let a = EventSource::<()>::new();
        let b = EventSource::with_parent(&a);
        let c = EventSource::with_parent(&b);
        a.set_parent(Some(&c));
        let hits = [counter(&a), counter(&b), counter(&c)];

        let mut event = Event::new(0, ());
        a.notify(&mut event);
        assert!(hits.iter().all(|h| *h.lock() == 1));
    }

    #[test]
    fn propagation_can_be_disabled() {
        let parent = EventSource::<()>::new();
        let child = EventSource::with_parent(&parent);
        let parent_hits = counter(&parent);
        let child_hits = counter(&child);

        child.notify_with(&mut Event::new(0, ()), false);
        assert_eq!(*parent_hits.lock(), 0);
        assert_eq!(*child_hits.lock(), 1);
    }

    #[test]
    fn refired_event_reaches_listener_subscribed_after_removal() {
        let source = EventSource::<()>::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&hits);
        let first = source.subscribe(move |_| log.lock().push("first"));
        let mut event = Event::new(0, ());
        source.notify(&mut event);

        assert!(source.remove_listener(&first));
        drop(first);

        let log = Arc::clone(&hits);
        let second = source.subscribe(move |_| log.lock().push("second"));
        source.notify(&mut event);

        assert_eq!(*hits.lock(), ["first", "second"]);
        assert!(event.was_delivered_to(&second));
    }

    #[test]
    fn dropped_origin_does_not_shadow_new_sources() {
        let mut event = Event::new(0, ());
        let origin = EventSource::<()>::new();
        origin.notify(&mut event);
        let origin_id = event.source();
        drop(origin);

        let parent = EventSource::<()>::new();
        let child = EventSource::with_parent(&parent);
        let parent_hits = counter(&parent);
        let child_hits = counter(&child);
        child.notify(&mut event);

        assert_ne!(Some(parent.id()), origin_id);
        assert_ne!(Some(child.id()), origin_id);
        assert_eq!(*parent_hits.lock(), 1);
        assert_eq!(*child_hits.lock(), 1);
        assert_eq!(event.source(), origin_id);
    }

    #[test]
    fn relay_holds_target_weakly() {
        let source = EventSource::<()>::new();
        let target = EventSource::<()>::new();
        let hits = counter(&target);
        EventSource::relay(&source, &target).unwrap();

        source.notify(&mut Event::new(0, ()));
        assert_eq!(*hits.lock(), 1);

        drop(target);
        source.notify(&mut Event::new(0, ()));
        assert_eq!(*hits.lock(), 1);
    }
}
