use crate::event::Event;
use crate::source::SourceId;
use std::sync::{Arc, Weak};

/// Receiver of events dispatched by an [`crate::EventSource`].
///
/// Any `Fn(&mut Event<T>)` closure that is `Send + Sync` is a listener.
pub trait EventListener<T>: Send + Sync {
    fn on_event(&self, event: &mut Event<T>);

    /// The event source this listener stands for, if it is one.
    ///
    /// Sources never receive events they originated themselves.
    fn source_id(&self) -> Option<SourceId> {
        None
    }
}

impl<T, F> EventListener<T> for F
where
    F: Fn(&mut Event<T>) + Send + Sync,
{
    fn on_event(&self, event: &mut Event<T>) {
        self(event);
    }
}

/// Shared, type-erased listener as stored by an [`crate::EventSource`].
pub type SharedListener<T> = Arc<dyn EventListener<T>>;

/// Weak counterpart of [`SharedListener`], used to remember delivered listeners.
pub(crate) type WeakListener<T> = Weak<dyn EventListener<T>>;

/// Address of a listener allocation, used as its identity.
pub(crate) fn listener_key<T>(listener: &SharedListener<T>) -> usize {
    Arc::as_ptr(listener).cast::<()>() as usize
}
