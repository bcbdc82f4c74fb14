//! # Events
//!
//! Synchronous, hierarchical event propagation.
//!
//! ## Overview
//!
//! * An [`EventSource`] owns an ordered list of [`EventListener`]s and may point
//!   at a parent source.
//! * Firing an [`Event`] notifies the parent chain first, then the local
//!   listeners, all on the caller's thread.
//! * Each event records where it has been delivered, so re-firing it along
//!   another path (e.g. a shared ancestor in a diamond) never delivers twice.
//! * A listener can stop propagation; this only skips the remaining listeners
//!   of the source currently dispatching.
//!
//! # Example
//!
//! ```rust
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//! use strata_events::{Event, EventSource};
//!
//! let root = EventSource::<&str>::new();
//! let child = EventSource::with_parent(&root);
//!
//! let order = Arc::new(Mutex::new(Vec::new()));
//! let log = Arc::clone(&order);
//! root.subscribe(move |_| log.lock().push("root"));
//! let log = Arc::clone(&order);
//! child.subscribe(move |_| log.lock().push("child"));
//!
//! child.notify(&mut Event::new(1, "saved"));
//! assert_eq!(*order.lock(), ["root", "child"]);
//! ```

mod error;
mod event;
mod listener;
mod source;

pub use error::{EventError, EventErrorExt};
pub use event::Event;
pub use listener::{EventListener, SharedListener};
pub use source::{EventSource, SourceId};
