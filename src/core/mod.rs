//! Core infrastructure - decode workers, timers, events
//!
//! Independent of the UI toolkit; the strip engine is built on top.

pub mod debounce;
pub mod event_bus;
pub mod strip_events;
pub mod workers;

pub use debounce::Debouncer;
pub use event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use strip_events::{CurrentItemChangedEvent, ViewStateChangedEvent};
pub use workers::Workers;
