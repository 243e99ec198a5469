//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus with a publication log

mod in_memory;

pub use in_memory::InMemoryEventBus;
