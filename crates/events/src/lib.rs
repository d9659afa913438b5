//! Event plumbing for the entry engine: event contract, in-process pub/sub,
//! and the decide-then-evolve execution helper.

pub mod bus;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
