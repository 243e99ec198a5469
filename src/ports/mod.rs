//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `PathwayRepository` / `CycleRepository` / `ObjectiveRepository` /
//!   `UserRepository` - Predicate-style fetches
//! - `UnitOfWork` - Atomic save of one `ChangeSet`
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Time
//!
//! - `Clock` - Injectable source of the current instant

mod clock;
mod cycle_repository;
mod event_publisher;
mod event_subscriber;
mod objective_repository;
mod pathway_repository;
mod unit_of_work;
mod user_repository;

pub use clock::Clock;
pub use cycle_repository::CycleRepository;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use objective_repository::ObjectiveRepository;
pub use pathway_repository::PathwayRepository;
pub use unit_of_work::{ChangeSet, UnitOfWork};
pub use user_repository::UserRepository;
