//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the outbound ports, used by tests and by
//! hosts that embed the vault without their own storage or ledger.

mod clock;
mod events;
mod ledger;
mod memory_store;

pub use clock::{ManualClock, SystemTimeSource};
pub use events::{RecordingEventPublisher, TracingEventPublisher};
pub use ledger::InMemoryLedger;
pub use memory_store::InMemoryKVStore;
