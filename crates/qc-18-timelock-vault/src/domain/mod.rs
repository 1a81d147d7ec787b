//! # Domain Module
//!
//! Core domain types for the Time-Locked Message Vault.

pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use invariants::*;
pub use value_objects::*;
