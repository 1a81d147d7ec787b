//! # Algorithms Module
//!
//! Fee policy and message id derivation.

pub mod fee;
pub mod message_id;

pub use fee::FeePolicy;
pub use message_id::{derive_message_id, MessageIdInput, MESSAGE_ID_DOMAIN};
