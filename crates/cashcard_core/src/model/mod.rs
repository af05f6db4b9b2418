//! Domain model for cash cards.
//!
//! # Invariants
//! - Every persisted card is identified by a storage-assigned `CardId`.
//! - Every persisted card has exactly one owner, fixed at creation.

pub mod card;
