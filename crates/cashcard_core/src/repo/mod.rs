//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the card service depends on.
//! - Isolate SQLite query details from access-control orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - The repository applies no ownership policy beyond the predicates its
//!   callers pass in.

pub mod card_repo;
