//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-scoped use-case APIs.
//! - Keep transport layers decoupled from storage details.

pub mod card_service;
