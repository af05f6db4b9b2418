//! Transport-neutral request surface.
//!
//! # Responsibility
//! - Authenticate, run the role gate, decode JSON payloads and call the
//!   owner-scoped service.
//! - Map every outcome to an HTTP-equivalent [`ResponseStatus`].
//!
//! # Invariants
//! - No card operation runs before authentication and the role gate pass.
//! - `Forbidden` (missing role) and `NotFound` (missing or foreign card)
//!   stay distinct.
//! - Client-supplied `id` and `owner` fields in payloads are ignored.

mod handler;

pub use handler::{
    ApiResponse, CardApi, CardPayload, CardRequest, ResponseStatus, CARDS_PATH,
};
