//! Core domain logic for cash cards.
//! This crate is the single source of truth for ownership and paging rules.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use api::{ApiResponse, CardApi, CardPayload, CardRequest, ResponseStatus};
pub use auth::authenticator::{InMemoryAuthenticator, PasswordHashConfig};
pub use auth::identity::{CallerIdentity, InvalidIdentity};
pub use auth::role::{parse_role, Role, RoleParseError};
pub use auth::{authorize, AuthError, AuthenticatedCaller, Authenticator, Credentials};
pub use config::{ConfigError, CoreConfig, DatabaseConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::card::{CardId, CardValidationError, CashCard, NewCashCard};
pub use query::page::{
    CardPage, PageRequest, PageRequestError, PageSettings, SortDirection, SortField, SortOrder,
};
pub use repo::card_repo::{
    CardListQuery, CardRepository, RepoError, RepoResult, SqliteCardRepository,
};
pub use service::card_service::{CardListResult, CardService, CardServiceError};

pub use rust_decimal::Decimal;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
