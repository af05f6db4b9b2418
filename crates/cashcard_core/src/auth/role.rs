//! Granted roles checked by the authorization gate.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Role granted to an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// May use every card operation on their own cards.
    CardOwner,
    /// Authenticated, but not allowed near card operations.
    NonOwner,
}

/// Wire value for [`Role::CardOwner`].
pub const ROLE_CARD_OWNER: &str = "CARD-OWNER";
/// Wire value for [`Role::NonOwner`].
pub const ROLE_NON_OWNER: &str = "NON-OWNER";

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CardOwner => ROLE_CARD_OWNER,
            Self::NonOwner => ROLE_NON_OWNER,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one role from its wire value. Matching is exact.
pub fn parse_role(value: &str) -> Result<Role, RoleParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(RoleParseError::EmptyRole);
    }

    match normalized {
        ROLE_CARD_OWNER => Ok(Role::CardOwner),
        ROLE_NON_OWNER => Ok(Role::NonOwner),
        other => Err(RoleParseError::UnsupportedRole(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    EmptyRole,
    UnsupportedRole(String),
}

impl Display for RoleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRole => write!(f, "role value must not be empty"),
            Self::UnsupportedRole(value) => write!(f, "role is unsupported: {value}"),
        }
    }
}

impl Error for RoleParseError {}
