//! Authentication boundary and authorization gate.
//!
//! # Responsibility
//! - Turn credentials into a verified [`AuthenticatedCaller`].
//! - Decide, before any card operation runs, whether the caller holds the
//!   required role.
//!
//! # Invariants
//! - Unknown user and wrong password are the same `Unauthorized` outcome.
//! - A missing role is `Forbidden`, never folded into card-level not-found.
//! - [`authorize`] is a pure function of the caller and the required role.

pub mod authenticator;
pub mod identity;
pub mod role;

use identity::{CallerIdentity, InvalidIdentity};
use role::{Role, RoleParseError};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Username/password pair presented by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keeps passwords out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Verified principal plus granted roles, valid for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub identity: CallerIdentity,
    pub roles: BTreeSet<Role>,
}

impl AuthenticatedCaller {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Credential verification contract.
pub trait Authenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedCaller, AuthError>;
}

impl<T: Authenticator + ?Sized> Authenticator for &T {
    fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedCaller, AuthError> {
        (**self).authenticate(credentials)
    }
}

/// Grants access to the caller identity only when `required` is held.
pub fn authorize(
    caller: &AuthenticatedCaller,
    required: Role,
) -> Result<&CallerIdentity, AuthError> {
    if caller.has_role(required) {
        Ok(&caller.identity)
    } else {
        Err(AuthError::Forbidden {
            identity: caller.identity.clone(),
            required,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// Missing, unknown or wrong credentials.
    Unauthorized,
    /// Authenticated, but lacks the role guarding the operation.
    Forbidden {
        identity: CallerIdentity,
        required: Role,
    },
    InvalidIdentity(InvalidIdentity),
    InvalidRole(RoleParseError),
    DuplicateUser(String),
    PasswordHash(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "authentication failed"),
            Self::Forbidden { identity, required } => {
                write!(f, "caller `{identity}` lacks required role {required}")
            }
            Self::InvalidIdentity(err) => write!(f, "{err}"),
            Self::InvalidRole(err) => write!(f, "{err}"),
            Self::DuplicateUser(username) => write!(f, "user already registered: {username}"),
            Self::PasswordHash(message) => write!(f, "password hashing failed: {message}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentity(err) => Some(err),
            Self::InvalidRole(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidIdentity> for AuthError {
    fn from(value: InvalidIdentity) -> Self {
        Self::InvalidIdentity(value)
    }
}

impl From<RoleParseError> for AuthError {
    fn from(value: RoleParseError) -> Self {
        Self::InvalidRole(value)
    }
}
