//! In-memory user store with Argon2id password hashes.
//!
//! # Invariants
//! - Plain-text passwords are never stored or logged.
//! - Log events carry outcome codes only, never usernames or passwords.

use crate::auth::identity::CallerIdentity;
use crate::auth::role::{parse_role, Role};
use crate::auth::{AuthError, AuthenticatedCaller, Authenticator, Credentials};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use log::{debug, warn};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Argon2id cost parameters used when registering users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashConfig {
    fn hasher(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|err| AuthError::PasswordHash(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Demo principals: one card owner and one authenticated non-owner.
const DEMO_USERS: &[(&str, &str, &[&str])] = &[
    ("sarah1", "abc123", &["CARD-OWNER"]),
    ("hank-owns-no-cards", "qrs456", &["NON-OWNER"]),
];

struct UserRecord {
    identity: CallerIdentity,
    password_hash: String,
    roles: BTreeSet<Role>,
}

/// Process-local user registry.
pub struct InMemoryAuthenticator {
    hasher: Argon2<'static>,
    users: HashMap<String, UserRecord>,
}

impl InMemoryAuthenticator {
    pub fn new(config: &PasswordHashConfig) -> Result<Self, AuthError> {
        Ok(Self {
            hasher: config.hasher()?,
            users: HashMap::new(),
        })
    }

    /// Registry preloaded with the demo principals.
    pub fn with_demo_users(config: &PasswordHashConfig) -> Result<Self, AuthError> {
        let mut authenticator = Self::new(config)?;
        for (username, password, roles) in DEMO_USERS {
            authenticator.add_user(username, password, roles)?;
        }
        Ok(authenticator)
    }

    /// Registers a user. Roles use their wire values, e.g. `CARD-OWNER`.
    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        roles: &[&str],
    ) -> Result<(), AuthError> {
        let identity = CallerIdentity::new(username)?;
        if self.users.contains_key(identity.as_str()) {
            return Err(AuthError::DuplicateUser(username.to_string()));
        }
        let roles = roles
            .iter()
            .map(|value| parse_role(value))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| AuthError::PasswordHash(err.to_string()))?
            .to_string();

        self.users.insert(
            identity.as_str().to_string(),
            UserRecord {
                identity,
                password_hash,
                roles,
            },
        );
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl Authenticator for InMemoryAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedCaller, AuthError> {
        let Some(user) = self.users.get(credentials.username.as_str()) else {
            debug!("event=authenticate module=auth status=denied reason=unknown_user");
            return Err(AuthError::Unauthorized);
        };

        let parsed = PasswordHash::new(&user.password_hash).map_err(|err| {
            warn!("event=authenticate module=auth status=error reason=corrupt_hash");
            AuthError::PasswordHash(err.to_string())
        })?;
        if self
            .hasher
            .verify_password(credentials.password.as_bytes(), &parsed)
            .is_err()
        {
            debug!("event=authenticate module=auth status=denied reason=bad_password");
            return Err(AuthError::Unauthorized);
        }

        debug!("event=authenticate module=auth status=ok");
        Ok(AuthenticatedCaller {
            identity: user.identity.clone(),
            roles: user.roles.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryAuthenticator, PasswordHashConfig};
    use crate::auth::role::Role;
    use crate::auth::{AuthError, Authenticator, Credentials};

    fn cheap_config() -> PasswordHashConfig {
        PasswordHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn demo_users_authenticate_with_their_roles() {
        let auth = InMemoryAuthenticator::with_demo_users(&cheap_config()).unwrap();
        assert_eq!(auth.user_count(), 2);

        let sarah = auth
            .authenticate(&Credentials::new("sarah1", "abc123"))
            .unwrap();
        assert_eq!(sarah.identity.as_str(), "sarah1");
        assert!(sarah.has_role(Role::CardOwner));

        let hank = auth
            .authenticate(&Credentials::new("hank-owns-no-cards", "qrs456"))
            .unwrap();
        assert!(hank.has_role(Role::NonOwner));
        assert!(!hank.has_role(Role::CardOwner));
    }

    #[test]
    fn wrong_password_and_unknown_user_are_both_unauthorized() {
        let auth = InMemoryAuthenticator::with_demo_users(&cheap_config()).unwrap();

        let err = auth
            .authenticate(&Credentials::new("sarah1", "BAD-PASSWORD"))
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        let err = auth
            .authenticate(&Credentials::new("BAD-USER", "abc123"))
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[test]
    fn add_user_rejects_duplicates_and_unknown_roles() {
        let mut auth = InMemoryAuthenticator::new(&cheap_config()).unwrap();
        auth.add_user("kumar2", "xyz789", &["CARD-OWNER"]).unwrap();

        let err = auth
            .add_user("kumar2", "other", &["CARD-OWNER"])
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser(name) if name == "kumar2"));

        let err = auth.add_user("bob", "pw", &["ADMIN"]).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRole(_)));
    }

    #[test]
    fn invalid_cost_parameters_are_reported() {
        let config = PasswordHashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            InMemoryAuthenticator::new(&config),
            Err(AuthError::PasswordHash(_))
        ));
    }
}
