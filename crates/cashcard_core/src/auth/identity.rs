//! Caller identity for one request.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._@-]{0,63}$").expect("valid identity regex")
});

/// Authenticated principal name. Compared verbatim against card owners.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidIdentity> {
        let value = value.into();
        if !IDENTITY_RE.is_match(&value) {
            return Err(InvalidIdentity(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CallerIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallerIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rejected principal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentity(pub String);

impl Display for InvalidIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid caller identity `{}`", self.0)
    }
}

impl Error for InvalidIdentity {}

#[cfg(test)]
mod tests {
    use super::CallerIdentity;

    #[test]
    fn accepts_usernames() {
        for name in ["sarah1", "hank-owns-no-cards", "kumar.2@example"] {
            assert_eq!(CallerIdentity::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_blank_and_odd_names() {
        let too_long = "x".repeat(65);
        for name in ["", " sarah1", "-leading", "has space", too_long.as_str()] {
            assert!(CallerIdentity::new(name).is_err(), "accepted `{name}`");
        }
    }
}
