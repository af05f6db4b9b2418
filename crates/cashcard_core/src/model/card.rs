//! Cash card domain model.
//!
//! # Responsibility
//! - Define the canonical card record and its create-time input.
//! - Own the conversion between decimal amounts and stored integer units.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes.
//! - `owner` is non-empty and never reassigned after creation.
//! - `amount` has at most `AMOUNT_SCALE` fractional digits and fits in `i64`
//!   storage units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned card identifier.
pub type CardId = i64;

/// Fractional digits preserved by storage.
pub const AMOUNT_SCALE: u32 = 4;

/// Persisted cash card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCard {
    pub id: CardId,
    /// Serialized as a JSON number, e.g. `123.45`.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub owner: String,
}

/// Create input handed to storage. Storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCashCard {
    pub amount: Decimal,
    pub owner: String,
}

/// Validation failures for card values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardValidationError {
    EmptyOwner,
    AmountScaleTooLarge { amount: Decimal, max_scale: u32 },
    AmountOutOfRange(Decimal),
}

impl Display for CardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwner => write!(f, "card owner must not be empty"),
            Self::AmountScaleTooLarge { amount, max_scale } => write!(
                f,
                "amount {amount} has more than {max_scale} fractional digits"
            ),
            Self::AmountOutOfRange(amount) => {
                write!(f, "amount {amount} is outside the storable range")
            }
        }
    }
}

impl Error for CardValidationError {}

impl CashCard {
    /// Checks owner presence and amount representability.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        validate_owner(&self.owner)?;
        amount_to_units(self.amount)?;
        Ok(())
    }

    /// Whether `identity` owns this card.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner == identity
    }
}

impl NewCashCard {
    pub fn new(amount: Decimal, owner: impl Into<String>) -> Self {
        Self {
            amount,
            owner: owner.into(),
        }
    }

    pub fn validate(&self) -> Result<(), CardValidationError> {
        validate_owner(&self.owner)?;
        amount_to_units(self.amount)?;
        Ok(())
    }

    /// Attaches the storage-assigned id.
    pub fn into_card(self, id: CardId) -> CashCard {
        CashCard {
            id,
            amount: self.amount,
            owner: self.owner,
        }
    }
}

/// Converts a decimal amount into fixed-scale storage units.
///
/// `123.45` becomes `1_234_500`. Trailing zeros beyond the scale are
/// accepted (`1.000000` is fine); significant digits beyond it are not.
pub fn amount_to_units(amount: Decimal) -> Result<i64, CardValidationError> {
    let normalized = amount.normalize();
    if normalized.scale() > AMOUNT_SCALE {
        return Err(CardValidationError::AmountScaleTooLarge {
            amount,
            max_scale: AMOUNT_SCALE,
        });
    }

    normalized
        .checked_mul(Decimal::from(10_i64.pow(AMOUNT_SCALE)))
        .and_then(|scaled| scaled.to_i64())
        .ok_or(CardValidationError::AmountOutOfRange(amount))
}

/// Inverse of [`amount_to_units`].
pub fn amount_from_units(units: i64) -> Decimal {
    Decimal::new(units, AMOUNT_SCALE).normalize()
}

fn validate_owner(owner: &str) -> Result<(), CardValidationError> {
    if owner.trim().is_empty() {
        return Err(CardValidationError::EmptyOwner);
    }
    Ok(())
}
