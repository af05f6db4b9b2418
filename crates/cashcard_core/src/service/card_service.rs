//! Owner-scoped card service.
//!
//! # Responsibility
//! - Gate every card read and write on the ownership predicate
//!   `card.owner == caller`.
//! - Shape listings through page normalization before touching storage.
//!
//! # Invariants
//! - A card owned by someone else is reported exactly like a missing card.
//! - Create always stamps the caller as owner; storage assigns the id.
//! - Update never changes id or owner.
//! - The service holds no per-request state; concurrent callers need no
//!   coordination here.

use crate::auth::identity::CallerIdentity;
use crate::model::card::{CardId, CardValidationError, CashCard, NewCashCard};
use crate::query::page::{CardPage, PageRequest, PageRequestError, PageSettings};
use crate::repo::card_repo::{CardListQuery, CardRepository, RepoError};
use log::{debug, error};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for card use-cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// Missing, or owned by another caller. The two are never told apart.
    NotFound(CardId),
    InvalidPage(PageRequestError),
    Validation(CardValidationError),
    Repo(RepoError),
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "cash card not found: {id}"),
            Self::InvalidPage(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::InvalidPage(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<PageRequestError> for CardServiceError {
    fn from(value: PageRequestError) -> Self {
        Self::InvalidPage(value)
    }
}

impl From<CardValidationError> for CardServiceError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

/// One page of the caller's cards plus the window actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardListResult {
    pub items: Vec<CashCard>,
    pub applied: CardPage,
}

/// Access-scoped facade over a card repository.
pub struct CardService<R: CardRepository> {
    repo: R,
    page_settings: PageSettings,
}

impl<R: CardRepository> CardService<R> {
    pub fn new(repo: R, page_settings: PageSettings) -> Self {
        Self {
            repo,
            page_settings,
        }
    }

    pub fn page_settings(&self) -> &PageSettings {
        &self.page_settings
    }

    /// Fetches one card the caller owns.
    pub fn find_by_id(
        &self,
        id: CardId,
        caller: &CallerIdentity,
    ) -> Result<CashCard, CardServiceError> {
        let card = self.load_owned(id, caller, "card_get")?;
        debug!("event=card_get module=service status=ok card_id={id}");
        Ok(card)
    }

    /// Creates a card owned by `caller`.
    pub fn create(
        &self,
        amount: Decimal,
        caller: &CallerIdentity,
    ) -> Result<CashCard, CardServiceError> {
        let new_card = NewCashCard::new(amount, caller.as_str());
        new_card.validate()?;

        let created = self
            .repo
            .create_card(&new_card)
            .map_err(|err| log_failure("card_create", err))?;
        debug!(
            "event=card_create module=service status=ok card_id={}",
            created.id
        );
        Ok(created)
    }

    /// Lists one page of the caller's cards.
    pub fn list(
        &self,
        request: &PageRequest,
        caller: &CallerIdentity,
    ) -> Result<CardListResult, CardServiceError> {
        let applied = request.normalize(&self.page_settings).map_err(|err| {
            debug!("event=card_list module=service status=bad_request error={err}");
            err
        })?;
        let query = CardListQuery {
            owner: caller.as_str().to_string(),
            sort: applied.sort,
            limit: applied.size,
            offset: applied.offset,
        };

        let items = self
            .repo
            .list_cards(&query)
            .map_err(|err| log_failure("card_list", err))?;
        debug!(
            "event=card_list module=service status=ok page={} size={} sort={} count={}",
            applied.page,
            applied.size,
            applied.sort,
            items.len()
        );
        Ok(CardListResult { items, applied })
    }

    /// Replaces the amount of a card the caller owns.
    pub fn update(
        &self,
        id: CardId,
        amount: Decimal,
        caller: &CallerIdentity,
    ) -> Result<(), CardServiceError> {
        let existing = self.load_owned(id, caller, "card_update")?;
        let updated = CashCard {
            id: existing.id,
            amount,
            owner: caller.as_str().to_string(),
        };
        updated.validate()?;

        self.repo
            .update_card(&updated)
            .map_err(|err| log_failure("card_update", err))?;
        debug!("event=card_update module=service status=ok card_id={id}");
        Ok(())
    }

    /// Deletes a card the caller owns.
    pub fn delete(&self, id: CardId, caller: &CallerIdentity) -> Result<(), CardServiceError> {
        self.load_owned(id, caller, "card_delete")?;
        self.repo
            .delete_card(id)
            .map_err(|err| log_failure("card_delete", err))?;
        debug!("event=card_delete module=service status=ok card_id={id}");
        Ok(())
    }

    fn load_owned(
        &self,
        id: CardId,
        caller: &CallerIdentity,
        event: &'static str,
    ) -> Result<CashCard, CardServiceError> {
        let card = self
            .repo
            .get_card(id)
            .map_err(|err| log_failure(event, err))?;

        match card {
            Some(card) if card.is_owned_by(caller.as_str()) => Ok(card),
            _ => {
                debug!("event={event} module=service status=not_found card_id={id}");
                Err(CardServiceError::NotFound(id))
            }
        }
    }
}

fn log_failure(event: &'static str, err: RepoError) -> CardServiceError {
    let mapped = CardServiceError::from(err);
    match &mapped {
        CardServiceError::NotFound(id) => {
            debug!("event={event} module=service status=not_found card_id={id}");
        }
        other => {
            error!("event={event} module=service status=error error={other}");
        }
    }
    mapped
}
