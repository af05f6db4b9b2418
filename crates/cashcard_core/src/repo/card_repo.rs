//! Card repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete over the `cash_cards` table.
//! - Keep SQL and amount unit encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the card before any SQL mutation.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing is restricted to one owner and ordered by the requested key with
//!   `id ASC` as tie-break.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::card::{
    amount_from_units, amount_to_units, CardId, CardValidationError, CashCard, NewCashCard,
};
use crate::query::page::{SortDirection, SortField, SortOrder};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CARD_SELECT_SQL: &str = "SELECT id, amount_units, owner FROM cash_cards";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for card persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CardValidationError),
    Db(DbError),
    NotFound(CardId),
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "cash card not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "card repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "card repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "card repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CardValidationError> for RepoError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owner-restricted, ordered, bounded list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardListQuery {
    pub owner: String,
    pub sort: SortOrder,
    pub limit: u32,
    pub offset: u64,
}

/// Storage contract consumed by the access-scoped card service.
pub trait CardRepository {
    /// Persists a new card and returns it with its assigned id.
    fn create_card(&self, card: &NewCashCard) -> RepoResult<CashCard>;
    fn get_card(&self, id: CardId) -> RepoResult<Option<CashCard>>;
    fn list_cards(&self, query: &CardListQuery) -> RepoResult<Vec<CashCard>>;
    /// Replaces the amount of `card.id`. Fails with `NotFound` when no row
    /// matches both id and owner.
    fn update_card(&self, card: &CashCard) -> RepoResult<()>;
    fn delete_card(&self, id: CardId) -> RepoResult<()>;
}

impl<T: CardRepository + ?Sized> CardRepository for &T {
    fn create_card(&self, card: &NewCashCard) -> RepoResult<CashCard> {
        (**self).create_card(card)
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<CashCard>> {
        (**self).get_card(id)
    }

    fn list_cards(&self, query: &CardListQuery) -> RepoResult<Vec<CashCard>> {
        (**self).list_cards(query)
    }

    fn update_card(&self, card: &CashCard) -> RepoResult<()> {
        (**self).update_card(card)
    }

    fn delete_card(&self, id: CardId) -> RepoResult<()> {
        (**self).delete_card(id)
    }
}

/// SQLite-backed card repository.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Wraps a connection after checking it was opened through `db::open_*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_card_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn create_card(&self, card: &NewCashCard) -> RepoResult<CashCard> {
        card.validate()?;
        let units = amount_to_units(card.amount)?;

        self.conn.execute(
            "INSERT INTO cash_cards (amount_units, owner) VALUES (?1, ?2);",
            params![units, card.owner.as_str()],
        )?;

        Ok(card.clone().into_card(self.conn.last_insert_rowid()))
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<CashCard>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CARD_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt.query_row([id], read_raw_row).optional()?;

        match row {
            Some(raw) => Ok(Some(parse_card_row(raw)?)),
            None => Ok(None),
        }
    }

    fn list_cards(&self, query: &CardListQuery) -> RepoResult<Vec<CashCard>> {
        let offset = i64::try_from(query.offset).map_err(|_| {
            RepoError::InvalidData(format!("list offset {} exceeds i64", query.offset))
        })?;
        let sql = format!(
            "{CARD_SELECT_SQL} WHERE owner = ?1 ORDER BY {} LIMIT ?2 OFFSET ?3;",
            order_by_clause(query.sort)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![
            query.owner.as_str(),
            i64::from(query.limit),
            offset
        ])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(read_raw_row(row)?)?);
        }

        Ok(cards)
    }

    fn update_card(&self, card: &CashCard) -> RepoResult<()> {
        card.validate()?;
        let units = amount_to_units(card.amount)?;

        let changed = self.conn.execute(
            "UPDATE cash_cards
             SET
                amount_units = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2
               AND owner = ?3;",
            params![units, card.id, card.owner.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(card.id));
        }
        Ok(())
    }

    fn delete_card(&self, id: CardId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM cash_cards WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

/// Column values as read, before domain validation.
struct RawCardRow {
    id: CardId,
    amount_units: i64,
    owner: String,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawCardRow> {
    Ok(RawCardRow {
        id: row.get("id")?,
        amount_units: row.get("amount_units")?,
        owner: row.get("owner")?,
    })
}

fn parse_card_row(raw: RawCardRow) -> RepoResult<CashCard> {
    let card = CashCard {
        id: raw.id,
        amount: amount_from_units(raw.amount_units),
        owner: raw.owner,
    };
    card.validate().map_err(|err| {
        RepoError::InvalidData(format!("cash_cards row {} failed validation: {err}", card.id))
    })?;
    Ok(card)
}

fn order_by_clause(sort: SortOrder) -> String {
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    match sort.field {
        SortField::Amount => format!("amount_units {direction}, id ASC"),
        SortField::Id => format!("id {direction}"),
    }
}

fn ensure_card_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "cash_cards")? {
        return Err(RepoError::MissingRequiredTable("cash_cards"));
    }
    for column in ["id", "amount_units", "owner", "updated_at"] {
        if !table_has_column(conn, "cash_cards", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "cash_cards",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::order_by_clause;
    use crate::query::page::{SortDirection, SortField, SortOrder};

    #[test]
    fn amount_ordering_breaks_ties_on_id() {
        let clause = order_by_clause(SortOrder::new(SortField::Amount, SortDirection::Desc));
        assert_eq!(clause, "amount_units DESC, id ASC");
    }

    #[test]
    fn id_ordering_needs_no_tie_break() {
        let clause = order_by_clause(SortOrder::new(SortField::Id, SortDirection::Asc));
        assert_eq!(clause, "id ASC");
    }
}
