//! Page request normalization for card listings.
//!
//! # Responsibility
//! - Turn raw page/size/sort input into a validated [`CardPage`].
//! - Own the set of sortable fields and the default ordering.
//!
//! # Invariants
//! - Out-of-range input is rejected, never clamped into another page.
//! - Unknown sort fields or directions are rejected.
//! - Storage breaks ties on `id ASC`, so the order is total and pages never
//!   overlap.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size applied when the request does not carry one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Card fields accepted as sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Amount,
    Id,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortField::Amount, SortDirection::Asc)
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

/// Paging defaults and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub default_size: u32,
    pub max_size: u32,
    pub default_sort: SortOrder,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
            default_sort: SortOrder::default(),
        }
    }
}

/// Misconfigured paging bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSettingsError {
    ZeroDefaultSize,
    ZeroMaxSize,
    DefaultAboveMax { default_size: u32, max_size: u32 },
}

impl Display for PageSettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDefaultSize => write!(f, "default page size must be at least 1"),
            Self::ZeroMaxSize => write!(f, "max page size must be at least 1"),
            Self::DefaultAboveMax {
                default_size,
                max_size,
            } => write!(
                f,
                "default page size {default_size} exceeds max page size {max_size}"
            ),
        }
    }
}

impl Error for PageSettingsError {}

impl PageSettings {
    pub fn validate(&self) -> Result<(), PageSettingsError> {
        if self.default_size == 0 {
            return Err(PageSettingsError::ZeroDefaultSize);
        }
        if self.max_size == 0 {
            return Err(PageSettingsError::ZeroMaxSize);
        }
        if self.default_size > self.max_size {
            return Err(PageSettingsError::DefaultAboveMax {
                default_size: self.default_size,
                max_size: self.max_size,
            });
        }
        Ok(())
    }
}

/// Raw page request as received from a caller. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// `"field"` or `"field,direction"`, e.g. `"amount,desc"`.
    pub sort: Option<String>,
}

impl PageRequest {
    pub fn new(page: Option<i64>, size: Option<i64>, sort: Option<String>) -> Self {
        Self { page, size, sort }
    }

    /// Validates the request and fills in defaults from `settings`.
    pub fn normalize(&self, settings: &PageSettings) -> Result<CardPage, PageRequestError> {
        let page = match self.page {
            None => 0,
            Some(value) if value < 0 => return Err(PageRequestError::NegativePage(value)),
            Some(value) => {
                u32::try_from(value).map_err(|_| PageRequestError::PageOutOfRange {
                    page: value,
                    size: self.size.unwrap_or(i64::from(settings.default_size)),
                })?
            }
        };

        let size = match self.size {
            None => settings.default_size,
            Some(value) if value < 1 || value > i64::from(settings.max_size) => {
                return Err(PageRequestError::InvalidSize {
                    size: value,
                    max_size: settings.max_size,
                });
            }
            Some(value) => value as u32,
        };

        let sort = match self.sort.as_deref() {
            None => settings.default_sort,
            Some(raw) => parse_sort(raw)?,
        };

        // SQLite binds OFFSET as a signed 64-bit integer.
        let offset = u64::from(page) * u64::from(size);
        if offset > i64::MAX as u64 {
            return Err(PageRequestError::PageOutOfRange {
                page: i64::from(page),
                size: i64::from(size),
            });
        }

        Ok(CardPage {
            page,
            size,
            offset,
            sort,
        })
    }
}

/// Validated page window handed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPage {
    pub page: u32,
    pub size: u32,
    /// Rows skipped before the page, `page * size`.
    pub offset: u64,
    pub sort: SortOrder,
}

/// Rejected page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    NegativePage(i64),
    InvalidSize { size: i64, max_size: u32 },
    PageOutOfRange { page: i64, size: i64 },
    UnknownSortField(String),
    UnknownSortDirection(String),
    MalformedSort(String),
}

impl Display for PageRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativePage(page) => write!(f, "page index must not be negative, got {page}"),
            Self::InvalidSize { size, max_size } => {
                write!(f, "page size must be between 1 and {max_size}, got {size}")
            }
            Self::PageOutOfRange { page, size } => {
                write!(f, "page {page} with size {size} is out of range")
            }
            Self::UnknownSortField(field) => write!(
                f,
                "unknown sort field `{field}`; expected one of {}",
                SORTABLE_FIELDS.join("|")
            ),
            Self::UnknownSortDirection(direction) => {
                write!(f, "unknown sort direction `{direction}`; expected asc|desc")
            }
            Self::MalformedSort(raw) => {
                write!(f, "malformed sort `{raw}`; expected `field` or `field,direction`")
            }
        }
    }
}

impl Error for PageRequestError {}

const SORTABLE_FIELDS: &[&str] = &["amount", "id"];

/// Parses `"field"` or `"field,direction"`.
pub fn parse_sort(raw: &str) -> Result<SortOrder, PageRequestError> {
    let mut parts = raw.split(',').map(str::trim);
    let field_text = parts.next().unwrap_or_default();
    let direction_text = parts.next();
    if field_text.is_empty() || parts.next().is_some() {
        return Err(PageRequestError::MalformedSort(raw.to_string()));
    }

    let field = parse_sort_field(field_text)?;
    let direction = match direction_text {
        None => SortDirection::Asc,
        Some(value) => parse_sort_direction(value)?,
    };
    Ok(SortOrder::new(field, direction))
}

fn parse_sort_field(value: &str) -> Result<SortField, PageRequestError> {
    match value {
        "amount" => Ok(SortField::Amount),
        "id" => Ok(SortField::Id),
        other => Err(PageRequestError::UnknownSortField(other.to_string())),
    }
}

fn parse_sort_direction(value: &str) -> Result<SortDirection, PageRequestError> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        _ => Err(PageRequestError::UnknownSortDirection(value.to_string())),
    }
}
