//! Listing query shaping: pagination bounds and sort normalization.

pub mod page;
