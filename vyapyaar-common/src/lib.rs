//! Common types and utilities shared across Vyapyaar crates.
//!
//! This crate defines the price lookup result types and the observability
//! helpers used throughout the Vyapyaar workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`PriceSummary`]: `{min, max, avg, count}` aggregate over scraped prices
//! - [`ScrapeError`]: free-text failure returned in place of a summary
//! - [`ScrapeOutcome`]: exactly one of the two, serialised untagged
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! Summarising a list of prices:
//!
//! ```rust
//! use vyapyaar_common::{PriceSummary, ScrapeOutcome};
//!
//! let outcome = ScrapeOutcome::from_prices(&[500, 1500, 1000]);
//! assert_eq!(
//!     outcome,
//!     ScrapeOutcome::Summary(PriceSummary { min: 500, max: 1500, avg: 1000, count: 3 })
//! );
//! assert_eq!(
//!     serde_json::to_string(&outcome).unwrap(),
//!     r#"{"min":500,"max":1500,"avg":1000,"count":3}"#
//! );
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Message returned when a page yielded no qualifying prices.
pub const NO_PRICES_FOUND: &str = "No prices found";

/// Aggregate statistics over the prices found for one product query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub min: u64,
    pub max: u64,
    /// `sum / count`, truncated.
    pub avg: u64,
    pub count: usize,
}

impl PriceSummary {
    /// Summarise `prices`, or `None` when the list is empty.
    pub fn from_prices(prices: &[u64]) -> Option<Self> {
        let min = *prices.iter().min()?;
        let max = *prices.iter().max()?;
        let sum: u128 = prices.iter().map(|&p| u128::from(p)).sum();
        let count = prices.len();
        // sum / count never exceeds max, so the narrowing is lossless.
        let avg = (sum / count as u128) as u64;
        Some(Self {
            min,
            max,
            avg,
            count,
        })
    }
}

/// A failed lookup. Serialises as `{"error": "<message>"}`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{error}")]
pub struct ScrapeError {
    pub error: String,
}

impl ScrapeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn no_prices_found() -> Self {
        Self::new(NO_PRICES_FOUND)
    }
}

/// Result of one price lookup as it travels back to the caller.
///
/// Untagged, so on the wire it is either a [`PriceSummary`] object or a
/// [`ScrapeError`] object and never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeOutcome {
    Summary(PriceSummary),
    Failed(ScrapeError),
}

impl ScrapeOutcome {
    /// Summary of `prices`, or [`NO_PRICES_FOUND`] when there are none.
    pub fn from_prices(prices: &[u64]) -> Self {
        match PriceSummary::from_prices(prices) {
            Some(summary) => Self::Summary(summary),
            None => Self::Failed(ScrapeError::no_prices_found()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(ScrapeError::new(message))
    }

    pub fn summary(&self) -> Option<&PriceSummary> {
        match self {
            Self::Summary(summary) => Some(summary),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
