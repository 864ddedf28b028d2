//! Price extraction from a live storefront.
//!
//! - Browser session capability traits and the Fantoccini-backed implementation (`browser`)
//! - Price text parsing (`extract`)
//! - Bounded retry for transient element reads (`retry`)
//! - The end-to-end [`PriceExtractor`] and the [`PriceSource`] seam used by the HTTP layer (`extractor`)

pub mod browser;
pub mod extract;
pub mod extractor;
pub mod retry;

pub use browser::{BrowserSession, PageCapture, SessionFactory, WebDriverSessionFactory};
pub use extractor::{ExtractError, PriceExtractor, PriceSource};
