//! Driver layer for browser automation.
//!
//! This crate exposes a thin WebDriver wrapper used by the price extractor to
//! drive a Chrome session through chromedriver.
//!
//! - [`vyapyaar_browser::driver::VyapyaarDriver`]: WebDriver client wrapper and session lifetime
//! - [`vyapyaar_browser::page::VyapyaarPage`]: navigation, waits and element queries
//! - [`vyapyaar_browser::options`]: Chrome launch arguments and capabilities
//! - [`vyapyaar_browser::error::DriverError`]: failures classified as stale, timeout, etc.
pub mod vyapyaar_browser;

pub use vyapyaar_browser::error::DriverError;
