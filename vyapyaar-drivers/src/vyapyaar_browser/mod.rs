pub mod driver;
pub mod error;
pub mod options;
pub mod page;
