//! Expenses and Funds kept as rows of a two-tab spreadsheet.
//!
//! Rows are addressed by position (1-based, header included). Positions shift
//! after every delete, so callers re-list before acting on one; a row key from
//! the listing can be sent along to have a stale position rejected.
pub mod config;
pub mod db_types;
pub mod error;
pub mod operations;
pub mod processor;
pub mod processor_enums;
pub mod summary;

pub use error::LedgerError;
