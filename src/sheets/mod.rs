//! Spreadsheet store seam.
//!
//! The ledger only needs four primitives from a spreadsheet: read a range,
//! append a row, list tabs, and delete a half-open block of rows. Both the
//! Google Sheets REST client and the in-memory fake implement them.
pub mod auth;
pub mod google;
pub mod memory;
pub mod range;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use google::GoogleSheets;
pub use memory::MemorySheets;
pub use range::SheetRange;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("failed to reach spreadsheet store: {0}")]
    Connect(String),

    #[error("spreadsheet store request timed out: {0}")]
    Timeout(String),

    #[error("spreadsheet store transport error: {0}")]
    Transport(String),

    #[error("spreadsheet store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("spreadsheet store authentication failed: {0}")]
    Auth(String),

    /// The store refused a bearer token it should have accepted.
    #[error("spreadsheet store rejected the access token: {0}")]
    TokenRejected(String),

    #[error("unexpected response from spreadsheet store: {0}")]
    Decode(String),
}

/// Whether a call only reads, or may have mutated the sheet if it got far
/// enough to be received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
}

impl StoreError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            StoreError::Connect(err.to_string())
        } else if err.is_timeout() {
            StoreError::Timeout(err.to_string())
        } else if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }

    /// Writes are only retried when the store cannot have applied them.
    pub fn is_transient(&self, kind: CallKind) -> bool {
        match (self, kind) {
            (StoreError::Connect(_), _) => true,
            (StoreError::Status { status: 429, .. }, _) => true,
            (StoreError::Timeout(_) | StoreError::Transport(_), CallKind::Read) => true,
            (StoreError::Status { status, .. }, CallKind::Read) => {
                matches!(status, 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub sheet_id: i64,
    pub title: String,
}

pub trait SheetStore {
    /// Rows of displayed values; trailing empty cells and rows are omitted.
    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<Value>>, StoreError>;

    /// Appends one row after the last non-empty row of the range's tab.
    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), StoreError>;

    async fn tabs(&self) -> Result<Vec<TabInfo>, StoreError>;

    /// Deletes rows `[start, end)`, 0-based, shifting later rows up.
    async fn delete_rows(&self, sheet_id: i64, start: u32, end: u32) -> Result<(), StoreError>;
}

/// The store a running service talks to, chosen once at startup.
#[derive(Clone)]
pub enum StoreHandle {
    Google(GoogleSheets),
    Memory(MemorySheets),
}

impl SheetStore for StoreHandle {
    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<Value>>, StoreError> {
        match self {
            StoreHandle::Google(store) => store.read_rows(range).await,
            StoreHandle::Memory(store) => store.read_rows(range).await,
        }
    }

    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), StoreError> {
        match self {
            StoreHandle::Google(store) => store.append_row(range, row).await,
            StoreHandle::Memory(store) => store.append_row(range, row).await,
        }
    }

    async fn tabs(&self) -> Result<Vec<TabInfo>, StoreError> {
        match self {
            StoreHandle::Google(store) => store.tabs().await,
            StoreHandle::Memory(store) => store.tabs().await,
        }
    }

    async fn delete_rows(&self, sheet_id: i64, start: u32, end: u32) -> Result<(), StoreError> {
        match self {
            StoreHandle::Google(store) => store.delete_rows(sheet_id, start, end).await,
            StoreHandle::Memory(store) => store.delete_rows(sheet_id, start, end).await,
        }
    }
}

/// Text of a cell as the sheet displays it.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}
