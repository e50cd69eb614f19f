use thiserror::Error;
use uuid::Uuid;

use crate::sheets::StoreError;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Sheet '{0}' not found.")]
    SheetNotFound(String),

    #[error("Row {row_index} not found in sheet '{sheet}'.")]
    RowNotFound { sheet: String, row_index: u32 },

    #[error("Row {row_index} in sheet '{sheet}' no longer matches key {expected}; re-list before deleting.")]
    RowChanged {
        sheet: String,
        row_index: u32,
        expected: Uuid,
    },

    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl LedgerError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
