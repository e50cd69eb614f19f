use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct LedgerProcessorConfig {
    /// Stamped into the timestamp column of appended expenses.
    pub now: DateTime<Utc>,
}

impl LedgerProcessorConfig {
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }
}
