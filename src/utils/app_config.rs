use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser};
use dotenvy::dotenv;

use crate::ledger::db_types::Tab;
use crate::sheets::auth::ServiceAccountKey;
use crate::sheets::google::{DEFAULT_API_BASE, RetryPolicy};
use crate::sheets::{GoogleSheets, MemorySheets, StoreHandle};

/// Where the ledger lives and how hard to try reaching it.
#[derive(Args, Debug, Clone)]
pub struct StoreSettings {
    /// Identifier of the backing spreadsheet (from its URL).
    #[clap(long, env)]
    pub spreadsheet_id: Option<String>,

    /// Service-account key JSON, inline.
    #[clap(long, env, hide_env_values = true)]
    pub google_credentials: Option<String>,

    /// Sheets v4 `spreadsheets` endpoint.
    #[clap(long, env = "SHEETS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub sheets_api_base: String,

    #[clap(long, env = "SHEETS_REQUEST_TIMEOUT_SECS", default_value_t = 15)]
    pub request_timeout_secs: u64,

    #[clap(long, env = "SHEETS_RETRY_BASE_DELAY_MS", default_value_t = 200)]
    pub retry_base_delay_ms: u64,

    #[clap(long, env = "SHEETS_RETRY_MAX", default_value_t = 2)]
    pub retry_max: u32,

    /// Keep the ledger in process memory instead of a spreadsheet.
    #[clap(long, env = "LEDGER_IN_MEMORY")]
    pub in_memory: bool,
}

#[derive(Parser)]
struct EnvOnly {
    #[clap(flatten)]
    store: StoreSettings,
}

#[derive(Clone)]
pub struct AppConfig {
    pub store: StoreHandle,
}

impl AppConfig {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// An empty in-memory ledger with both tabs and their header rows.
    pub async fn in_memory() -> Self {
        let store = MemorySheets::new();
        for tab in Tab::ALL {
            store.add_tab(tab.title(), &tab.headers()).await;
        }
        Self::new(StoreHandle::Memory(store))
    }

    pub async fn from_settings(settings: &StoreSettings) -> Result<Self> {
        if settings.in_memory {
            tracing::warn!("using in-memory ledger; nothing will be persisted");
            return Ok(Self::in_memory().await);
        }

        let spreadsheet_id = settings
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("SPREADSHEET_ID must be set in .env file or environment variables")
            })?;
        let raw_credentials = settings
            .google_credentials
            .as_deref()
            .ok_or_else(|| {
                anyhow!("GOOGLE_CREDENTIALS must be set in .env file or environment variables")
            })?;
        let key = ServiceAccountKey::from_json(raw_credentials)?;

        let store = GoogleSheets::new(
            &settings.sheets_api_base,
            spreadsheet_id,
            key,
            Duration::from_secs(settings.request_timeout_secs),
            RetryPolicy {
                base_delay_ms: settings.retry_base_delay_ms,
                max_retries: settings.retry_max,
            },
        )?;
        Ok(Self::new(StoreHandle::Google(store)))
    }

    /// Settings from the environment (and `.env`) only, ignoring argv.
    pub async fn from_env() -> Result<Self> {
        let _ = dotenv();
        let parsed = EnvOnly::try_parse_from(["sheet-ledger"]).context("invalid store settings")?;
        Self::from_settings(&parsed.store).await
    }
}
