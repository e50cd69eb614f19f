use std::path::PathBuf;

use clap::Parser;

use crate::utils::app_config::StoreSettings;

#[derive(Parser, Debug, Clone)]
#[command(name = "sheet-ledger", about = "Expense and fund tracker backed by a spreadsheet")]
pub struct ApiConfig {
    #[clap(long, env, default_value_t = 3000)]
    pub port: u16,

    /// Directory served for paths no API route matches.
    #[clap(long, env, default_value = "public")]
    pub static_dir: PathBuf,

    #[clap(flatten)]
    pub store: StoreSettings,
}

impl ApiConfig {
    /// The static directory, if it exists.
    pub fn frontend_dir(&self) -> Option<PathBuf> {
        if self.static_dir.is_dir() {
            Some(self.static_dir.clone())
        } else {
            tracing::warn!(
                "static dir {} not found, serving API only",
                self.static_dir.display()
            );
            None
        }
    }
}
