use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

use crate::ledger::LedgerError;
use crate::ledger::config::LedgerProcessorConfig;
use crate::ledger::processor_enums::{LedgerProcessorInput, LedgerProcessorOutput};
use crate::utils::app_config::AppConfig;
use crate::utils::traits::ActionProcessor;

/// Initialize AppConfig for CLI operations
pub async fn initialize_app_config() -> Result<AppConfig> {
    AppConfig::from_env().await
}

/// Run one ledger operation with a fresh clock
pub async fn call_ledger(
    input: LedgerProcessorInput,
    app_config: &AppConfig,
) -> Result<LedgerProcessorOutput, LedgerError> {
    let mut config = LedgerProcessorConfig::now();
    input.process(app_config, &mut config).await
}

/// Prompt user to retry a failed operation
pub fn prompt_retry() -> Result<bool> {
    loop {
        print!("Operation failed. Retry? (y/n): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                println!("Please enter 'y' or 'n'");
                continue;
            }
        }
    }
}

/// Execute an operation, offering a retry when the store was unreachable.
/// Validation and not-found failures are returned straight away.
pub async fn execute_with_retry<F, Fut, T>(operation: F) -> Result<T, LedgerError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, LedgerError>>,
{
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e @ LedgerError::Upstream(_)) => {
                eprintln!("\n{}: {}\n", "Error".red(), e);

                if prompt_retry().unwrap_or(false) {
                    continue;
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}
