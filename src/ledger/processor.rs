use crate::ledger::config::LedgerProcessorConfig;
use crate::ledger::error::LedgerError;
use crate::ledger::operations::{
    append_expense, append_fund, delete_row, list_entries, list_typed, validate_expense,
    validate_fund,
};
use crate::ledger::summary::summarize;
use crate::utils::app_config::AppConfig;
use crate::utils::traits::ActionProcessor;

use super::processor_enums::*;

impl ActionProcessor<LedgerProcessorConfig, LedgerProcessorOutput> for LedgerProcessorInput {
    type Error = LedgerError;

    async fn process(
        &self,
        app_config: &AppConfig,
        local_config: &mut LedgerProcessorConfig,
    ) -> Result<LedgerProcessorOutput, LedgerError> {
        let store = &app_config.store;

        match self {
            LedgerProcessorInput::ListEntries => {
                let listing = list_entries(store).await?;
                Ok(LedgerProcessorOutput::ListEntries(listing))
            }
            LedgerProcessorInput::ListTyped => {
                let listing = list_typed(store).await?;
                Ok(LedgerProcessorOutput::ListTyped(listing))
            }
            LedgerProcessorInput::AppendExpense(args) => {
                // validated before any store call so a bad request never mutates
                let expense = validate_expense(args, local_config.now)?;
                append_expense(store, &expense).await?;
                Ok(LedgerProcessorOutput::AppendExpense)
            }
            LedgerProcessorInput::AppendFund(args) => {
                let fund = validate_fund(args)?;
                append_fund(store, &fund).await?;
                Ok(LedgerProcessorOutput::AppendFund)
            }
            LedgerProcessorInput::DeleteRow(args) => {
                delete_row(store, args).await?;
                Ok(LedgerProcessorOutput::DeleteRow)
            }
            LedgerProcessorInput::Summary(args) => {
                let listing = list_typed(store).await?;
                Ok(LedgerProcessorOutput::Summary(summarize(&listing, args.today)))
            }
        }
    }
}
