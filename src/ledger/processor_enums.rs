use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ledger::db_types::{ExpenseRecord, FundRecord};

/// Expense fields as they arrive from a caller; validation happens in
/// `operations::validate_expense`.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppendExpenseInputArgs {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Value>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppendFundInputArgs {
    pub date: Option<String>,
    pub amount: Option<Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeleteRowInputArgs {
    pub sheet_name: String,
    /// 1-based position including the header row, as listed.
    pub row_index: u32,
    /// Key observed when the row was listed; guards against shifted rows.
    pub row_key: Option<Uuid>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SummaryInputArgs {
    pub today: NaiveDate,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum LedgerProcessorInput {
    ListEntries,
    ListTyped,
    AppendExpense(AppendExpenseInputArgs),
    AppendFund(AppendFundInputArgs),
    DeleteRow(DeleteRowInputArgs),
    Summary(SummaryInputArgs),
}

/// Raw rows, each with its position appended as a trailing number.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct LedgerListing {
    pub expenses: Vec<Vec<Value>>,
    pub funds: Vec<Vec<Value>>,
}

#[derive(Serialize, Debug, Clone)]
pub struct TypedListing {
    pub schema_version: u32,
    pub expenses: Vec<ExpenseRecord>,
    pub funds: Vec<FundRecord>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub today: NaiveDate,
    pub today_expenses: BigDecimal,
    pub month_expenses: BigDecimal,
    pub total_expenses: BigDecimal,
    pub total_funds: BigDecimal,
    pub available_balance: BigDecimal,
}

#[derive(Serialize, Debug)]
pub enum LedgerProcessorOutput {
    ListEntries(LedgerListing),
    ListTyped(TypedListing),
    AppendExpense,
    AppendFund,
    DeleteRow,
    Summary(LedgerSummary),
}
