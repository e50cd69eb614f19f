use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::ledger::db_types::{
    ExpenseRecord, FIRST_DATA_ROW, FundRecord, NewExpense, NewFund, SCHEMA_VERSION, Tab, row_key,
};
use crate::ledger::error::LedgerError;
use crate::ledger::processor_enums::{
    AppendExpenseInputArgs, AppendFundInputArgs, DeleteRowInputArgs, LedgerListing, TypedListing,
};
use crate::sheets::SheetStore;

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, LedgerError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(LedgerError::MissingField(field)),
    }
}

fn required_date(value: &Option<String>, field: &'static str) -> Result<NaiveDate, LedgerError> {
    let text = required_text(value, field)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|_| LedgerError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", text)))
}

fn required_amount(value: &Option<Value>, field: &'static str) -> Result<BigDecimal, LedgerError> {
    let amount = match value {
        None | Some(Value::Null) => return Err(LedgerError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(LedgerError::MissingField(field));
        }
        Some(Value::Number(n)) => BigDecimal::from_str(&n.to_string()),
        Some(Value::String(s)) => BigDecimal::from_str(s.trim()),
        Some(other) => {
            return Err(LedgerError::invalid(field, format!("expected a number, got {}", other)));
        }
    }
    .map_err(|_| LedgerError::invalid(field, "not a decimal number"))?;

    if amount <= BigDecimal::zero() {
        return Err(LedgerError::invalid(field, "must be greater than zero"));
    }
    Ok(amount)
}

pub fn validate_expense(
    args: &AppendExpenseInputArgs,
    now: DateTime<Utc>,
) -> Result<NewExpense, LedgerError> {
    let date = required_date(&args.date, "date")?;
    let description = required_text(&args.description, "description")?;
    let amount = required_amount(&args.amount, "amount")?;
    Ok(NewExpense {
        created_at: now,
        date,
        description,
        amount,
    })
}

pub fn validate_fund(args: &AppendFundInputArgs) -> Result<NewFund, LedgerError> {
    let date = required_date(&args.date, "date")?;
    let amount = required_amount(&args.amount, "amount")?;
    Ok(NewFund { date, amount })
}

/// Pads each row to the tab width and appends its 1-based sheet position.
fn with_positions(tab: Tab, rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let width = tab.width() as usize;
    rows.into_iter()
        .enumerate()
        .map(|(offset, mut row)| {
            if row.len() < width {
                row.resize(width, Value::String(String::new()));
            }
            row.push(Value::from(offset as u32 + FIRST_DATA_ROW));
            row
        })
        .collect()
}

pub async fn list_entries<S: SheetStore>(store: &S) -> Result<LedgerListing, LedgerError> {
    let expenses = store.read_rows(&Tab::Expenses.data_range()).await?;
    let funds = store.read_rows(&Tab::Funds.data_range()).await?;

    Ok(LedgerListing {
        expenses: with_positions(Tab::Expenses, expenses),
        funds: with_positions(Tab::Funds, funds),
    })
}

pub async fn list_typed<S: SheetStore>(store: &S) -> Result<TypedListing, LedgerError> {
    let expenses = store.read_rows(&Tab::Expenses.value_range()).await?;
    let funds = store.read_rows(&Tab::Funds.value_range()).await?;

    Ok(TypedListing {
        schema_version: SCHEMA_VERSION,
        expenses: expenses
            .iter()
            .enumerate()
            .map(|(offset, cells)| ExpenseRecord::from_cells(offset as u32 + FIRST_DATA_ROW, cells))
            .collect(),
        funds: funds
            .iter()
            .enumerate()
            .map(|(offset, cells)| FundRecord::from_cells(offset as u32 + FIRST_DATA_ROW, cells))
            .collect(),
    })
}

pub async fn append_expense<S: SheetStore>(
    store: &S,
    expense: &NewExpense,
) -> Result<(), LedgerError> {
    store
        .append_row(&Tab::Expenses.append_range(), expense.to_cells())
        .await?;
    tracing::info!(
        "appended expense {} {:?} {}",
        expense.date,
        expense.description,
        expense.amount
    );
    Ok(())
}

pub async fn append_fund<S: SheetStore>(store: &S, fund: &NewFund) -> Result<(), LedgerError> {
    store.append_row(&Tab::Funds.append_range(), fund.to_cells()).await?;
    tracing::info!("appended fund {} {}", fund.date, fund.amount);
    Ok(())
}

/// Deletes one row by its listed position. The tab is re-read first so a
/// position past the end fails instead of deleting an empty grid row, and so
/// a supplied row key can be checked against what is there now.
pub async fn delete_row<S: SheetStore>(
    store: &S,
    args: &DeleteRowInputArgs,
) -> Result<(), LedgerError> {
    let tab = Tab::from_str(&args.sheet_name)
        .map_err(|_| LedgerError::SheetNotFound(args.sheet_name.clone()))?;

    if args.row_index < FIRST_DATA_ROW {
        return Err(LedgerError::invalid(
            "rowIndex",
            format!("row {} is the header; data rows start at {}", args.row_index, FIRST_DATA_ROW),
        ));
    }

    let sheet_id = store
        .tabs()
        .await?
        .into_iter()
        .find(|t| t.title == tab.title())
        .map(|t| t.sheet_id)
        .ok_or_else(|| LedgerError::SheetNotFound(args.sheet_name.clone()))?;

    let rows = store.read_rows(&tab.value_range()).await?;
    let current = rows
        .get((args.row_index - FIRST_DATA_ROW) as usize)
        .ok_or_else(|| LedgerError::RowNotFound {
            sheet: tab.title().to_string(),
            row_index: args.row_index,
        })?;

    if let Some(expected) = args.row_key
        && row_key(tab, current) != expected
    {
        return Err(LedgerError::RowChanged {
            sheet: tab.title().to_string(),
            row_index: args.row_index,
            expected,
        });
    }

    store
        .delete_rows(sheet_id, args.row_index - 1, args.row_index)
        .await?;
    tracing::info!("deleted row {} from {}", args.row_index, tab);
    Ok(())
}
