use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, NaiveDate};

use crate::ledger::processor_enums::{LedgerSummary, TypedListing};

/// Dates are written as `YYYY-MM-DD`, but rows typed by hand or carried over
/// from the timestamp column may hold a full RFC 3339 instant.
pub fn record_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

pub fn summarize(listing: &TypedListing, today: NaiveDate) -> LedgerSummary {
    let mut today_expenses = BigDecimal::zero();
    let mut month_expenses = BigDecimal::zero();
    let mut total_expenses = BigDecimal::zero();

    for expense in &listing.expenses {
        let Some(amount) = &expense.amount else {
            continue;
        };
        total_expenses += amount;

        let Some(date) = record_date(&expense.expense_date) else {
            continue;
        };
        if date.year() == today.year() && date.month() == today.month() {
            month_expenses += amount;
            if date == today {
                today_expenses += amount;
            }
        }
    }

    let total_funds = listing
        .funds
        .iter()
        .filter_map(|f| f.amount.as_ref())
        .fold(BigDecimal::zero(), |acc, amount| acc + amount);

    let available_balance = &total_funds - &total_expenses;

    LedgerSummary {
        today,
        today_expenses,
        month_expenses,
        total_expenses,
        total_funds,
        available_balance,
    }
}
