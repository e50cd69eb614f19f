use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::sheets::{SheetRange, cell_text};

/// Bumped whenever a tab gains, loses or reorders a column.
pub const SCHEMA_VERSION: u32 = 1;

/// Rows above the first data row in every tab.
pub const HEADER_ROWS: u32 = 1;

/// Position of the first data row.
pub const FIRST_DATA_ROW: u32 = HEADER_ROWS + 1;

pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_BUDGET_LABEL: &str = "Personal";

const ROW_KEY_NAMESPACE: Uuid = Uuid::from_u128(0x8f3c2a61_4b7e_4d0a_9c15_2e6b7d9a0f41);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Expenses,
    Funds,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Expenses, Tab::Funds];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Expenses => "Expenses",
            Tab::Funds => "Funds",
        }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        match self {
            Tab::Expenses => ExpenseColumn::ALL.iter().map(|c| c.header()).collect(),
            Tab::Funds => FundColumn::ALL.iter().map(|c| c.header()).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Tab::Expenses => ExpenseColumn::ALL.len() as u32,
            Tab::Funds => FundColumn::ALL.len() as u32,
        }
    }

    /// Every data row, header excluded.
    pub fn data_range(&self) -> SheetRange {
        SheetRange::new(self.title(), FIRST_DATA_ROW, self.width())
    }

    /// Data rows with numeric cells as numbers, for decoding amounts. Row keys
    /// are computed over this rendering.
    pub fn value_range(&self) -> SheetRange {
        self.data_range().unformatted()
    }

    /// Anchor for appends; the store finds the end of the table itself.
    pub fn append_range(&self) -> SheetRange {
        SheetRange::new(self.title(), 1, self.width())
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Tab {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL.into_iter().find(|t| t.title() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseColumn {
    Timestamp,
    ExpenseDate,
    Day,
    Month,
    Description,
    Category,
    Amount,
    BudgetLabel,
}

impl ExpenseColumn {
    pub const ALL: [ExpenseColumn; 8] = [
        ExpenseColumn::Timestamp,
        ExpenseColumn::ExpenseDate,
        ExpenseColumn::Day,
        ExpenseColumn::Month,
        ExpenseColumn::Description,
        ExpenseColumn::Category,
        ExpenseColumn::Amount,
        ExpenseColumn::BudgetLabel,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(&self) -> &'static str {
        match self {
            ExpenseColumn::Timestamp => "Timestamp",
            ExpenseColumn::ExpenseDate => "Date",
            ExpenseColumn::Day => "Day",
            ExpenseColumn::Month => "Month",
            ExpenseColumn::Description => "Description",
            ExpenseColumn::Category => "Type",
            ExpenseColumn::Amount => "Amount",
            ExpenseColumn::BudgetLabel => "Budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundColumn {
    DepositDate,
    Amount,
}

impl FundColumn {
    pub const ALL: [FundColumn; 2] = [FundColumn::DepositDate, FundColumn::Amount];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(&self) -> &'static str {
        match self {
            FundColumn::DepositDate => "Date",
            FundColumn::Amount => "Amount",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: BigDecimal,
}

impl NewExpense {
    pub fn to_cells(&self) -> Vec<Value> {
        let mut cells = vec![Value::Null; ExpenseColumn::ALL.len()];
        cells[ExpenseColumn::Timestamp.index()] =
            Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true));
        cells[ExpenseColumn::ExpenseDate.index()] = Value::String(self.date.to_string());
        cells[ExpenseColumn::Description.index()] = Value::String(self.description.clone());
        cells[ExpenseColumn::Category.index()] = Value::String(DEFAULT_CATEGORY.to_string());
        cells[ExpenseColumn::Amount.index()] = Value::String(plain_amount(&self.amount));
        cells[ExpenseColumn::BudgetLabel.index()] = Value::String(DEFAULT_BUDGET_LABEL.to_string());
        cells
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFund {
    pub date: NaiveDate,
    pub amount: BigDecimal,
}

impl NewFund {
    pub fn to_cells(&self) -> Vec<Value> {
        let mut cells = vec![Value::Null; FundColumn::ALL.len()];
        cells[FundColumn::DepositDate.index()] = Value::String(self.date.to_string());
        cells[FundColumn::Amount.index()] = Value::String(plain_amount(&self.amount));
        cells
    }
}

/// Content-derived key for a row as it reads right now. Two reads of an
/// untouched row agree; any edit or shift to a different row changes it.
pub fn row_key(tab: Tab, cells: &[Value]) -> Uuid {
    let mut texts: Vec<String> = cells.iter().map(cell_text).collect();
    while texts.last().is_some_and(|t| t.is_empty()) {
        texts.pop();
    }
    let mut name = tab.title().as_bytes().to_vec();
    for text in texts {
        name.push(0x1f);
        name.extend_from_slice(text.as_bytes());
    }
    Uuid::new_v5(&ROW_KEY_NAMESPACE, &name)
}

/// Decimal text without insignificant trailing zeros: `4.50` -> `4.5`.
pub fn plain_amount(amount: &BigDecimal) -> String {
    let text = amount.to_string();
    if text.contains('.') && !text.contains(['e', 'E']) {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn text_at(cells: &[Value], index: usize) -> String {
    cells.get(index).map(cell_text).unwrap_or_default()
}

fn optional_text_at(cells: &[Value], index: usize) -> Option<String> {
    Some(text_at(cells, index)).filter(|t| !t.is_empty())
}

/// Amount text as a person or a number format shows it: an optional currency
/// token, an optional sign, digits with `,` only between groups of three, and
/// at most one `.`. Anything else is unreadable.
pub fn parse_amount_text(text: &str) -> Option<BigDecimal> {
    let number = strip_currency(text.trim());
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number.strip_prefix('+').unwrap_or(number)),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    if let Some(fraction) = fraction
        && (fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let whole = match (whole.is_empty(), fraction) {
        (true, Some(_)) => "0".to_string(),
        _ => grouped_digits(whole)?,
    };

    let plain = match fraction {
        Some(fraction) => format!("{}{}.{}", sign, whole, fraction),
        None => format!("{}{}", sign, whole),
    };
    BigDecimal::from_str(&plain).ok()
}

fn strip_currency(text: &str) -> &str {
    if let Some((token, rest)) = text.split_once(char::is_whitespace)
        && is_currency_token(token)
    {
        return rest.trim_start();
    }
    text.trim_start_matches(|c: char| c == '$' || (!c.is_ascii() && !c.is_numeric()))
}

/// `$`, `USD`, `Rs.`, `€`.
fn is_currency_token(token: &str) -> bool {
    let core = token.strip_suffix('.').unwrap_or(token);
    !core.is_empty()
        && core.chars().count() <= 3
        && core.chars().all(|c| c.is_alphabetic() || c == '$' || !c.is_ascii())
}

fn grouped_digits(whole: &str) -> Option<String> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let mut groups = whole.split(',');
    let head = groups.next()?;
    let mut digits = head.to_string();
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !all_digits(group) {
            return None;
        }
        grouped = true;
        digits.push_str(group);
    }

    (all_digits(head) && (!grouped || head.len() <= 3)).then_some(digits)
}

/// Unformatted reads give numbers; cells typed as text go through
/// `parse_amount_text`.
fn amount_at(cells: &[Value], index: usize) -> Option<BigDecimal> {
    match cells.get(index)? {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        other => parse_amount_text(&cell_text(other)),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub position: u32,
    pub key: Uuid,
    pub timestamp: String,
    pub expense_date: String,
    pub day: Option<String>,
    pub month: Option<String>,
    pub description: String,
    pub category: String,
    pub amount: Option<BigDecimal>,
    pub budget_label: String,
}

impl ExpenseRecord {
    pub fn from_cells(position: u32, cells: &[Value]) -> Self {
        let amount_text = text_at(cells, ExpenseColumn::Amount.index());
        let amount = amount_at(cells, ExpenseColumn::Amount.index());
        if amount.is_none() && !amount_text.is_empty() {
            tracing::warn!("expense row {} has a non-numeric amount {:?}", position, amount_text);
        }
        Self {
            position,
            key: row_key(Tab::Expenses, cells),
            timestamp: text_at(cells, ExpenseColumn::Timestamp.index()),
            expense_date: text_at(cells, ExpenseColumn::ExpenseDate.index()),
            day: optional_text_at(cells, ExpenseColumn::Day.index()),
            month: optional_text_at(cells, ExpenseColumn::Month.index()),
            description: text_at(cells, ExpenseColumn::Description.index()),
            category: text_at(cells, ExpenseColumn::Category.index()),
            amount,
            budget_label: text_at(cells, ExpenseColumn::BudgetLabel.index()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FundRecord {
    pub position: u32,
    pub key: Uuid,
    pub deposit_date: String,
    pub amount: Option<BigDecimal>,
}

impl FundRecord {
    pub fn from_cells(position: u32, cells: &[Value]) -> Self {
        let amount_text = text_at(cells, FundColumn::Amount.index());
        let amount = amount_at(cells, FundColumn::Amount.index());
        if amount.is_none() && !amount_text.is_empty() {
            tracing::warn!("fund row {} has a non-numeric amount {:?}", position, amount_text);
        }
        Self {
            position,
            key: row_key(Tab::Funds, cells),
            deposit_date: text_at(cells, FundColumn::DepositDate.index()),
            amount,
        }
    }
}
