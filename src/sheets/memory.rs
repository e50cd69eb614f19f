use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use super::{SheetRange, SheetStore, StoreError, TabInfo, cell_text};

#[derive(Debug, Clone)]
struct MemoryTab {
    sheet_id: i64,
    title: String,
    /// Row 0 is the first sheet row; cells are stored as displayed text.
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tabs: Vec<MemoryTab>,
    fail_next: Option<StoreError>,
}

/// In-process spreadsheet that behaves like the Sheets values API: displayed
/// text comes back, trailing blanks are trimmed, and deletes shift rows up.
#[derive(Debug, Clone, Default)]
pub struct MemorySheets {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tab whose first row holds the given headers.
    pub async fn add_tab(&self, title: &str, headers: &[&str]) -> i64 {
        let mut state = self.state.lock().await;
        let sheet_id = state.tabs.iter().map(|t| t.sheet_id + 1).max().unwrap_or(0);
        state.tabs.push(MemoryTab {
            sheet_id,
            title: title.to_string(),
            rows: vec![headers.iter().map(|h| h.to_string()).collect()],
        });
        sheet_id
    }

    /// The next store call fails with `err` instead of running.
    pub async fn fail_next(&self, err: StoreError) {
        self.state.lock().await.fail_next = Some(err);
    }

    /// Every row of a tab including the header, for assertions.
    pub async fn snapshot(&self, title: &str) -> Option<Vec<Vec<String>>> {
        let state = self.state.lock().await;
        state
            .tabs
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.rows.clone())
    }

    fn take_failure(state: &mut MemoryState) -> Result<(), StoreError> {
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn tab_mut<'a>(state: &'a mut MemoryState, title: &str) -> Result<&'a mut MemoryTab, StoreError> {
        state
            .tabs
            .iter_mut()
            .find(|t| t.title == title)
            .ok_or_else(|| StoreError::Status {
                status: 400,
                message: format!("Unable to parse range: {}", title),
            })
    }
}

fn trim_trailing_blanks(mut cells: Vec<String>) -> Vec<String> {
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

/// Unformatted reads hand numeric cells back as numbers, like the Sheets API.
fn render(text: String, unformatted: bool) -> Value {
    if unformatted && let Ok(number) = text.parse::<serde_json::Number>() {
        return Value::Number(number);
    }
    Value::String(text)
}

impl SheetStore for MemorySheets {
    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<Value>>, StoreError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state)?;
        let tab = Self::tab_mut(&mut state, &range.tab)?;

        let skip = range.first_row.saturating_sub(1) as usize;
        let width = range.columns as usize;
        let mut rows: Vec<Vec<Value>> = tab
            .rows
            .iter()
            .skip(skip)
            .map(|row| {
                let cells = row.iter().take(width).cloned().collect();
                trim_trailing_blanks(cells)
                    .into_iter()
                    .map(|text| render(text, range.unformatted))
                    .collect()
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state)?;
        let tab = Self::tab_mut(&mut state, &range.tab)?;

        while tab.rows.last().is_some_and(|r| r.iter().all(|c| c.is_empty())) {
            tab.rows.pop();
        }
        tab.rows.push(row.iter().map(cell_text).collect());
        Ok(())
    }

    async fn tabs(&self) -> Result<Vec<TabInfo>, StoreError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state)?;
        Ok(state
            .tabs
            .iter()
            .map(|t| TabInfo {
                sheet_id: t.sheet_id,
                title: t.title.clone(),
            })
            .collect())
    }

    async fn delete_rows(&self, sheet_id: i64, start: u32, end: u32) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state)?;
        let tab = state
            .tabs
            .iter_mut()
            .find(|t| t.sheet_id == sheet_id)
            .ok_or_else(|| StoreError::Status {
                status: 400,
                message: format!("No grid with id: {}", sheet_id),
            })?;

        let (start, end) = (start as usize, end as usize);
        if start >= end || start >= tab.rows.len() {
            return Err(StoreError::Status {
                status: 400,
                message: format!("Invalid row range [{}, {})", start, end),
            });
        }
        tab.rows.drain(start..end.min(tab.rows.len()));
        Ok(())
    }
}
