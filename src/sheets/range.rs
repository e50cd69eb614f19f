use std::fmt;

/// A rectangular A1 range anchored at column A: `Tab!A<first_row>:<last column>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub tab: String,
    /// 1-based.
    pub first_row: u32,
    pub columns: u32,
    /// Numbers come back as JSON numbers instead of their displayed text.
    pub unformatted: bool,
}

impl SheetRange {
    pub fn new(tab: impl Into<String>, first_row: u32, columns: u32) -> Self {
        Self {
            tab: tab.into(),
            first_row,
            columns,
            unformatted: false,
        }
    }

    pub fn unformatted(mut self) -> Self {
        self.unformatted = true;
        self
    }

    pub fn a1(&self) -> String {
        format!(
            "{}!A{}:{}",
            quote_tab(&self.tab),
            self.first_row,
            column_letters(self.columns)
        )
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

fn quote_tab(tab: &str) -> String {
    if tab.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    }
}

/// 1 -> A, 26 -> Z, 27 -> AA.
pub fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ledger_ranges() {
        assert_eq!(SheetRange::new("Expenses", 2, 8).a1(), "Expenses!A2:H");
        assert_eq!(SheetRange::new("Funds", 2, 2).a1(), "Funds!A2:B");
    }

    #[test]
    fn quotes_tab_names_with_spaces() {
        assert_eq!(SheetRange::new("My Funds", 1, 2).a1(), "'My Funds'!A1:B");
        assert_eq!(SheetRange::new("Bob's", 1, 1).a1(), "'Bob''s'!A1:A");
    }

    #[test]
    fn render_mode_does_not_change_a1() {
        let range = SheetRange::new("Funds", 2, 2).unformatted();
        assert!(range.unformatted);
        assert_eq!(range.a1(), "Funds!A2:B");
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
    }
}
