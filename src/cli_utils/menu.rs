use crate::cli_utils::CliResult;
use dialoguer::Select;

/// Interactive menu builder
pub struct Menu {
    title: String,
    items: Vec<String>,
}

impl Menu {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
        }
    }

    pub fn items(mut self, items: Vec<&str>) -> Self {
        self.items.extend(items.iter().map(|s| s.to_string()));
        self
    }

    /// Show the menu and get the selected index
    pub fn interact(&self) -> CliResult<usize> {
        let item_refs: Vec<&str> = self.items.iter().map(|s| s.as_str()).collect();
        Ok(Select::new()
            .with_prompt(&self.title)
            .items(&item_refs)
            .default(0)
            .interact()?)
    }
}

/// Top-level ledger operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    List,
    Summary,
    AddExpense,
    AddFund,
    Delete,
    Quit,
}

impl Operation {
    const ALL: [Operation; 6] = [
        Operation::List,
        Operation::Summary,
        Operation::AddExpense,
        Operation::AddFund,
        Operation::Delete,
        Operation::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Operation::List => "List entries",
            Operation::Summary => "Summary",
            Operation::AddExpense => "Add expense",
            Operation::AddFund => "Add fund",
            Operation::Delete => "Delete a row",
            Operation::Quit => "Quit",
        }
    }

    /// Show operation selection menu
    pub fn select() -> CliResult<Self> {
        let menu = Menu::new("Select operation")
            .items(Self::ALL.iter().map(|op| op.label()).collect());

        Ok(Self::ALL
            .get(menu.interact()?)
            .copied()
            .unwrap_or(Operation::Quit))
    }
}

/// Yes/No confirmation
pub fn confirm_operation(message: &str) -> CliResult<bool> {
    use dialoguer::Confirm;
    Ok(Confirm::new().with_prompt(message).interact()?)
}
