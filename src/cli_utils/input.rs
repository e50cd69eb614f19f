use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Local, NaiveDate};
use dialoguer::Input as DialoguerInput;

use crate::cli_utils::{CliError, CliResult};

/// Input utilities
pub struct Input;

impl Input {
    /// Get a string from user input
    pub fn get_string(prompt: &str) -> CliResult<String> {
        Ok(DialoguerInput::new().with_prompt(prompt).interact_text()?)
    }

    /// Get a date, defaulting to today
    pub fn get_date(prompt: &str) -> CliResult<NaiveDate> {
        let input: String = DialoguerInput::new()
            .with_prompt(format!("{} (YYYY-MM-DD)", prompt))
            .default(Local::now().date_naive().to_string())
            .interact_text()?;

        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::ValidationError("Invalid date format".to_string()))
    }

    /// Get a decimal number
    pub fn get_decimal(prompt: &str) -> CliResult<BigDecimal> {
        let input: String = DialoguerInput::new().with_prompt(prompt).interact_text()?;

        BigDecimal::from_str(input.trim())
            .map_err(|_| CliError::ValidationError("Invalid decimal format".to_string()))
    }

    /// Get a positive integer
    pub fn get_u32(prompt: &str) -> CliResult<u32> {
        let input: String = DialoguerInput::new().with_prompt(prompt).interact_text()?;

        input
            .trim()
            .parse::<u32>()
            .map_err(|_| CliError::ValidationError("Invalid number format".to_string()))
    }

    /// Select from a list
    pub fn select_from_list(prompt: &str, items: Vec<&str>) -> CliResult<usize> {
        use dialoguer::Select;
        Ok(Select::new().with_prompt(prompt).items(&items).interact()?)
    }
}
