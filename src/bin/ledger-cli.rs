use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use std::io::Write;

use sheet_ledger::cli_helper::{call_ledger, execute_with_retry, initialize_app_config};
use sheet_ledger::cli_utils::{
    CliError,
    formatting::{format_decimal, format_kv, format_table, print_header, print_section},
    input::Input,
    menu::{Operation, confirm_operation},
    print_error, print_info, print_success, print_warning,
};
use sheet_ledger::ledger::processor_enums::{
    AppendExpenseInputArgs, AppendFundInputArgs, DeleteRowInputArgs, LedgerProcessorInput,
    LedgerProcessorOutput, SummaryInputArgs,
};
use sheet_ledger::utils::app_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    eprintln!("{}", "╔═══════════════════════════════════════════════════════╗".bright_cyan());
    eprintln!("{}", "║         Sheet Ledger CLI                              ║".bright_cyan());
    eprintln!("{}", "╚═══════════════════════════════════════════════════════╝".bright_cyan());
    eprintln!();

    eprint!("Initializing app config... ");
    std::io::stderr().flush().ok();

    let app_config = match initialize_app_config().await {
        Ok(config) => {
            eprintln!("{}", "✓ Ready".green());
            config
        }
        Err(e) => {
            eprintln!("{}", "✗ Failed".red());
            eprintln!("Error: {}", e);
            return Err(e);
        }
    };

    eprintln!();

    loop {
        let op = match Operation::select() {
            Ok(op) => op,
            Err(e) => {
                eprintln!("{}", format!("Error: {}", e).red());
                break;
            }
        };

        let outcome = match op {
            Operation::List => list_entries(&app_config).await,
            Operation::Summary => show_summary(&app_config).await,
            Operation::AddExpense => add_expense(&app_config).await,
            Operation::AddFund => add_fund(&app_config).await,
            Operation::Delete => delete_row(&app_config).await,
            Operation::Quit => {
                eprintln!("{}", "Goodbye!".bright_cyan());
                break;
            }
        };

        match outcome {
            Ok(()) => {}
            Err(CliError::UserCancelled) => print_warning("Cancelled"),
            Err(e) => print_error(&e.to_string()),
        }

        eprintln!();
    }

    Ok(())
}

async fn list_entries(app_config: &AppConfig) -> Result<(), CliError> {
    print_header("Ledger");

    let output =
        execute_with_retry(|| call_ledger(LedgerProcessorInput::ListTyped, app_config)).await?;
    let LedgerProcessorOutput::ListTyped(listing) = output else {
        return Err(CliError::LedgerError("Unexpected output type".to_string()));
    };

    print_section("Expenses");
    let rows: Vec<Vec<String>> = listing
        .expenses
        .iter()
        .map(|e| {
            vec![
                e.position.to_string(),
                e.expense_date.clone(),
                e.description.clone(),
                e.amount.as_ref().map(format_decimal).unwrap_or_default(),
            ]
        })
        .collect();
    format_table(&["Row", "Date", "Description", "Amount"], &rows);

    print_section("Funds");
    let rows: Vec<Vec<String>> = listing
        .funds
        .iter()
        .map(|f| {
            vec![
                f.position.to_string(),
                f.deposit_date.clone(),
                f.amount.as_ref().map(format_decimal).unwrap_or_default(),
            ]
        })
        .collect();
    format_table(&["Row", "Date", "Amount"], &rows);

    Ok(())
}

async fn show_summary(app_config: &AppConfig) -> Result<(), CliError> {
    print_header("Summary");

    let today = chrono::Local::now().date_naive();
    let output = execute_with_retry(|| {
        call_ledger(LedgerProcessorInput::Summary(SummaryInputArgs { today }), app_config)
    })
    .await?;
    let LedgerProcessorOutput::Summary(summary) = output else {
        return Err(CliError::LedgerError("Unexpected output type".to_string()));
    };

    println!("{}", format_kv("Today", &format_decimal(&summary.today_expenses)));
    println!("{}", format_kv("This month", &format_decimal(&summary.month_expenses)));
    println!("{}", format_kv("Total funds", &format_decimal(&summary.total_funds)));
    println!("{}", format_kv("Available", &format_decimal(&summary.available_balance)));

    Ok(())
}

async fn add_expense(app_config: &AppConfig) -> Result<(), CliError> {
    print_header("Add Expense");

    let date = Input::get_date("Date")?;
    let description = Input::get_string("Description")?;
    let amount = Input::get_decimal("Amount")?;

    let args = AppendExpenseInputArgs {
        date: Some(date.to_string()),
        description: Some(description),
        amount: Some(Value::String(amount.to_string())),
    };
    execute_with_retry(|| {
        call_ledger(LedgerProcessorInput::AppendExpense(args.clone()), app_config)
    })
    .await?;

    print_success("Expense added");
    Ok(())
}

async fn add_fund(app_config: &AppConfig) -> Result<(), CliError> {
    print_header("Add Fund");

    let date = Input::get_date("Date")?;
    let amount = Input::get_decimal("Amount")?;

    let args = AppendFundInputArgs {
        date: Some(date.to_string()),
        amount: Some(Value::String(amount.to_string())),
    };
    execute_with_retry(|| {
        call_ledger(LedgerProcessorInput::AppendFund(args.clone()), app_config)
    })
    .await?;

    print_success("Fund added");
    Ok(())
}

async fn delete_row(app_config: &AppConfig) -> Result<(), CliError> {
    print_header("Delete Row");

    let sheets = vec!["Expenses", "Funds"];
    let sheet_name = sheets[Input::select_from_list("Sheet", sheets.clone())?].to_string();
    let row_index = Input::get_u32("Row")?;

    // Positions shift after every delete, so pin the row's current content.
    let output =
        execute_with_retry(|| call_ledger(LedgerProcessorInput::ListTyped, app_config)).await?;
    let LedgerProcessorOutput::ListTyped(listing) = output else {
        return Err(CliError::LedgerError("Unexpected output type".to_string()));
    };

    let found = if sheet_name == "Expenses" {
        listing
            .expenses
            .iter()
            .find(|e| e.position == row_index)
            .map(|e| {
                let amount = e.amount.as_ref().map(format_decimal).unwrap_or_default();
                (e.key, format!("{} {} {}", e.expense_date, e.description, amount))
            })
    } else {
        listing
            .funds
            .iter()
            .find(|f| f.position == row_index)
            .map(|f| {
                let amount = f.amount.as_ref().map(format_decimal).unwrap_or_default();
                (f.key, format!("{} {}", f.deposit_date, amount))
            })
    };
    let Some((key, preview)) = found else {
        print_info(&format!("No row {} in {}", row_index, sheet_name));
        return Ok(());
    };

    if !confirm_operation(&format!("Delete [{}] from {}?", preview, sheet_name))? {
        return Err(CliError::UserCancelled);
    }

    let args = DeleteRowInputArgs {
        sheet_name: sheet_name.clone(),
        row_index,
        row_key: Some(key),
    };
    execute_with_retry(|| {
        call_ledger(LedgerProcessorInput::DeleteRow(args.clone()), app_config)
    })
    .await?;

    print_success(&format!("Deleted row {} from {}", row_index, sheet_name));
    Ok(())
}
