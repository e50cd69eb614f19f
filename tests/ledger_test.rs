mod common;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use sheet_ledger::ledger::LedgerError;
use sheet_ledger::ledger::config::LedgerProcessorConfig;
use sheet_ledger::ledger::db_types::Tab;
use sheet_ledger::ledger::processor_enums::*;
use sheet_ledger::sheets::SheetStore;
use sheet_ledger::utils::app_config::AppConfig;
use sheet_ledger::utils::traits::ActionProcessor;

use common::{data_rows, test_app};

fn clock() -> LedgerProcessorConfig {
    LedgerProcessorConfig {
        now: DateTime::parse_from_rfc3339("2024-01-05T08:30:00.250Z")
            .unwrap()
            .with_timezone(&Utc),
    }
}

async fn run(
    app_config: &AppConfig,
    input: LedgerProcessorInput,
) -> Result<LedgerProcessorOutput, LedgerError> {
    input.process(app_config, &mut clock()).await
}

async fn listing(app_config: &AppConfig) -> LedgerListing {
    match run(app_config, LedgerProcessorInput::ListEntries).await.unwrap() {
        LedgerProcessorOutput::ListEntries(listing) => listing,
        other => panic!("unexpected output {:?}", other),
    }
}

fn expense(date: &str, description: &str, amount: Value) -> LedgerProcessorInput {
    LedgerProcessorInput::AppendExpense(AppendExpenseInputArgs {
        date: Some(date.to_string()),
        description: Some(description.to_string()),
        amount: Some(amount),
    })
}

fn fund(date: &str, amount: Value) -> LedgerProcessorInput {
    LedgerProcessorInput::AppendFund(AppendFundInputArgs {
        date: Some(date.to_string()),
        amount: Some(amount),
    })
}

fn delete(sheet: &str, row_index: u32) -> LedgerProcessorInput {
    LedgerProcessorInput::DeleteRow(DeleteRowInputArgs {
        sheet_name: sheet.to_string(),
        row_index,
        row_key: None,
    })
}

#[tokio::test]
async fn appended_expense_fills_every_column() {
    let (app_config, sheets) = test_app().await;

    run(&app_config, expense("2024-01-05", "Coffee", json!(4.5))).await.unwrap();

    let rows = data_rows(&sheets, "Expenses").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0],
        vec!["2024-01-05T08:30:00.250Z", "2024-01-05", "", "", "Coffee", "Other", "4.5", "Personal"]
    );

    let listed = listing(&app_config).await;
    assert_eq!(listed.expenses[0].last(), Some(&json!(2)));
}

#[tokio::test]
async fn each_append_adds_one_row_at_the_end() {
    let (app_config, _) = test_app().await;

    for (i, amount) in ["100", "25.5", "7"].iter().enumerate() {
        run(&app_config, fund(&format!("2024-01-0{}", i + 1), json!(amount))).await.unwrap();
        assert_eq!(listing(&app_config).await.funds.len(), i + 1);
    }

    let listed = listing(&app_config).await;
    assert_eq!(
        listed.funds,
        vec![
            vec![json!("2024-01-01"), json!("100"), json!(2)],
            vec![json!("2024-01-02"), json!("25.5"), json!(3)],
            vec![json!("2024-01-03"), json!("7"), json!(4)],
        ]
    );
    assert!(listed.expenses.is_empty());
}

#[tokio::test]
async fn delete_shifts_later_rows_up() {
    let (app_config, _) = test_app().await;
    for name in ["a", "b", "c"] {
        run(&app_config, expense("2024-01-05", name, json!(1))).await.unwrap();
    }

    run(&app_config, delete("Expenses", 3)).await.unwrap();

    let listed = listing(&app_config).await;
    let names: Vec<(&Value, &Value)> = listed.expenses.iter().map(|r| (&r[4], &r[8])).collect();
    assert_eq!(names, vec![(&json!("a"), &json!(2)), (&json!("c"), &json!(3))]);
}

#[tokio::test]
async fn repeated_delete_hits_a_different_row_or_nothing() {
    let (app_config, _) = test_app().await;
    run(&app_config, fund("2024-01-01", json!(1))).await.unwrap();
    run(&app_config, fund("2024-01-02", json!(2))).await.unwrap();

    run(&app_config, delete("Funds", 3)).await.unwrap();
    let err = run(&app_config, delete("Funds", 3)).await.unwrap_err();
    assert!(matches!(err, LedgerError::RowNotFound { row_index: 3, .. }));

    let listed = listing(&app_config).await;
    assert_eq!(listed.funds, vec![vec![json!("2024-01-01"), json!("1"), json!(2)]]);
}

#[tokio::test]
async fn row_key_pins_the_row_that_was_listed() {
    let (app_config, _) = test_app().await;
    run(&app_config, fund("2024-01-01", json!(1))).await.unwrap();
    run(&app_config, fund("2024-01-02", json!(2))).await.unwrap();

    let key = match run(&app_config, LedgerProcessorInput::ListTyped).await.unwrap() {
        LedgerProcessorOutput::ListTyped(listing) => listing.funds[1].key,
        other => panic!("unexpected output {:?}", other),
    };

    run(&app_config, delete("Funds", 2)).await.unwrap();
    run(&app_config, fund("2024-01-03", json!(3))).await.unwrap();

    let stale = LedgerProcessorInput::DeleteRow(DeleteRowInputArgs {
        sheet_name: "Funds".to_string(),
        row_index: 3,
        row_key: Some(key),
    });
    let err = run(&app_config, stale).await.unwrap_err();
    assert!(matches!(err, LedgerError::RowChanged { row_index: 3, .. }));
    assert_eq!(listing(&app_config).await.funds.len(), 2);
}

#[tokio::test]
async fn unknown_sheet_is_not_found() {
    let (app_config, sheets) = test_app().await;
    run(&app_config, fund("2024-01-01", json!(1))).await.unwrap();

    let err = run(&app_config, delete("funds", 2)).await.unwrap_err();
    assert!(matches!(err, LedgerError::SheetNotFound(ref name) if name == "funds"));
    assert_eq!(data_rows(&sheets, "Funds").await.len(), 1);
}

#[tokio::test]
async fn summary_rolls_up_the_store() {
    let (app_config, _) = test_app().await;
    run(&app_config, fund("2024-03-01", json!(200))).await.unwrap();
    run(&app_config, expense("2024-03-10", "Lunch", json!("12.50"))).await.unwrap();
    run(&app_config, expense("2024-02-10", "Book", json!(30))).await.unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let input = LedgerProcessorInput::Summary(SummaryInputArgs { today });
    let summary = match run(&app_config, input).await.unwrap() {
        LedgerProcessorOutput::Summary(summary) => summary,
        other => panic!("unexpected output {:?}", other),
    };

    assert_eq!(summary.today_expenses.to_string(), "12.5");
    assert_eq!(summary.month_expenses.to_string(), "12.5");
    assert_eq!(summary.total_expenses.to_string(), "42.5");
    assert_eq!(summary.available_balance.to_string(), "157.5");
}

#[tokio::test]
async fn summary_skips_amounts_it_cannot_read() {
    let (app_config, sheets) = test_app().await;
    sheets
        .append_row(
            &Tab::Funds.append_range(),
            vec![json!("2024-03-01"), json!("Rs. 400")],
        )
        .await
        .unwrap();
    for amount in ["4,5", "(5.00)", "4.5"] {
        let mut cells = vec![Value::Null; 8];
        cells[1] = json!("2024-03-10");
        cells[4] = json!("typed by hand");
        cells[6] = json!(amount);
        sheets
            .append_row(&Tab::Expenses.append_range(), cells)
            .await
            .unwrap();
    }

    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let input = LedgerProcessorInput::Summary(SummaryInputArgs { today });
    let summary = match run(&app_config, input).await.unwrap() {
        LedgerProcessorOutput::Summary(summary) => summary,
        other => panic!("unexpected output {:?}", other),
    };

    assert_eq!(summary.total_funds.to_string(), "400");
    assert_eq!(summary.today_expenses.to_string(), "4.5");
    assert_eq!(summary.total_expenses.to_string(), "4.5");
    assert_eq!(summary.available_balance.to_string(), "395.5");
}
