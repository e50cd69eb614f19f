use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    api::{
        error::ApiError,
        extractors::ApiJson,
        response::ApiResponse,
        validation::{validate_not_empty, validate_row_index},
    },
    ledger::{
        config::LedgerProcessorConfig,
        processor_enums::{
            AppendExpenseInputArgs, AppendFundInputArgs, DeleteRowInputArgs, LedgerListing,
            LedgerProcessorInput, LedgerProcessorOutput, LedgerSummary, SummaryInputArgs,
            TypedListing,
        },
    },
    utils::{app_config::AppConfig, traits::ActionProcessor},
};

#[derive(Deserialize, Debug)]
pub struct AddEntryRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Option<Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryRequest {
    pub sheet_name: Option<String>,
    pub row_index: Option<Value>,
    pub row_key: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct SummaryQuery {
    pub today: Option<NaiveDate>,
}

async fn run(app_config: &AppConfig, input: LedgerProcessorInput) -> Result<LedgerProcessorOutput, ApiError> {
    let mut config = LedgerProcessorConfig::now();
    Ok(input.process(app_config, &mut config).await?)
}

/// `data` may be absent, in which case every field is reported missing.
fn entry_fields<T: for<'de> Deserialize<'de> + Default>(data: Option<Value>) -> Result<T, ApiError> {
    match data {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|e| ApiError::bad_request(format!("Invalid entry data: {}", e))),
        Some(_) => Err(ApiError::bad_request("data must be a JSON object")),
    }
}

/// GET /data - both tabs as raw rows, each ending in its row position
pub async fn get_data(State(app_config): State<AppConfig>) -> Result<Json<LedgerListing>, ApiError> {
    match run(&app_config, LedgerProcessorInput::ListEntries).await? {
        LedgerProcessorOutput::ListEntries(listing) => Ok(Json(listing)),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

/// GET /entries - both tabs decoded against the row schema
pub async fn get_entries(State(app_config): State<AppConfig>) -> Result<Json<TypedListing>, ApiError> {
    match run(&app_config, LedgerProcessorInput::ListTyped).await? {
        LedgerProcessorOutput::ListTyped(listing) => Ok(Json(listing)),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

/// GET /summary?today=YYYY-MM-DD
pub async fn get_summary(
    State(app_config): State<AppConfig>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<LedgerSummary>, ApiError> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());

    match run(&app_config, LedgerProcessorInput::Summary(SummaryInputArgs { today })).await? {
        LedgerProcessorOutput::Summary(summary) => Ok(Json(summary)),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

/// POST /add
///
/// { "type": "expense", "data": { "date", "description", "amount" } }
/// { "type": "fund", "data": { "date", "amount" } }
pub async fn add_entry(
    State(app_config): State<AppConfig>,
    ApiJson(req): ApiJson<AddEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    let (input, message) = match req.kind.as_deref() {
        Some("expense") => (
            LedgerProcessorInput::AppendExpense(entry_fields::<AppendExpenseInputArgs>(req.data)?),
            "Expense added successfully",
        ),
        Some("fund") => (
            LedgerProcessorInput::AppendFund(entry_fields::<AppendFundInputArgs>(req.data)?),
            "Fund added successfully",
        ),
        _ => {
            return Err(ApiError::bad_request(
                "Invalid type specified. Must be \"expense\" or \"fund\".",
            ));
        }
    };

    run(&app_config, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::message(message))))
}

/// POST /delete - { "sheetName", "rowIndex", "rowKey"? }
pub async fn delete_entry(
    State(app_config): State<AppConfig>,
    ApiJson(req): ApiJson<DeleteEntryRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let sheet_name = validate_not_empty(req.sheet_name.as_deref(), "sheetName")?;
    let row_index = validate_row_index(req.row_index.as_ref())?;

    let input = LedgerProcessorInput::DeleteRow(DeleteRowInputArgs {
        sheet_name,
        row_index,
        row_key: req.row_key,
    });

    run(&app_config, input).await?;
    Ok(Json(ApiResponse::message("Row deleted successfully")))
}
