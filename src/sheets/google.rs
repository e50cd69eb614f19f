use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{Value, json};

use super::auth::{Scope, ServiceAccountKey, TokenSource};
use super::{CallKind, SheetRange, SheetStore, StoreError, TabInfo};
use crate::utils::retry::ExponentialBackoffRetry;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_delay_ms: u64,
    pub max_retries: u32,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Sheets v4 REST client bound to one spreadsheet.
#[derive(Clone)]
pub struct GoogleSheets {
    http: Client,
    api_base: Url,
    spreadsheet_id: String,
    tokens: Arc<TokenSource>,
    retry: RetryPolicy,
}

impl GoogleSheets {
    pub fn new(
        api_base: &str,
        spreadsheet_id: String,
        key: ServiceAccountKey,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .with_context(|| format!("invalid Sheets API base url {}", api_base))?;
        if api_base.cannot_be_a_base() {
            anyhow::bail!("Sheets API base url {} cannot hold a path", api_base);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let tokens = TokenSource::new(key, http.clone())?;
        tracing::info!(
            "Sheets client for spreadsheet {} as {}",
            spreadsheet_id,
            tokens.client_email()
        );

        Ok(Self {
            http,
            api_base,
            spreadsheet_id,
            tokens: Arc::new(tokens),
            retry,
        })
    }

    fn spreadsheet_url(&self, suffix: &str) -> Result<Url, StoreError> {
        spreadsheet_url(&self.api_base, &self.spreadsheet_id, suffix)
    }

    fn values_url(&self, range: &SheetRange, action: Option<&str>) -> Result<Url, StoreError> {
        values_url(&self.api_base, &self.spreadsheet_id, range, action)
    }

    /// Runs one API call under the retry policy. A rejected token is dropped
    /// and the call is made once more with a fresh one; the store never acted
    /// on the rejected request, so this holds for writes too.
    async fn call<T, F>(&self, kind: CallKind, scope: Scope, build: F) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut refreshed = false;
        loop {
            let mut retry =
                ExponentialBackoffRetry::new(self.retry.base_delay_ms, self.retry.max_retries);
            let result = retry
                .execute(
                    || self.send_once(scope, &build),
                    |e: &StoreError| e.is_transient(kind),
                )
                .await;

            match result {
                Err(StoreError::TokenRejected(message)) if !refreshed => {
                    tracing::warn!("access token rejected ({}), fetching a new one", message);
                    refreshed = true;
                }
                other => return other,
            }
        }
    }

    async fn send_once<T, F>(&self, scope: Scope, build: &F) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.tokens.token(scope).await?;
        let response = build(&self.http)
            .bearer_auth(token)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate(scope).await;
                return Err(StoreError::TokenRejected(message));
            }
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn spreadsheet_url(base: &Url, spreadsheet_id: &str, suffix: &str) -> Result<Url, StoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| StoreError::Transport("sheets base url cannot hold a path".to_string()))?
        .pop_if_empty()
        .push(&format!("{}{}", spreadsheet_id, suffix));
    Ok(url)
}

fn values_url(
    base: &Url,
    spreadsheet_id: &str,
    range: &SheetRange,
    action: Option<&str>,
) -> Result<Url, StoreError> {
    let mut url = spreadsheet_url(base, spreadsheet_id, "")?;
    let segment = match action {
        Some(action) => format!("{}:{}", range.a1(), action),
        None => range.a1(),
    };
    url.path_segments_mut()
        .map_err(|_| StoreError::Transport("sheets base url cannot hold a path".to_string()))?
        .push("values")
        .push(&segment);
    Ok(url)
}

impl SheetStore for GoogleSheets {
    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<Value>>, StoreError> {
        let url = self.values_url(range, None)?;
        let render: &[(&str, &str)] = if range.unformatted {
            &[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ]
        } else {
            &[]
        };
        let body: ValueRange = self
            .call(CallKind::Read, Scope::ReadOnly, |http| {
                http.get(url.clone()).query(render)
            })
            .await?;
        Ok(body.values)
    }

    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), StoreError> {
        let url = self.values_url(range, Some("append"))?;
        let payload = json!({ "values": [row] });
        let _: IgnoredAny = self
            .call(CallKind::Write, Scope::ReadWrite, |http| {
                http.post(url.clone())
                    .query(&[
                        ("valueInputOption", "USER_ENTERED"),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&payload)
            })
            .await?;
        Ok(())
    }

    async fn tabs(&self) -> Result<Vec<TabInfo>, StoreError> {
        let url = self.spreadsheet_url("")?;
        let meta: SpreadsheetMeta = self
            .call(CallKind::Read, Scope::ReadOnly, |http| {
                http.get(url.clone()).query(&[("fields", "sheets.properties(sheetId,title)")])
            })
            .await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| TabInfo {
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .collect())
    }

    async fn delete_rows(&self, sheet_id: i64, start: u32, end: u32) -> Result<(), StoreError> {
        let url = self.spreadsheet_url(":batchUpdate")?;
        let payload = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": end,
                    }
                }
            }]
        });
        let _: IgnoredAny = self
            .call(CallKind::Write, Scope::ReadWrite, |http| {
                http.post(url.clone()).json(&payload)
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::{Method, Uri},
        routing::post,
    };

    const TEST_KEY_PEM: &str = include_str!("testdata/service_key.pem");

    fn google_base() -> Url {
        Url::parse(DEFAULT_API_BASE).unwrap()
    }

    #[test]
    fn values_url_encodes_range_as_one_segment() {
        let range = SheetRange::new("Expenses", 2, 8);
        let url = values_url(&google_base(), "abc123", &range, None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Expenses!A2:H"
        );
    }

    #[test]
    fn append_url_carries_action_suffix() {
        let range = SheetRange::new("Funds", 1, 2);
        let url = values_url(&google_base(), "abc123", &range, Some("append")).unwrap();
        assert!(url.as_str().ends_with("/values/Funds!A1:B:append"));
    }

    #[test]
    fn quoted_tab_names_are_percent_encoded() {
        let range = SheetRange::new("My Funds", 1, 2);
        let url = values_url(&google_base(), "abc123", &range, None).unwrap();
        assert!(url.as_str().contains("'My%20Funds'!A1:B"));
    }

    #[test]
    fn batch_update_url() {
        let url = spreadsheet_url(&google_base(), "abc123", ":batchUpdate").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123:batchUpdate"
        );
    }

    #[test]
    fn base_url_with_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:9/v4/spreadsheets/").unwrap();
        let url = spreadsheet_url(&base, "abc123", "").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/v4/spreadsheets/abc123");
    }

    #[test]
    fn error_bodies_decode_google_message() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        let parsed: GoogleErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "The caller does not have permission");
    }

    #[test]
    fn empty_ranges_decode_without_values() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"range":"Funds!A2:B1000","majorDimension":"ROWS"}"#).unwrap();
        assert!(parsed.values.is_empty());
    }

    #[derive(Debug, Clone)]
    struct Recorded {
        method: Method,
        path: String,
        query: Vec<(String, String)>,
        body: Value,
    }

    impl Recorded {
        fn query_value(&self, name: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Local stand-in for the token endpoint and the Sheets API. Sheets calls
    /// are answered from a script; once it runs dry they get `200 {}`.
    #[derive(Default)]
    struct FakeGoogle {
        requests: Mutex<Vec<Recorded>>,
        script: Mutex<VecDeque<(u16, Value)>>,
        tokens_issued: AtomicUsize,
    }

    impl FakeGoogle {
        fn respond(&self, status: u16, body: Value) {
            self.script.lock().unwrap().push_back((status, body));
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn issue_token(State(fake): State<Arc<FakeGoogle>>) -> Json<Value> {
        let n = fake.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
        Json(json!({ "access_token": format!("token-{}", n), "expires_in": 3600 }))
    }

    async fn sheets_api(
        State(fake): State<Arc<FakeGoogle>>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> (axum::http::StatusCode, Json<Value>) {
        let url = Url::parse(&format!("http://fake{}", uri)).unwrap();
        fake.requests.lock().unwrap().push(Recorded {
            method,
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });

        let (status, body) = fake
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((200, json!({})));
        (axum::http::StatusCode::from_u16(status).unwrap(), Json(body))
    }

    async fn fake_sheets() -> (GoogleSheets, Arc<FakeGoogle>) {
        let fake = Arc::new(FakeGoogle::default());
        let app = Router::new()
            .route("/token", post(issue_token))
            .fallback(sheets_api)
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let key = ServiceAccountKey {
            client_email: "ledger@test.iam.gserviceaccount.com".to_string(),
            private_key: TEST_KEY_PEM.to_string(),
            token_uri: format!("http://{}/token", addr),
        };
        let sheets = GoogleSheets::new(
            &format!("http://{}/v4/spreadsheets", addr),
            "sheet1".to_string(),
            key,
            Duration::from_secs(5),
            RetryPolicy {
                base_delay_ms: 1,
                max_retries: 2,
            },
        )
        .unwrap();
        (sheets, fake)
    }

    fn unavailable() -> Value {
        json!({ "error": { "code": 503, "message": "The service is currently unavailable." } })
    }

    #[tokio::test]
    async fn reads_values_with_render_options() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(200, json!({ "values": [["2024-01-01", 400]] }));

        let rows = sheets
            .read_rows(&SheetRange::new("Funds", 2, 2).unformatted())
            .await
            .unwrap();

        assert_eq!(rows, vec![vec![json!("2024-01-01"), json!(400)]]);
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].path, "/v4/spreadsheets/sheet1/values/Funds!A2:B");
        assert_eq!(
            requests[0].query_value("valueRenderOption"),
            Some("UNFORMATTED_VALUE")
        );
        assert_eq!(
            requests[0].query_value("dateTimeRenderOption"),
            Some("FORMATTED_STRING")
        );
    }

    #[tokio::test]
    async fn formatted_reads_send_no_render_options() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(200, json!({ "range": "Funds!A2:B1000" }));

        let rows = sheets
            .read_rows(&SheetRange::new("Funds", 2, 2))
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert!(fake.requests()[0].query.is_empty());
    }

    #[tokio::test]
    async fn append_sends_user_entered_rows() {
        let (sheets, fake) = fake_sheets().await;

        sheets
            .append_row(
                &SheetRange::new("Funds", 1, 2),
                vec![json!("2024-01-01"), json!("400")],
            )
            .await
            .unwrap();

        let request = &fake.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/v4/spreadsheets/sheet1/values/Funds!A1:B:append");
        assert_eq!(request.query_value("valueInputOption"), Some("USER_ENTERED"));
        assert_eq!(request.query_value("insertDataOption"), Some("INSERT_ROWS"));
        assert_eq!(request.body, json!({ "values": [["2024-01-01", "400"]] }));
    }

    #[tokio::test]
    async fn tabs_request_only_sheet_properties() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(
            200,
            json!({ "sheets": [
                { "properties": { "sheetId": 0, "title": "Expenses" } },
                { "properties": { "sheetId": 1843, "title": "Funds" } },
            ] }),
        );

        let tabs = sheets.tabs().await.unwrap();

        assert_eq!(
            tabs,
            vec![
                TabInfo { sheet_id: 0, title: "Expenses".to_string() },
                TabInfo { sheet_id: 1843, title: "Funds".to_string() },
            ]
        );
        let request = &fake.requests()[0];
        assert_eq!(request.path, "/v4/spreadsheets/sheet1");
        assert_eq!(
            request.query_value("fields"),
            Some("sheets.properties(sheetId,title)")
        );
    }

    #[tokio::test]
    async fn delete_sends_half_open_row_range() {
        let (sheets, fake) = fake_sheets().await;

        sheets.delete_rows(1843, 4, 5).await.unwrap();

        let request = &fake.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/v4/spreadsheets/sheet1:batchUpdate");
        assert_eq!(
            request.body,
            json!({ "requests": [{ "deleteDimension": { "range": {
                "sheetId": 1843,
                "dimension": "ROWS",
                "startIndex": 4,
                "endIndex": 5,
            } } }] })
        );
    }

    #[tokio::test]
    async fn google_error_message_is_passed_through() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(
            403,
            json!({ "error": { "code": 403, "message": "The caller does not have permission" } }),
        );

        let err = sheets.tabs().await.unwrap_err();

        assert_eq!(
            err,
            StoreError::Status {
                status: 403,
                message: "The caller does not have permission".to_string(),
            }
        );
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_reads_are_retried() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(503, unavailable());
        fake.respond(200, json!({ "values": [["2024-01-01", "10"]] }));

        let rows = sheets
            .read_rows(&SheetRange::new("Funds", 2, 2))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(fake.requests().len(), 2);
    }

    #[tokio::test]
    async fn unavailable_writes_are_not_retried() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(503, unavailable());

        let err = sheets
            .append_row(&SheetRange::new("Funds", 1, 2), vec![json!("2024-01-01")])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Status { status: 503, .. }));
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_once() {
        let (sheets, fake) = fake_sheets().await;
        fake.respond(401, json!({ "error": { "code": 401, "message": "Invalid Credentials" } }));

        sheets.delete_rows(0, 1, 2).await.unwrap();

        assert_eq!(fake.requests().len(), 2);
        assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn token_rejected_twice_fails() {
        let (sheets, fake) = fake_sheets().await;
        for _ in 0..2 {
            fake.respond(401, json!({ "error": { "code": 401, "message": "Invalid Credentials" } }));
        }

        let err = sheets.tabs().await.unwrap_err();

        assert_eq!(err, StoreError::TokenRejected("Invalid Credentials".to_string()));
        assert_eq!(fake.requests().len(), 2);
    }
}
