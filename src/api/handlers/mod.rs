pub mod health;
pub mod ledger;

use crate::api::error::ApiError;

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed on this endpoint".to_string())
}
