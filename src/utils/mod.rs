pub mod app_config;
pub mod retry;
pub mod traits;
