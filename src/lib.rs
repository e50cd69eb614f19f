// Public library interface for sheet-ledger
pub mod api;
pub mod cli_helper;
pub mod cli_utils;
pub mod ledger;
pub mod sheets;
pub mod utils;
