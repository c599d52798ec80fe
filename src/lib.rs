//! Search core for an Austrian property marketplace: shared filter state,
//! filter composition, location and category pickers, accumulating
//! pagination and map marker sync, plus the HTTP clients behind them.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod search;
pub mod selection;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, ApiResult};
