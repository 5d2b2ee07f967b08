pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod runner;
pub mod store;

pub use config::AppConfig;
pub use error::{EngineError, Result};
pub use runner::{RunOutcome, TrackerRunner};
