pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ingest;
pub mod loyalty;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;

pub use app::router;
pub use config::AppConfig;
pub use errors::{AppError, LedgerError};
pub use state::AppState;
pub use storage::{load_purchases, read_purchases};
