use crate::models::Purchase;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub purchases_path: PathBuf,
    pub loyalty_path: PathBuf,
    pub loyalty_seed: Option<u64>,
    /// Snapshot loaded at startup; aggregates are recomputed from it per request.
    pub purchases: Arc<Vec<Purchase>>,
    /// Held while the ledger file is being generated on demand.
    pub generation: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        purchases_path: PathBuf,
        loyalty_path: PathBuf,
        loyalty_seed: Option<u64>,
        purchases: Vec<Purchase>,
    ) -> Self {
        Self {
            purchases_path,
            loyalty_path,
            loyalty_seed,
            purchases: Arc::new(purchases),
            generation: Arc::new(Mutex::new(())),
        }
    }
}
