use super::history::build_history;
use super::profile::assemble_profile;
use crate::errors::LedgerError;
use crate::models::{ClientProfile, Purchase, Reward};
use crate::storage::{persist_profiles, read_purchases};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Fixes the redemption simulation and synthesized fields when set.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub clients: usize,
    pub purchases: usize,
    pub skipped: usize,
    pub output: PathBuf,
}

/// Output of a successful run: the summary plus the exact bytes written.
#[derive(Debug)]
pub struct Generated {
    pub report: GenerationReport,
    pub payload: Vec<u8>,
}

/// Groups purchases by client in order of first appearance.
pub fn group_by_client(purchases: &[Purchase]) -> Vec<(&str, Vec<&Purchase>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Purchase>)> = Vec::new();

    for purchase in purchases {
        let id = purchase.client_id.as_str();
        let slot = *index.entry(id).or_insert_with(|| {
            groups.push((id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(purchase);
    }

    groups
}

/// Computes one loyalty profile per client. Pure apart from `rng`.
pub fn generate_profiles<R: Rng + ?Sized>(
    purchases: &[Purchase],
    today: NaiveDate,
    catalog: &[Reward],
    rng: &mut R,
) -> Vec<ClientProfile> {
    group_by_client(purchases)
        .into_iter()
        .map(|(client_id, client_purchases)| {
            let history = build_history(&client_purchases, today, catalog, &mut *rng);
            assemble_profile(client_id, &client_purchases, history, catalog, today, &mut *rng)
        })
        .collect()
}

pub async fn run_generation(options: &GenerationOptions) -> Result<Generated, LedgerError> {
    run_generation_at(options, Local::now().date_naive()).await
}

/// Reads the purchases export, rebuilds every profile from scratch and
/// atomically replaces the ledger file.
pub async fn run_generation_at(
    options: &GenerationOptions,
    today: NaiveDate,
) -> Result<Generated, LedgerError> {
    info!(input = %options.input.display(), seed = ?options.seed, "generating loyalty ledger");

    let ingested = read_purchases(&options.input).await?;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let profiles = generate_profiles(&ingested.purchases, today, &super::CATALOG, &mut rng);
    let payload = persist_profiles(&options.output, &profiles).await?;

    let report = GenerationReport {
        clients: profiles.len(),
        purchases: ingested.purchases.len(),
        skipped: ingested.skipped,
        output: options.output.clone(),
    };
    info!(
        clients = report.clients,
        purchases = report.purchases,
        skipped = report.skipped,
        output = %report.output.display(),
        "loyalty ledger written"
    );

    Ok(Generated { report, payload })
}
