//! Loyalty ledger generation: point accrual, simulated redemptions, per-client
//! history and profile assembly, and the batch pass that ties them together.

pub mod accrual;
pub mod generator;
pub mod history;
pub mod profile;
pub mod redemption;
pub mod rewards;

use chrono::{Duration, NaiveDate};
use rand::Rng;

pub use accrual::accrual_points;
pub use generator::{
    Generated, GenerationOptions, GenerationReport, generate_profiles, run_generation,
    run_generation_at,
};
pub use history::{History, build_history};
pub use profile::assemble_profile;
pub use redemption::{Redemptions, simulate_redemptions};
pub use rewards::CATALOG;

/// Uniformly random day in `[today - max_days_ago + 1, today]`.
pub(crate) fn random_past_date<R: Rng + ?Sized>(
    today: NaiveDate,
    max_days_ago: i64,
    rng: &mut R,
) -> NaiveDate {
    if max_days_ago <= 0 {
        return today;
    }
    today - Duration::days(rng.gen_range(0..max_days_ago))
}
