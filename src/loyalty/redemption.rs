use super::accrual::signed_points;
use super::random_past_date;
use super::rewards::cheapest_cost;
use crate::models::{EntryKind, LedgerEntry, Reward};
use chrono::NaiveDate;
use rand::Rng;

/// At most this many redemption attempts per client.
const MAX_ATTEMPTS: u64 = 5;
/// Redemptions are backdated up to this many days.
const REDEMPTION_WINDOW_DAYS: i64 = 180;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redemptions {
    pub entries: Vec<LedgerEntry>,
    pub total_cost: u64,
}

/// Spends part of `accrued` points on randomly chosen rewards.
///
/// Draws an attempt count, then for each attempt picks a reward uniformly
/// from `catalog`. An attempt whose reward no longer fits the remaining
/// budget is dropped, so the client may end up under-spending. The committed
/// total never exceeds `accrued`.
pub fn simulate_redemptions<R: Rng + ?Sized>(
    accrued: u64,
    today: NaiveDate,
    catalog: &[Reward],
    rng: &mut R,
) -> Redemptions {
    let mut redemptions = Redemptions::default();
    let Some(cheapest) = cheapest_cost(catalog) else {
        return redemptions;
    };

    let attempts = rng.gen_range(0..MAX_ATTEMPTS).min(accrued / cheapest);
    for _ in 0..attempts {
        let reward = &catalog[rng.gen_range(0..catalog.len())];
        if accrued - redemptions.total_cost < reward.cost {
            continue;
        }

        redemptions.entries.push(LedgerEntry {
            date: random_past_date(today, REDEMPTION_WINDOW_DAYS, rng),
            kind: EntryKind::Redemption,
            points: -signed_points(reward.cost),
            description: format!("Utilisation de la récompense: {}", reward.name),
            reward_id: Some(reward.id),
        });
        redemptions.total_cost += reward.cost;
    }

    redemptions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::rewards::CATALOG;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }

    #[test]
    fn never_overspends_for_any_seed() {
        for seed in 0..500u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let accrued = seed * 13 % 4_000;
            let redemptions = simulate_redemptions(accrued, today(), &CATALOG, &mut rng);
            assert!(redemptions.total_cost <= accrued, "seed {seed} overspent");

            let summed: u64 = redemptions
                .entries
                .iter()
                .map(|entry| entry.points.unsigned_abs())
                .sum();
            assert_eq!(summed, redemptions.total_cost);
        }
    }

    #[test]
    fn entries_reference_catalog_costs_within_window() {
        let earliest = today() - chrono::Duration::days(REDEMPTION_WINDOW_DAYS);
        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let redemptions = simulate_redemptions(10_000, today(), &CATALOG, &mut rng);
            for entry in &redemptions.entries {
                assert_eq!(entry.kind, EntryKind::Redemption);
                assert!(entry.points < 0);
                let reward = CATALOG
                    .iter()
                    .find(|reward| Some(reward.id) == entry.reward_id)
                    .expect("reward id from catalog");
                assert_eq!(entry.points, -(reward.cost as i64));
                assert!(entry.date <= today() && entry.date > earliest);
            }
        }
    }

    #[test]
    fn small_balances_redeem_nothing() {
        for seed in 0..100u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let redemptions = simulate_redemptions(299, today(), &CATALOG, &mut rng);
            assert!(redemptions.entries.is_empty());
            assert_eq!(redemptions.total_cost, 0);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let first = simulate_redemptions(5_000, today(), &CATALOG, &mut StdRng::seed_from_u64(7));
        let second = simulate_redemptions(5_000, today(), &CATALOG, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_catalog_redeems_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            simulate_redemptions(10_000, today(), &[], &mut rng),
            Redemptions::default()
        );
    }
}
