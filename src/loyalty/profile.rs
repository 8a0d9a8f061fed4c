use super::history::History;
use super::random_past_date;
use crate::models::{ClientProfile, Demographics, Purchase, RedeemedReward, Reward, Tier};
use chrono::NaiveDate;
use rand::Rng;

/// A client with no purchase for this many days is inactive.
pub const ACTIVITY_WINDOW_DAYS: i64 = 90;
/// Enrollment dates are backdated up to two years.
const ENROLLMENT_WINDOW_DAYS: i64 = 730;
const SYNTHESIZED_AGE: std::ops::Range<u32> = 20..60;

/// Demographics with every field filled, either from the source records or
/// from the per-field defaults below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDemographics {
    pub name: String,
    pub email: String,
    pub sex: String,
    pub age: u32,
}

/// Merges demographics across a client's purchases; the first record that
/// carries a field wins.
pub fn known_demographics(purchases: &[&Purchase]) -> Demographics {
    purchases
        .iter()
        .fold(Demographics::default(), |mut known, purchase| {
            let source = &purchase.demographics;
            known.name = known.name.or_else(|| source.name.clone());
            known.email = known.email.or_else(|| source.email.clone());
            known.sex = known.sex.or_else(|| source.sex.clone());
            known.age = known.age.or(source.age);
            known
        })
}

pub fn resolve_demographics<R: Rng + ?Sized>(
    client_id: &str,
    known: Demographics,
    rng: &mut R,
) -> ResolvedDemographics {
    ResolvedDemographics {
        name: known.name.unwrap_or_else(|| default_name(client_id)),
        email: known.email.unwrap_or_else(|| default_email(client_id)),
        sex: known.sex.unwrap_or_else(|| synthesized_sex(rng)),
        age: known.age.unwrap_or_else(|| rng.gen_range(SYNTHESIZED_AGE)),
    }
}

pub fn default_name(client_id: &str) -> String {
    format!("Client {client_id}")
}

pub fn default_email(client_id: &str) -> String {
    format!("client{client_id}@example.com")
}

fn synthesized_sex<R: Rng + ?Sized>(rng: &mut R) -> String {
    let sex = if rng.gen_bool(0.5) { "Homme" } else { "Femme" };
    sex.to_string()
}

pub fn is_active(last_purchase: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_purchase.is_some_and(|date| (today - date).num_days() < ACTIVITY_WINDOW_DAYS)
}

/// Builds the loyalty record of one client from its purchases and ledger.
pub fn assemble_profile<R: Rng + ?Sized>(
    client_id: &str,
    purchases: &[&Purchase],
    history: History,
    catalog: &[Reward],
    today: NaiveDate,
    rng: &mut R,
) -> ClientProfile {
    let demographics = resolve_demographics(client_id, known_demographics(purchases), rng);
    let enrolled_on = random_past_date(today, ENROLLMENT_WINDOW_DAYS, rng);
    let last_purchase = purchases.iter().filter_map(|purchase| purchase.date).max();

    let redeemed_rewards = history
        .redemptions
        .iter()
        .filter_map(|entry| {
            let reward = super::rewards::find(catalog, entry.reward_id?)?;
            Some(RedeemedReward {
                id: reward.id,
                name: reward.name.to_string(),
                cost: entry.points.unsigned_abs(),
                redeemed_on: entry.date,
            })
        })
        .collect();

    ClientProfile {
        client_id: client_id.to_string(),
        name: demographics.name,
        email: demographics.email,
        sex: demographics.sex,
        age: demographics.age,
        enrolled_on,
        last_purchase,
        purchase_count: purchases.len() as u64,
        balance: history.balance(),
        lifetime_accrued: history.accrued,
        lifetime_redeemed: history.redeemed,
        tier: Tier::from_points(history.accrued),
        active: is_active(last_purchase, today),
        ledger: history.entries,
        redeemed_rewards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::history::build_history;
    use crate::loyalty::rewards::CATALOG;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }

    fn purchase(date: Option<NaiveDate>, total: f64, demographics: Demographics) -> Purchase {
        Purchase {
            client_id: "17".to_string(),
            ticket_id: None,
            date,
            time: None,
            total,
            items: Vec::new(),
            product_count: None,
            store: None,
            demographics,
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(Tier::from_points(0), Tier::Bronze);
        assert_eq!(Tier::from_points(499), Tier::Bronze);
        assert_eq!(Tier::from_points(500), Tier::Argent);
        assert_eq!(Tier::from_points(999), Tier::Argent);
        assert_eq!(Tier::from_points(1000), Tier::Or);
        assert_eq!(Tier::from_points(1999), Tier::Or);
        assert_eq!(Tier::from_points(2000), Tier::Platine);
    }

    #[test]
    fn activity_window() {
        let today = today();
        assert!(is_active(Some(today), today));
        assert!(is_active(Some(today - chrono::Duration::days(89)), today));
        assert!(!is_active(Some(today - chrono::Duration::days(90)), today));
        assert!(!is_active(None, today));
    }

    #[test]
    fn zero_purchases_gives_empty_bronze_profile() {
        let mut rng = StdRng::seed_from_u64(11);
        let history = build_history(&[], today(), &CATALOG, &mut rng);
        let profile = assemble_profile("99", &[], history, &CATALOG, today(), &mut rng);

        assert_eq!(profile.balance, 0);
        assert_eq!(profile.tier, Tier::Bronze);
        assert!(profile.ledger.is_empty());
        assert!(profile.redeemed_rewards.is_empty());
        assert!(!profile.active);
        assert_eq!(profile.name, "Client 99");
        assert_eq!(profile.email, "client99@example.com");
        assert!(SYNTHESIZED_AGE.contains(&profile.age));
        assert!(profile.sex == "Homme" || profile.sex == "Femme");
    }

    #[test]
    fn source_demographics_win_over_defaults() {
        let first = purchase(
            NaiveDate::from_ymd_opt(2026, 1, 10),
            10.0,
            Demographics {
                name: None,
                email: Some("ines@exemple.fr".to_string()),
                sex: None,
                age: Some(41),
            },
        );
        let second = purchase(
            NaiveDate::from_ymd_opt(2026, 6, 20),
            10.0,
            Demographics {
                name: Some("Inès Roux".to_string()),
                email: Some("autre@exemple.fr".to_string()),
                sex: Some("Femme".to_string()),
                age: Some(12),
            },
        );

        let known = known_demographics(&[&first, &second]);
        let resolved = resolve_demographics("17", known, &mut StdRng::seed_from_u64(0));
        assert_eq!(
            resolved,
            ResolvedDemographics {
                name: "Inès Roux".to_string(),
                email: "ines@exemple.fr".to_string(),
                sex: "Femme".to_string(),
                age: 41,
            }
        );
    }

    #[test]
    fn profile_totals_and_rewards_agree_with_ledger() {
        let purchases: Vec<Purchase> = (1..=20)
            .map(|day| {
                purchase(
                    NaiveDate::from_ymd_opt(2026, 5, day),
                    180.0,
                    Demographics::default(),
                )
            })
            .collect();
        let refs: Vec<&Purchase> = purchases.iter().collect();

        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let history = build_history(&refs, today(), &CATALOG, &mut rng);
            let profile = assemble_profile("17", &refs, history, &CATALOG, today(), &mut rng);

            assert_eq!(profile.lifetime_accrued, 20 * 230);
            assert_eq!(
                profile.balance,
                profile.lifetime_accrued as i64 - profile.lifetime_redeemed as i64
            );
            assert_eq!(profile.tier, Tier::Platine);
            assert_eq!(profile.purchase_count, 20);
            assert_eq!(profile.last_purchase, NaiveDate::from_ymd_opt(2026, 5, 20));
            assert!(profile.active);

            let reward_total: u64 = profile.redeemed_rewards.iter().map(|reward| reward.cost).sum();
            assert_eq!(reward_total, profile.lifetime_redeemed);
        }
    }
}
