use super::accrual::{MAX_POINTS, accrual_points, signed_points};
use super::random_past_date;
use super::redemption::{Redemptions, simulate_redemptions};
use crate::models::{EntryKind, LedgerEntry, Purchase, Reward};
use chrono::NaiveDate;
use rand::Rng;

/// Purchases without a usable date are placed somewhere in the last year.
const UNDATED_PURCHASE_WINDOW_DAYS: i64 = 365;

/// Ledger of one client plus the totals derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    /// Accruals and redemptions, most recent first.
    pub entries: Vec<LedgerEntry>,
    /// Redemption entries in the order they were simulated.
    pub redemptions: Vec<LedgerEntry>,
    pub accrued: u64,
    pub redeemed: u64,
}

impl History {
    pub fn balance(&self) -> i64 {
        signed_points(self.accrued).saturating_sub(signed_points(self.redeemed))
    }
}

pub fn build_history<R: Rng + ?Sized>(
    purchases: &[&Purchase],
    today: NaiveDate,
    catalog: &[Reward],
    rng: &mut R,
) -> History {
    let mut entries = Vec::with_capacity(purchases.len());
    let mut accrued = 0u64;

    for purchase in purchases {
        let points = accrual_points(purchase);
        // Accrual entries are strictly positive; a worthless ticket leaves no trace.
        if points == 0 {
            continue;
        }
        accrued = accrued.saturating_add(points).min(MAX_POINTS);

        let date = purchase
            .date
            .unwrap_or_else(|| random_past_date(today, UNDATED_PURCHASE_WINDOW_DAYS, rng));
        let ticket = purchase.ticket_id.as_deref().unwrap_or("N/A");
        entries.push(LedgerEntry {
            date,
            kind: EntryKind::Accrual,
            points: signed_points(points),
            description: format!("Achat en magasin - Ticket #{ticket}"),
            reward_id: None,
        });
    }

    let Redemptions {
        entries: redemptions,
        total_cost: redeemed,
    } = simulate_redemptions(accrued, today, catalog, rng);

    entries.extend(redemptions.iter().cloned());
    // Stable: same-day entries keep accrual-then-redemption insertion order.
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    History {
        entries,
        redemptions,
        accrued,
        redeemed,
    }
}
