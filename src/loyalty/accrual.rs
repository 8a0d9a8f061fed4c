use crate::models::Purchase;

const BASE_BONUS_THRESHOLD: f64 = 50.0;
const LARGE_BONUS_THRESHOLD: f64 = 100.0;
const POINTS_PER_ITEM: u64 = 5;

/// Ceiling for any point amount, so every amount fits a signed ledger delta.
pub const MAX_POINTS: u64 = i64::MAX.unsigned_abs();

/// Points awarded for a single purchase: one per whole currency unit, a bonus
/// for large baskets, and a flat amount per line item.
pub fn accrual_points(purchase: &Purchase) -> u64 {
    points_for(purchase.total, purchase.items.len())
}

pub fn points_for(total: f64, line_items: usize) -> u64 {
    let total = if total.is_finite() && total > 0.0 { total } else { 0.0 };
    // Float to integer casts saturate at u64::MAX.
    let whole = total.floor() as u64;
    let items = u64::try_from(line_items).unwrap_or(u64::MAX);
    whole
        .saturating_add(bonus(total))
        .saturating_add(POINTS_PER_ITEM.saturating_mul(items))
        .min(MAX_POINTS)
}

/// Signed ledger delta for a point amount, saturating at `i64::MAX`.
pub fn signed_points(points: u64) -> i64 {
    i64::try_from(points).unwrap_or(i64::MAX)
}

fn bonus(total: f64) -> u64 {
    if total >= LARGE_BONUS_THRESHOLD {
        50
    } else if total >= BASE_BONUS_THRESHOLD {
        20
    } else {
        0
    }
}
