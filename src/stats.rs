use crate::models::{
    BucketPoint, CategorySales, ClientProfile, DailySalesPoint, DemographicsBreakdown, EntryKind,
    LoyaltySummary, MonthlyPoints, Purchase, RankedItem, StatsQuery, StatsResponse, SummaryStats,
    Tier,
};
use chrono::{Datelike, Duration, Local, NaiveDate, Timelike};
use std::collections::{BTreeMap, HashMap, HashSet};

const TOP_LIMIT: usize = 5;
const WEEKDAYS: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];
const BASKETS: [(&str, u64); 4] = [
    ("Petit (1-2 articles)", 2),
    ("Moyen (3-5 articles)", 5),
    ("Grand (6-9 articles)", 9),
    ("Très grand (10+ articles)", u64::MAX),
];
const AGE_GROUPS: [(&str, u32); 5] = [
    ("18-24", 24),
    ("25-34", 34),
    ("35-44", 44),
    ("45-54", 54),
    ("55+", u32::MAX),
];
const SEXES: [&str; 2] = ["Femme", "Homme"];
const BALANCE_BANDS: [(&str, i64); 4] = [
    ("0-500", 500),
    ("501-1000", 1000),
    ("1001-2000", 2000),
    ("2001+", i64::MAX),
];
const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Juin", "Juil", "Août", "Sep", "Oct", "Nov", "Déc",
];

/// Rolling window the dashboard filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl Period {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("semaine" | "week") => Period::Week,
            Some("mois" | "month") => Period::Month,
            Some("trimestre" | "quarter") => Period::Quarter,
            Some("annee" | "année" | "year") => Period::Year,
            _ => Period::All,
        }
    }

    pub fn days(self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Quarter => Some(90),
            Period::Year => Some(365),
            Period::All => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Week => "semaine",
            Period::Month => "mois",
            Period::Quarter => "trimestre",
            Period::Year => "annee",
            Period::All => "tout",
        }
    }
}

/// Inclusive date window resolved from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateFilter {
    pub fn resolve(query: &StatsQuery, today: NaiveDate) -> (Self, String) {
        if query.start.is_some() || query.end.is_some() {
            let label = format!(
                "{}..{}",
                query.start.map(|d| d.to_string()).unwrap_or_default(),
                query.end.map(|d| d.to_string()).unwrap_or_default()
            );
            return (
                Self {
                    start: query.start,
                    end: query.end,
                },
                label,
            );
        }

        let period = Period::parse(query.period.as_deref());
        let filter = match period.days() {
            Some(days) => Self {
                start: Some(today - Duration::days(days)),
                end: Some(today),
            },
            None => Self {
                start: None,
                end: None,
            },
        };
        (filter, period.label().to_string())
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Undated purchases only pass an unbounded filter.
    pub fn matches(&self, purchase: &Purchase) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = purchase.date else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

pub fn build_stats(purchases: &[Purchase], query: &StatsQuery) -> StatsResponse {
    build_stats_at(Local::now().date_naive(), purchases, query)
}

pub fn build_stats_at(
    today: NaiveDate,
    purchases: &[Purchase],
    query: &StatsQuery,
) -> StatsResponse {
    let (filter, period) = DateFilter::resolve(query, today);
    let selected: Vec<&Purchase> = purchases.iter().filter(|p| filter.matches(p)).collect();

    StatsResponse {
        period,
        records: selected.len(),
        summary: summary(&selected),
        categories: sales_by_category(&selected),
        top_products: top_products(&selected, TOP_LIMIT),
        top_stores: top_stores(&selected, TOP_LIMIT),
        sales_by_hour: sales_by_hour(&selected),
        sales_by_weekday: sales_by_weekday(&selected),
        basket_sizes: basket_sizes(&selected),
        category_frequency: category_frequency(&selected, TOP_LIMIT),
        daily_sales: daily_sales(&selected),
        demographics: demographics(&selected),
    }
}

pub fn summary(purchases: &[&Purchase]) -> SummaryStats {
    let clients: HashSet<&str> = purchases.iter().map(|p| p.client_id.as_str()).collect();
    let stores: HashSet<&str> = purchases.iter().filter_map(|p| p.store.as_deref()).collect();

    SummaryStats {
        total_sales: purchases.iter().map(|p| p.total).sum(),
        clients: clients.len(),
        products_scanned: purchases.iter().map(|p| p.scanned_products()).sum(),
        stores: stores.len(),
    }
}

pub fn sales_by_category(purchases: &[&Purchase]) -> Vec<CategorySales> {
    let mut totals: HashMap<&str, (f64, u64)> = HashMap::new();
    for item in purchases.iter().flat_map(|p| &p.items) {
        let entry = totals.entry(item.category.as_str()).or_default();
        entry.0 += item.revenue();
        entry.1 += item.quantity;
    }

    let mut categories: Vec<CategorySales> = totals
        .into_iter()
        .filter(|(_, (revenue, units))| *revenue > 0.0 || *units > 0)
        .map(|(category, (revenue, units))| CategorySales {
            category: category.to_string(),
            revenue,
            units,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories
}

pub fn top_products(purchases: &[&Purchase], limit: usize) -> Vec<RankedItem> {
    let mut quantities: HashMap<&str, f64> = HashMap::new();
    for item in purchases.iter().flat_map(|p| &p.items) {
        if item.product.is_empty() {
            continue;
        }
        *quantities.entry(item.product.as_str()).or_default() += item.quantity as f64;
    }
    ranked(quantities, limit)
}

pub fn top_stores(purchases: &[&Purchase], limit: usize) -> Vec<RankedItem> {
    let mut sales: HashMap<&str, f64> = HashMap::new();
    for purchase in purchases {
        if let Some(store) = purchase.store.as_deref() {
            *sales.entry(store).or_default() += purchase.total;
        }
    }
    ranked(sales, limit)
}

fn ranked(values: HashMap<&str, f64>, limit: usize) -> Vec<RankedItem> {
    let mut items: Vec<RankedItem> = values
        .into_iter()
        .map(|(name, value)| RankedItem {
            name: name.to_string(),
            value,
        })
        .collect();
    items.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    items.truncate(limit);
    items
}

pub fn sales_by_hour(purchases: &[&Purchase]) -> Vec<BucketPoint> {
    let mut hours = [0.0f64; 24];
    for purchase in purchases {
        if let Some(time) = purchase.time {
            hours[time.hour() as usize] += purchase.total;
        }
    }
    hours
        .iter()
        .enumerate()
        .map(|(hour, value)| BucketPoint {
            label: format!("{hour}h"),
            value: *value,
        })
        .collect()
}

pub fn sales_by_weekday(purchases: &[&Purchase]) -> Vec<BucketPoint> {
    let mut days = [0.0f64; 7];
    for purchase in purchases {
        if let Some(date) = purchase.date {
            days[date.weekday().num_days_from_monday() as usize] += purchase.total;
        }
    }
    WEEKDAYS
        .iter()
        .zip(days)
        .map(|(label, value)| BucketPoint {
            label: label.to_string(),
            value,
        })
        .collect()
}

pub fn basket_sizes(purchases: &[&Purchase]) -> Vec<BucketPoint> {
    let mut counts = [0u64; BASKETS.len()];
    for purchase in purchases {
        let size = purchase.scanned_products();
        let bucket = BASKETS
            .iter()
            .position(|(_, upper)| size <= *upper)
            .unwrap_or(BASKETS.len() - 1);
        counts[bucket] += 1;
    }
    BASKETS
        .iter()
        .zip(counts)
        .map(|((label, _), count)| BucketPoint {
            label: label.to_string(),
            value: count as f64,
        })
        .collect()
}

/// Line items per category, most frequent first.
pub fn category_frequency(purchases: &[&Purchase], limit: usize) -> Vec<RankedItem> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for item in purchases.iter().flat_map(|p| &p.items) {
        *counts.entry(item.category.as_str()).or_default() += 1.0;
    }
    ranked(counts, limit)
}

/// Age groups and sex split over distinct clients. Each client contributes
/// the first age and sex found among its purchases; clients with neither are
/// left out of the corresponding breakdown.
pub fn demographics(purchases: &[&Purchase]) -> DemographicsBreakdown {
    let mut clients: HashMap<&str, (Option<u32>, Option<&str>)> = HashMap::new();
    for purchase in purchases {
        let known = clients.entry(purchase.client_id.as_str()).or_default();
        known.0 = known.0.or(purchase.demographics.age);
        known.1 = known.1.or(purchase.demographics.sex.as_deref());
    }

    let mut ages = [0usize; AGE_GROUPS.len()];
    let mut sexes = [0usize; SEXES.len()];
    for &(age, sex) in clients.values() {
        if let Some(age) = age {
            let group = AGE_GROUPS
                .iter()
                .position(|(_, upper)| age <= *upper)
                .unwrap_or(AGE_GROUPS.len() - 1);
            ages[group] += 1;
        }
        if let Some(index) = sex.and_then(sex_index) {
            sexes[index] += 1;
        }
    }

    DemographicsBreakdown {
        age_groups: shares(AGE_GROUPS.iter().map(|(label, _)| *label).zip(ages)),
        sex: shares(SEXES.into_iter().zip(sexes)),
    }
}

fn sex_index(sex: &str) -> Option<usize> {
    match sex.trim().to_lowercase().as_str() {
        "femme" | "f" => Some(0),
        "homme" | "h" => Some(1),
        _ => None,
    }
}

fn shares<'a>(counts: impl Iterator<Item = (&'a str, usize)> + Clone) -> Vec<BucketPoint> {
    let total: usize = counts.clone().map(|(_, count)| count).sum();
    counts
        .map(|(label, count)| BucketPoint {
            label: label.to_string(),
            value: percent(count as f64, total as f64, 0),
        })
        .collect()
}

fn percent(part: f64, whole: f64, decimals: i32) -> f64 {
    if whole <= 0.0 || part <= 0.0 {
        return 0.0;
    }
    let scale = 10f64.powi(decimals);
    (part / whole * 100.0 * scale).round() / scale
}

/// Per-day totals, oldest first, with a running total.
pub fn daily_sales(purchases: &[&Purchase]) -> Vec<DailySalesPoint> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for purchase in purchases {
        if let Some(date) = purchase.date {
            *days.entry(date).or_default() += purchase.total;
        }
    }

    let mut running_total = 0.0;
    days.into_iter()
        .map(|(date, total)| {
            running_total += total;
            DailySalesPoint {
                date: date.to_string(),
                total,
                running_total,
            }
        })
        .collect()
}

pub fn loyalty_summary(profiles: &[ClientProfile]) -> LoyaltySummary {
    loyalty_summary_at(Local::now().date_naive(), profiles)
}

pub fn loyalty_summary_at(today: NaiveDate, profiles: &[ClientProfile]) -> LoyaltySummary {
    let mut tiers: BTreeMap<&'static str, usize> =
        [Tier::Bronze, Tier::Argent, Tier::Or, Tier::Platine]
            .into_iter()
            .map(|tier| (tier.label(), 0))
            .collect();
    for profile in profiles {
        *tiers.entry(profile.tier.label()).or_default() += 1;
    }

    LoyaltySummary {
        clients: profiles.len(),
        points_distributed: profiles
            .iter()
            .fold(0u64, |sum, p| sum.saturating_add(p.lifetime_accrued)),
        points_redeemed: profiles
            .iter()
            .fold(0u64, |sum, p| sum.saturating_add(p.lifetime_redeemed)),
        active_clients: profiles.iter().filter(|p| p.active).count(),
        rewards_redeemed: profiles.iter().map(|p| p.redeemed_rewards.len()).sum(),
        tiers,
        points_distribution: points_distribution(profiles),
        year: today.year(),
        monthly_points: monthly_points(profiles, today.year()),
    }
}

/// Clients per current-balance band; each band's upper bound is inclusive.
pub fn points_distribution(profiles: &[ClientProfile]) -> Vec<BucketPoint> {
    let mut counts = [0u64; BALANCE_BANDS.len()];
    for profile in profiles {
        let band = BALANCE_BANDS
            .iter()
            .position(|(_, upper)| profile.balance <= *upper)
            .unwrap_or(BALANCE_BANDS.len() - 1);
        counts[band] += 1;
    }
    BALANCE_BANDS
        .iter()
        .zip(counts)
        .map(|((label, _), count)| BucketPoint {
            label: label.to_string(),
            value: count as f64,
        })
        .collect()
}

/// Points earned and redeemed per calendar month of `year`, across every
/// client's ledger.
pub fn monthly_points(profiles: &[ClientProfile], year: i32) -> Vec<MonthlyPoints> {
    let mut earned = [0u64; 12];
    let mut redeemed = [0u64; 12];
    for entry in profiles.iter().flat_map(|profile| &profile.ledger) {
        if entry.date.year() != year {
            continue;
        }
        let month = entry.date.month0() as usize;
        let slot = match entry.kind {
            EntryKind::Accrual => &mut earned[month],
            EntryKind::Redemption => &mut redeemed[month],
        };
        *slot = slot.saturating_add(entry.points.unsigned_abs());
    }

    MONTHS
        .into_iter()
        .zip(earned.into_iter().zip(redeemed))
        .map(|(month, (earned, redeemed))| MonthlyPoints {
            month,
            earned,
            redeemed,
            conversion_rate: percent(redeemed as f64, earned as f64, 1),
        })
        .collect()
}
