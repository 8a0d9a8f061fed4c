use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line of a till receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product: String,
    pub category: String,
    pub unit_price: f64,
    pub quantity: u64,
}

impl LineItem {
    pub fn revenue(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Demographic fields as they appear in the source file. Every field is
/// optional; `loyalty::profile` resolves the missing ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demographics {
    pub name: Option<String>,
    pub email: Option<String>,
    pub sex: Option<String>,
    pub age: Option<u32>,
}

/// A purchase after field mapping and numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub client_id: String,
    pub ticket_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub total: f64,
    pub items: Vec<LineItem>,
    pub product_count: Option<u64>,
    pub store: Option<String>,
    pub demographics: Demographics,
}

impl Purchase {
    /// Products scanned on the ticket: the declared count, else the summed
    /// quantities.
    pub fn scanned_products(&self) -> u64 {
        self.product_count
            .unwrap_or_else(|| self.items.iter().map(|item| item.quantity).sum())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reward {
    pub id: u32,
    #[serde(rename = "nom")]
    pub name: &'static str,
    #[serde(rename = "cout")]
    pub cost: u64,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "gain")]
    Accrual,
    #[serde(rename = "depense")]
    Redemption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub points: i64,
    pub description: String,
    #[serde(rename = "recompense_id", default, skip_serializing_if = "Option::is_none")]
    pub reward_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemedReward {
    pub id: u32,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "cout")]
    pub cost: u64,
    #[serde(rename = "date_utilisation")]
    pub redeemed_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Argent,
    Or,
    Platine,
}

impl Tier {
    pub fn from_points(points: u64) -> Self {
        if points >= 2000 {
            Tier::Platine
        } else if points >= 1000 {
            Tier::Or
        } else if points >= 500 {
            Tier::Argent
        } else {
            Tier::Bronze
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Argent => "Argent",
            Tier::Or => "Or",
            Tier::Platine => "Platine",
        }
    }
}

/// One record of the generated loyalty file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub client_id: String,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "sexe")]
    pub sex: String,
    pub age: u32,
    #[serde(rename = "date_inscription")]
    pub enrolled_on: NaiveDate,
    #[serde(rename = "dernier_achat")]
    pub last_purchase: Option<NaiveDate>,
    #[serde(rename = "nombre_achats")]
    pub purchase_count: u64,
    #[serde(rename = "points_actuels")]
    pub balance: i64,
    #[serde(rename = "points_cumules")]
    pub lifetime_accrued: u64,
    #[serde(rename = "points_utilises")]
    pub lifetime_redeemed: u64,
    #[serde(rename = "statut")]
    pub tier: Tier,
    #[serde(rename = "est_actif")]
    pub active: bool,
    #[serde(rename = "historique_points")]
    pub ledger: Vec<LedgerEntry>,
    #[serde(rename = "recompenses_utilisees")]
    pub redeemed_rewards: Vec<RedeemedReward>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_sales: f64,
    pub clients: usize,
    pub products_scanned: u64,
    pub stores: usize,
}

#[derive(Debug, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub revenue: f64,
    pub units: u64,
}

#[derive(Debug, Serialize)]
pub struct RankedItem {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct BucketPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct DailySalesPoint {
    pub date: String,
    pub total: f64,
    pub running_total: f64,
}

/// Shares of distinct clients, in whole percent.
#[derive(Debug, Serialize)]
pub struct DemographicsBreakdown {
    pub age_groups: Vec<BucketPoint>,
    pub sex: Vec<BucketPoint>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyPoints {
    pub month: &'static str,
    pub earned: u64,
    pub redeemed: u64,
    /// Redeemed over earned, in percent with one decimal.
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub period: String,
    pub records: usize,
    pub summary: SummaryStats,
    pub categories: Vec<CategorySales>,
    pub top_products: Vec<RankedItem>,
    pub top_stores: Vec<RankedItem>,
    pub sales_by_hour: Vec<BucketPoint>,
    pub sales_by_weekday: Vec<BucketPoint>,
    pub basket_sizes: Vec<BucketPoint>,
    pub category_frequency: Vec<RankedItem>,
    pub daily_sales: Vec<DailySalesPoint>,
    pub demographics: DemographicsBreakdown,
}

#[derive(Debug, Serialize)]
pub struct LoyaltySummary {
    pub clients: usize,
    pub points_distributed: u64,
    pub points_redeemed: u64,
    pub active_clients: usize,
    pub rewards_redeemed: usize,
    pub tiers: BTreeMap<&'static str, usize>,
    /// Clients per current-balance band.
    pub points_distribution: Vec<BucketPoint>,
    pub year: i32,
    pub monthly_points: Vec<MonthlyPoints>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatsQuery {
    pub period: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}
