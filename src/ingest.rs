use crate::models::{Demographics, LineItem, Purchase};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const DEFAULT_CATEGORY: &str = "Autre";

#[derive(Debug, Deserialize)]
struct RawPurchase {
    #[serde(rename = "Client_ID", default)]
    client_id: Option<Value>,
    #[serde(rename = "Ticket_ID", default)]
    ticket_id: Option<Value>,
    #[serde(rename = "Jour_Achat", default)]
    date: Option<String>,
    #[serde(rename = "Heure_Achat", default)]
    time: Option<String>,
    #[serde(rename = "Total_Achat", default)]
    total: Option<Value>,
    #[serde(rename = "Total_Achat (€)", default)]
    total_eur: Option<Value>,
    #[serde(rename = "Montant_Total", default)]
    amount: Option<Value>,
    #[serde(rename = "Produits", default)]
    items: Option<Vec<Value>>,
    #[serde(rename = "Nombre_Produits", default)]
    product_count: Option<Value>,
    #[serde(rename = "Magasin", default)]
    store: Option<String>,
    #[serde(rename = "Nom_Client", default)]
    name: Option<String>,
    #[serde(rename = "Email_Client", default)]
    email: Option<String>,
    #[serde(rename = "Sexe", default)]
    sex: Option<String>,
    #[serde(rename = "Âge", default)]
    age: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLineItem {
    #[serde(rename = "Nom_Produit", default)]
    product: Option<String>,
    #[serde(rename = "Categorie", default)]
    category: Option<String>,
    #[serde(rename = "Prix_Unitaire", default)]
    unit_price: Option<Value>,
    #[serde(rename = "Quantité", default)]
    quantity: Option<Value>,
}

/// Result of mapping a raw purchase array.
#[derive(Debug, Default)]
pub struct Ingested {
    pub purchases: Vec<Purchase>,
    pub skipped: usize,
}

/// Maps every element of the input array. Elements that are not purchase
/// objects, or that carry no client id, are counted and skipped.
pub fn map_records(records: Vec<Value>) -> Ingested {
    let mut ingested = Ingested::default();
    for (index, record) in records.into_iter().enumerate() {
        match map_record(record) {
            Some(purchase) => ingested.purchases.push(purchase),
            None => {
                warn!(index, "skipping unusable purchase record");
                ingested.skipped += 1;
            }
        }
    }
    ingested
}

fn map_record(record: Value) -> Option<Purchase> {
    let raw: RawPurchase = match serde_json::from_value(record) {
        Ok(raw) => raw,
        Err(err) => {
            debug!("purchase record not an object: {err}");
            return None;
        }
    };

    let client_id = raw.client_id.as_ref().and_then(identifier)?;

    // First truthy amount wins, in the order the exports have used over time.
    let total = [&raw.total, &raw.total_eur, &raw.amount]
        .into_iter()
        .map(|value| value.as_ref().map(coerce_amount).unwrap_or(0.0))
        .find(|amount| *amount > 0.0)
        .unwrap_or(0.0);

    let items = raw
        .items
        .unwrap_or_default()
        .into_iter()
        .map(map_line_item)
        .collect();

    Some(Purchase {
        client_id,
        ticket_id: raw.ticket_id.as_ref().and_then(identifier),
        date: raw.date.as_deref().and_then(parse_date),
        time: raw.time.as_deref().and_then(parse_time),
        total,
        items,
        product_count: raw.product_count.as_ref().map(coerce_count),
        store: non_empty(raw.store),
        demographics: Demographics {
            name: non_empty(raw.name),
            email: non_empty(raw.email),
            sex: non_empty(raw.sex),
            age: raw
                .age
                .as_ref()
                .map(coerce_count)
                .filter(|age| *age > 0)
                .and_then(|age| u32::try_from(age).ok()),
        },
    })
}

fn map_line_item(value: Value) -> LineItem {
    let raw: RawLineItem = serde_json::from_value(value).unwrap_or_default();

    LineItem {
        product: non_empty(raw.product).unwrap_or_default(),
        category: non_empty(raw.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        unit_price: raw.unit_price.as_ref().map(coerce_amount).unwrap_or(0.0),
        quantity: raw.quantity.as_ref().map(coerce_count).unwrap_or(0),
    }
}

/// Coerces a JSON amount into a non-negative number. Strings may carry a
/// currency symbol, spaces and a decimal comma. Anything unusable is zero.
pub fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => parse_amount(text),
        _ => 0.0,
    };

    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        if amount != 0.0 {
            debug!(?value, "amount coerced to zero");
        }
        0.0
    }
}

fn coerce_count(value: &Value) -> u64 {
    coerce_amount(value).floor() as u64
}

fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned.parse::<f64>().unwrap_or_else(|_| {
        debug!(text, "unparseable amount");
        0.0
    })
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(Some(text.clone())),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_french_keys() {
        let ingested = map_records(vec![json!({
            "Client_ID": "C042",
            "Ticket_ID": 9001,
            "Jour_Achat": "2026-03-14",
            "Heure_Achat": "17:45",
            "Total_Achat (€)": 64.5,
            "Magasin": "Carrefour Lyon",
            "Nombre_Produits": 3,
            "Produits": [
                {
                    "Nom_Produit": "Pain",
                    "Categorie": "Boulangerie",
                    "Prix_Unitaire": 1.5,
                    "Quantité": 2
                },
                { "Nom_Produit": "Fromage", "Prix_Unitaire": "6,20 €", "Quantité": 1 }
            ],
            "Nom_Client": "Claire Martin",
            "Sexe": "Femme",
            "Âge": 34
        })]);

        assert_eq!(ingested.skipped, 0);
        let purchase = &ingested.purchases[0];
        assert_eq!(purchase.client_id, "C042");
        assert_eq!(purchase.ticket_id.as_deref(), Some("9001"));
        assert_eq!(purchase.date, NaiveDate::from_ymd_opt(2026, 3, 14));
        assert_eq!(purchase.time, NaiveTime::from_hms_opt(17, 45, 0));
        assert_eq!(purchase.total, 64.5);
        assert_eq!(purchase.items.len(), 2);
        assert_eq!(purchase.items[1].category, "Autre");
        assert!((purchase.items[1].unit_price - 6.2).abs() < 1e-9);
        assert_eq!(purchase.demographics.age, Some(34));
        assert_eq!(purchase.demographics.email, None);
    }

    #[test]
    fn total_precedence_falls_through_falsy_values() {
        let ingested = map_records(vec![
            json!({ "Client_ID": "A", "Total_Achat": 12.0, "Montant_Total": 99.0 }),
            json!({
                "Client_ID": "B",
                "Total_Achat": 0,
                "Total_Achat (€)": "",
                "Montant_Total": "45,90 €"
            }),
        ]);

        assert_eq!(ingested.purchases[0].total, 12.0);
        assert!((ingested.purchases[1].total - 45.9).abs() < 1e-9);
    }

    #[test]
    fn malformed_amounts_become_zero() {
        assert_eq!(coerce_amount(&json!("abc")), 0.0);
        assert_eq!(coerce_amount(&json!(-12.5)), 0.0);
        assert_eq!(coerce_amount(&json!(null)), 0.0);
        assert_eq!(coerce_amount(&json!({ "value": 3 })), 0.0);
        assert_eq!(coerce_amount(&json!("€ 1 250.40")), 1250.4);
    }

    #[test]
    fn records_without_client_are_skipped() {
        let ingested = map_records(vec![
            json!("not a purchase"),
            json!({ "Total_Achat": 10 }),
            json!({ "Client_ID": 7, "Total_Achat": 10 }),
        ]);

        assert_eq!(ingested.skipped, 2);
        assert_eq!(ingested.purchases.len(), 1);
        assert_eq!(ingested.purchases[0].client_id, "7");
    }

    #[test]
    fn dates_tolerate_time_suffix() {
        assert_eq!(
            parse_date("2025-12-01T10:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 12, 1)
        );
        assert_eq!(parse_date("01/12/2025"), None);
        assert_eq!(parse_time("08:05:59"), NaiveTime::from_hms_opt(8, 5, 59));
        assert_eq!(parse_time("8h"), None);
    }
}
