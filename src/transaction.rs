use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Error, Result};

pub type CustomerId = String;
pub type ProductId = String;

/// One line of a transactions file, before validation.
///
/// Fields are optional so that a missing value surfaces as
/// [`Error::MalformedRecord`] from the flattener instead of a bare serde error.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct TransactionRecord {
    pub customer_id: Option<CustomerId>,
    pub date_of_purchase: Option<String>,
    #[serde(default)]
    pub basket: Vec<BasketItem>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct BasketItem {
    pub product_id: Option<ProductId>,
    pub price: Option<f64>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FlatTransactionRow {
    pub customer_id: CustomerId,
    pub date_of_purchase: NaiveDateTime,
    pub product_id: ProductId,
    pub price: f64,
}

/// Explode one record into one row per basket item. An empty basket yields no rows.
pub fn flatten_record(record: TransactionRecord) -> Result<Vec<FlatTransactionRow>> {
    let customer_id = record
        .customer_id
        .ok_or_else(|| Error::malformed("missing customer_id"))?;
    let raw_date = record
        .date_of_purchase
        .ok_or_else(|| Error::malformed("missing date_of_purchase"))?;
    let date_of_purchase = parse_purchase_timestamp(&raw_date)
        .ok_or_else(|| Error::malformed(format!("unparseable date_of_purchase '{raw_date}'")))?;

    record
        .basket
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let product_id = item
                .product_id
                .ok_or_else(|| Error::malformed(format!("basket item {idx} missing product_id")))?;
            let price = item
                .price
                .ok_or_else(|| Error::malformed(format!("basket item {idx} missing price")))?;
            Ok(FlatTransactionRow {
                customer_id: customer_id.clone(),
                date_of_purchase,
                product_id,
                price,
            })
        })
        .collect()
}

pub fn flatten(records: Vec<TransactionRecord>) -> Result<Vec<FlatTransactionRow>> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        rows.extend(flatten_record(record)?);
    }
    Ok(rows)
}

/// Parse `YYYY-MM-DD HH:MM:SS`, also accepting a `T` separator or a bare date.
pub fn parse_purchase_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(timestamp);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
