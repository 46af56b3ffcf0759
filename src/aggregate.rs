use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::natural::natural_cmp;
use crate::records::LoyaltyScore;
use crate::reference::EnrichedRow;
use crate::transaction::{CustomerId, ProductId};

/// Per-customer totals for one week window.
#[derive(Debug, serde::Serialize, PartialEq, Clone, Default)]
pub struct CustomerWeeklySummary {
    pub purchase_count: usize,
    pub loyalty_score: Option<LoyaltyScore>,
    pub product_id: Vec<ProductId>,
    pub product_category: Vec<Option<String>>,
}

/// Summaries keyed by customer id, kept in natural id order.
///
/// Serializes as a JSON object whose keys appear in that order.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct WeeklyReport {
    customers: Vec<(CustomerId, CustomerWeeklySummary)>,
}

impl WeeklyReport {
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn get(&self, customer_id: &str) -> Option<&CustomerWeeklySummary> {
        self.customers
            .iter()
            .find(|(id, _)| id == customer_id)
            .map(|(_, summary)| summary)
    }

    pub fn customer_ids(&self) -> impl Iterator<Item = &str> {
        self.customers.iter().map(|(id, _)| id.as_str())
    }
}

impl Serialize for WeeklyReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.customers.len()))?;
        for (id, summary) in &self.customers {
            map.serialize_entry(id, summary)?;
        }
        map.end()
    }
}

/// Group rows by customer in natural id order, keeping row order within each group.
pub fn group_by_customer(rows: &[EnrichedRow]) -> Vec<(CustomerId, Vec<&EnrichedRow>)> {
    let mut groups: HashMap<&str, Vec<&EnrichedRow>> = HashMap::new();
    for row in rows {
        groups.entry(row.customer_id.as_str()).or_default().push(row);
    }

    let mut grouped: Vec<(CustomerId, Vec<&EnrichedRow>)> = groups
        .into_iter()
        .map(|(id, rows)| (id.to_owned(), rows))
        .collect();
    grouped.sort_by(|a, b| natural_cmp(&a.0, &b.0));
    grouped
}

/// Fold one customer's rows. The loyalty score comes from the last row.
pub fn summarize(rows: &[&EnrichedRow]) -> CustomerWeeklySummary {
    rows.iter()
        .fold(CustomerWeeklySummary::default(), |mut summary, row| {
            summary.purchase_count += 1;
            summary.loyalty_score = row.loyalty_score;
            summary.product_id.push(row.product_id.clone());
            summary.product_category.push(row.product_category.clone());
            summary
        })
}

pub fn aggregate_window(rows: &[EnrichedRow]) -> WeeklyReport {
    let customers = group_by_customer(rows)
        .into_iter()
        .map(|(id, group)| {
            let summary = summarize(&group);
            (id, summary)
        })
        .collect();

    WeeklyReport { customers }
}
