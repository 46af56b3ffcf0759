use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::records::{CustomerRef, LoyaltyScore, ProductRef};
use crate::transaction::{CustomerId, FlatTransactionRow, ProductId};

#[derive(Debug, PartialEq, Clone)]
pub struct EnrichedRow {
    pub customer_id: CustomerId,
    pub date_of_purchase: NaiveDateTime,
    pub product_id: ProductId,
    pub price: f64,
    pub product_category: Option<String>,
    pub loyalty_score: Option<LoyaltyScore>,
}

/// Lookup tables for the left join. Keys are unique by construction.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    categories: HashMap<ProductId, Option<String>>,
    loyalty: HashMap<CustomerId, Option<LoyaltyScore>>,
}

impl ReferenceIndex {
    pub fn build(products: Vec<ProductRef>, customers: Vec<CustomerRef>) -> Result<Self> {
        let mut categories = HashMap::with_capacity(products.len());
        for product in products {
            if categories.contains_key(&product.product_id) {
                return Err(Error::DuplicateReferenceKey {
                    table: "product",
                    key: product.product_id,
                });
            }
            categories.insert(product.product_id, product.product_category);
        }

        let mut loyalty = HashMap::with_capacity(customers.len());
        for customer in customers {
            if loyalty.contains_key(&customer.customer_id) {
                return Err(Error::DuplicateReferenceKey {
                    table: "customer",
                    key: customer.customer_id,
                });
            }
            loyalty.insert(customer.customer_id, customer.loyalty_score);
        }

        Ok(Self {
            categories,
            loyalty,
        })
    }

    pub fn product_count(&self) -> usize {
        self.categories.len()
    }

    pub fn customer_count(&self) -> usize {
        self.loyalty.len()
    }

    /// Left join: every input row survives, in input order. A missing key and
    /// a blank reference cell both give `None`.
    pub fn join(&self, rows: Vec<FlatTransactionRow>) -> Vec<EnrichedRow> {
        rows.into_iter()
            .map(|row| EnrichedRow {
                product_category: self.categories.get(&row.product_id).cloned().flatten(),
                loyalty_score: self.loyalty.get(&row.customer_id).copied().flatten(),
                customer_id: row.customer_id,
                date_of_purchase: row.date_of_purchase,
                product_id: row.product_id,
                price: row.price,
            })
            .collect()
    }
}
