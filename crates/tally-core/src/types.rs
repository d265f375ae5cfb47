//! # Domain Types
//!
//! Input entities handed in by the caller and output entities of an analysis run.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (immutable)                                                      │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Seller      │   │     Product     │   │ PurchaseRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (unique)    │   │  sku (unique)   │   │  seller_id (FK) │       │
//! │  │  first/last     │   │  purchase_price │   │  items[]        │──┐    │
//! │  │  start_date     │   │  sale_price     │   └─────────────────┘  │    │
//! │  └─────────────────┘   └─────────────────┘   ┌─────────────────┐  │    │
//! │                                              │    LineItem     │◄─┘    │
//! │  ┌─────────────────┐                         │  sku (FK)       │       │
//! │  │    Customer     │  (opaque)               │  quantity       │       │
//! │  └─────────────────┘                         │  discount %     │       │
//! │                                              └─────────────────┘       │
//! │  OUTPUT                                                                 │
//! │  SellerStat (accumulator) ──► SellerReport (rounded, ranked)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Seller
// =============================================================================

/// A member of the sales team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Unique identifier, referenced by `PurchaseRecord::seller_id`.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub start_date: NaiveDate,
    pub position: String,
}

impl Seller {
    /// Name shown in reports: first and last name separated by a space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalogue entry. Prices are in currency units, not cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stock Keeping Unit - unique key.
    pub sku: String,
    pub name: String,
    pub category: String,
    /// What the store paid per unit.
    pub purchase_price: f64,
    /// List price per unit.
    pub sale_price: f64,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer. Only presence is checked; fields are carried as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Purchase Records
// =============================================================================

/// One product entry within a purchase record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    /// Units sold. Zero is rejected by validation.
    pub quantity: u32,
    /// Discount percentage, expected in 0..=100. Not range-checked.
    #[serde(default)]
    pub discount: f64,
    /// Unit price actually charged, when it differs from the catalogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

/// A single sale (receipt) made by one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    pub seller_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub items: Vec<LineItem>,
}

// =============================================================================
// Dataset
// =============================================================================

/// Everything an analysis run consumes.
///
/// Collections are optional so that a JSON document missing a key
/// deserializes cleanly and is rejected by validation instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sellers: Option<Vec<Seller>>,
    #[serde(default)]
    pub products: Option<Vec<Product>>,
    #[serde(default)]
    pub customers: Option<Vec<Customer>>,
    #[serde(default)]
    pub purchase_records: Option<Vec<PurchaseRecord>>,
}

impl Dataset {
    /// Creates a dataset with all four collections present.
    pub fn new(
        sellers: Vec<Seller>,
        products: Vec<Product>,
        customers: Vec<Customer>,
        purchase_records: Vec<PurchaseRecord>,
    ) -> Self {
        Dataset {
            sellers: Some(sellers),
            products: Some(products),
            customers: Some(customers),
            purchase_records: Some(purchase_records),
        }
    }
}

// =============================================================================
// Product Sales
// =============================================================================

/// Cumulative quantity of one SKU sold by one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub sku: String,
    pub quantity: u64,
}

// =============================================================================
// Seller Stat
// =============================================================================

/// Running totals for one seller during an analysis run.
///
/// Bonus policies receive this after ranking, so `profit` is still the
/// unrounded sum and `top_products` is already sorted and truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerStat {
    pub seller_id: String,
    pub name: String,
    /// Sum of per-line revenue, each line rounded to cents first.
    pub revenue: Money,
    /// Sum of `line revenue - cost`, full precision.
    pub profit: f64,
    /// Number of purchase records, not line items.
    pub sales_count: u64,
    /// Per-SKU quantities in first-seen order until ranking.
    pub top_products: Vec<ProductSales>,
    positions: HashMap<String, usize>,
}

impl SellerStat {
    /// Creates an empty accumulator.
    pub fn new(seller_id: impl Into<String>, name: impl Into<String>) -> Self {
        SellerStat {
            seller_id: seller_id.into(),
            name: name.into(),
            revenue: Money::zero(),
            profit: 0.0,
            sales_count: 0,
            top_products: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Creates an empty accumulator for a seller.
    pub fn for_seller(seller: &Seller) -> Self {
        SellerStat::new(seller.id.clone(), seller.display_name())
    }

    /// Adds `quantity` to the running total for `sku`, appending a new
    /// entry the first time the SKU is seen.
    pub fn add_quantity(&mut self, sku: &str, quantity: u64) {
        let index = match self.positions.get(sku) {
            Some(&index) => index,
            None => {
                self.top_products.push(ProductSales {
                    sku: sku.to_string(),
                    quantity: 0,
                });
                let index = self.top_products.len() - 1;
                self.positions.insert(sku.to_string(), index);
                index
            }
        };
        self.top_products[index].quantity += quantity;
    }

    /// Sorts products by quantity (highest first, ties keep first-seen
    /// order) and keeps at most `limit` of them.
    pub fn rank_products(&mut self, limit: usize) {
        self.top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        self.top_products.truncate(limit);
        self.positions.clear();
    }

    /// Rounds the totals and attaches the bonus.
    pub fn into_report(self, bonus: f64) -> SellerReport {
        SellerReport {
            seller_id: self.seller_id,
            name: self.name,
            revenue: self.revenue,
            profit: Money::from_amount(self.profit),
            sales_count: self.sales_count,
            bonus: Money::from_amount(bonus),
            top_products: self.top_products,
        }
    }
}

// =============================================================================
// Seller Report
// =============================================================================

/// Final, ranked result for one seller. All amounts are two-decimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerReport {
    pub seller_id: String,
    pub name: String,
    pub revenue: Money,
    pub profit: Money,
    pub sales_count: u64,
    pub bonus: Money,
    /// Up to the configured limit (10 by default), highest quantity first.
    pub top_products: Vec<ProductSales>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seller() -> Seller {
        Seller {
            id: "seller_1".to_string(),
            first_name: "Alexey".to_string(),
            last_name: "Petrov".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            position: "Senior Seller".to_string(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(seller().display_name(), "Alexey Petrov");
        let stat = SellerStat::for_seller(&seller());
        assert_eq!(stat.seller_id, "seller_1");
        assert_eq!(stat.name, "Alexey Petrov");
        assert_eq!(stat.sales_count, 0);
        assert!(stat.top_products.is_empty());
    }

    #[test]
    fn test_add_quantity_keeps_first_seen_order() {
        let mut stat = SellerStat::new("s", "S");
        stat.add_quantity("B", 2);
        stat.add_quantity("A", 1);
        stat.add_quantity("B", 3);

        assert_eq!(
            stat.top_products,
            vec![
                ProductSales { sku: "B".to_string(), quantity: 5 },
                ProductSales { sku: "A".to_string(), quantity: 1 },
            ]
        );
    }

    #[test]
    fn test_rank_products_sorts_stably_and_truncates() {
        let mut stat = SellerStat::new("s", "S");
        for (sku, qty) in [("A", 1), ("B", 4), ("C", 4), ("D", 2)] {
            stat.add_quantity(sku, qty);
        }
        stat.rank_products(3);

        let skus: Vec<&str> = stat.top_products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_into_report_rounds_profit_and_bonus() {
        let mut stat = SellerStat::new("s", "S");
        stat.revenue = Money::from_cents(1001);
        stat.profit = 3.14159;
        stat.sales_count = 2;

        let report = stat.into_report(0.471_238_5);
        assert_eq!(report.revenue.cents(), 1001);
        assert_eq!(report.profit.cents(), 314);
        assert_eq!(report.bonus.cents(), 47);
        assert_eq!(report.sales_count, 2);
    }

    #[test]
    fn test_dataset_missing_keys_deserialize_to_none() {
        let dataset: Dataset = serde_json::from_str(r#"{ "sellers": [] }"#).unwrap();
        assert_eq!(dataset.sellers, Some(vec![]));
        assert!(dataset.products.is_none());
        assert!(dataset.purchase_records.is_none());
    }

    #[test]
    fn test_customer_keeps_unknown_fields() {
        let customer: Customer =
            serde_json::from_str(r#"{ "id": "c1", "first_name": "Ivan", "phone": "+7" }"#)
                .unwrap();
        assert_eq!(customer.attributes["id"], "c1");
        assert_eq!(customer.attributes["first_name"], "Ivan");
        assert_eq!(customer.attributes.len(), 3);

        let round_trip = serde_json::to_value(&customer).unwrap();
        assert_eq!(round_trip["phone"], "+7");
    }

    #[test]
    fn test_line_item_defaults() {
        let item: LineItem = serde_json::from_str(r#"{ "sku": "P1", "quantity": 3 }"#).unwrap();
        assert_eq!(item.discount, 0.0);
        assert!(item.sale_price.is_none());
    }
}
