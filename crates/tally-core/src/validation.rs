//! # Validation Module
//!
//! Dataset checks that run before any aggregation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (caller)                                     │
//! │  └── Wrong JSON types never reach this crate                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: validate_dataset                                             │
//! │  ├── Four collections present and non-empty                            │
//! │  ├── Seller ids and SKUs unique                                        │
//! │  └── Every line item quantity above zero                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: resolve_references                                           │
//! │  └── Every seller_id / sku on a record resolves                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::{AnalysisError, AnalysisResult, ReferenceKind, ValidationError};
use crate::types::{Dataset, LineItem, Product, PurchaseRecord, Seller};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Borrowed view of a dataset that passed [`validate_dataset`].
#[derive(Debug, Clone, Copy)]
pub struct ValidDataset<'a> {
    pub sellers: &'a [Seller],
    pub products: &'a [Product],
    pub purchase_records: &'a [PurchaseRecord],
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Checks that a collection is present and non-empty.
pub fn require_collection<'a, T>(
    field: &str,
    collection: &'a Option<Vec<T>>,
) -> ValidationResult<&'a [T]> {
    match collection {
        None => Err(ValidationError::MissingCollection {
            field: field.to_string(),
        }),
        Some(items) if items.is_empty() => Err(ValidationError::EmptyCollection {
            field: field.to_string(),
        }),
        Some(items) => Ok(items.as_slice()),
    }
}

/// Checks that no key appears twice.
pub fn require_unique<'a, I>(field: &str, keys: I) -> ValidationResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Checks that every line item sells at least one unit.
pub fn require_positive_quantities(records: &[PurchaseRecord]) -> ValidationResult<()> {
    for (record_index, record) in records.iter().enumerate() {
        if let Some(item) = record.items.iter().find(|item| item.quantity == 0) {
            return Err(ValidationError::ZeroQuantity {
                record_index,
                sku: item.sku.clone(),
            });
        }
    }
    Ok(())
}

/// Validates dataset shape, key uniqueness and line quantities.
///
/// ## Rules
/// - sellers, products, customers, purchase_records all present and non-empty
/// - seller ids unique
/// - SKUs unique
/// - line item quantities positive
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_dataset;
/// use tally_core::Dataset;
///
/// assert!(validate_dataset(&Dataset::default()).is_err());
/// ```
pub fn validate_dataset(dataset: &Dataset) -> ValidationResult<ValidDataset<'_>> {
    let sellers = require_collection("sellers", &dataset.sellers)?;
    let products = require_collection("products", &dataset.products)?;
    require_collection("customers", &dataset.customers)?;
    let purchase_records = require_collection("purchase_records", &dataset.purchase_records)?;

    require_unique("seller id", sellers.iter().map(|s| s.id.as_str()))?;
    require_unique("sku", products.iter().map(|p| p.sku.as_str()))?;
    require_positive_quantities(purchase_records)?;

    Ok(ValidDataset {
        sellers,
        products,
        purchase_records,
    })
}

// =============================================================================
// Reference Validators
// =============================================================================

/// A purchase record whose seller and products have all been looked up.
#[derive(Debug, Clone)]
pub struct ResolvedRecord<'a> {
    /// Position of the record in `purchase_records`.
    pub record_index: usize,
    /// Value the seller id mapped to in the seller index.
    pub seller: usize,
    /// Line items paired with their catalogue entries, in input order.
    pub lines: Vec<(&'a LineItem, &'a Product)>,
}

/// Resolves every record's seller and every line's SKU.
///
/// Fails on the first dangling reference in record order, before any
/// aggregation has happened.
pub fn resolve_references<'a>(
    records: &'a [PurchaseRecord],
    sellers: &HashMap<&str, usize>,
    products: &HashMap<&str, &'a Product>,
) -> AnalysisResult<Vec<ResolvedRecord<'a>>> {
    records
        .iter()
        .enumerate()
        .map(|(record_index, record)| -> AnalysisResult<ResolvedRecord<'a>> {
            let seller = *sellers.get(record.seller_id.as_str()).ok_or_else(|| {
                AnalysisError::UnknownReference {
                    kind: ReferenceKind::Seller,
                    id: record.seller_id.clone(),
                    record_index,
                }
            })?;

            let lines = record
                .items
                .iter()
                .map(|item| {
                    products
                        .get(item.sku.as_str())
                        .map(|&product| (item, product))
                        .ok_or_else(|| AnalysisError::UnknownReference {
                            kind: ReferenceKind::Product,
                            id: item.sku.clone(),
                            record_index,
                        })
                })
                .collect::<AnalysisResult<Vec<_>>>()?;

            Ok(ResolvedRecord {
                record_index,
                seller,
                lines,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Customer;
    use chrono::NaiveDate;

    fn seller(id: &str) -> Seller {
        Seller {
            id: id.to_string(),
            first_name: "First".to_string(),
            last_name: id.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            position: "Seller".to_string(),
        }
    }

    fn product(sku: &str) -> Product {
        Product {
            sku: sku.to_string(),
            name: sku.to_string(),
            category: "Misc".to_string(),
            purchase_price: 1.0,
            sale_price: 2.0,
        }
    }

    fn record(seller_id: &str, skus: &[&str]) -> PurchaseRecord {
        PurchaseRecord {
            receipt_id: None,
            seller_id: seller_id.to_string(),
            customer_id: None,
            items: skus
                .iter()
                .map(|sku| LineItem {
                    sku: sku.to_string(),
                    quantity: 1,
                    discount: 0.0,
                    sale_price: None,
                })
                .collect(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![seller("s1"), seller("s2")],
            vec![product("P1")],
            vec![Customer::default()],
            vec![record("s1", &["P1"])],
        )
    }

    #[test]
    fn test_valid_dataset() {
        let data = dataset();
        let valid = validate_dataset(&data).unwrap();
        assert_eq!(valid.sellers.len(), 2);
        assert_eq!(valid.products.len(), 1);
        assert_eq!(valid.purchase_records.len(), 1);
    }

    #[test]
    fn test_missing_collection() {
        let mut data = dataset();
        data.customers = None;
        assert_eq!(
            validate_dataset(&data).unwrap_err(),
            ValidationError::MissingCollection {
                field: "customers".to_string()
            }
        );
    }

    #[test]
    fn test_empty_collections() {
        for field in ["sellers", "products", "customers", "purchase_records"] {
            let mut data = dataset();
            match field {
                "sellers" => data.sellers = Some(vec![]),
                "products" => data.products = Some(vec![]),
                "customers" => data.customers = Some(vec![]),
                _ => data.purchase_records = Some(vec![]),
            }
            assert_eq!(
                validate_dataset(&data).unwrap_err(),
                ValidationError::EmptyCollection {
                    field: field.to_string()
                }
            );
        }
    }

    #[test]
    fn test_duplicates() {
        let mut data = dataset();
        data.sellers = Some(vec![seller("s1"), seller("s1")]);
        assert!(matches!(
            validate_dataset(&data),
            Err(ValidationError::Duplicate { ref value, .. }) if value == "s1"
        ));

        let mut data = dataset();
        data.products = Some(vec![product("P1"), product("P2"), product("P1")]);
        assert!(matches!(
            validate_dataset(&data),
            Err(ValidationError::Duplicate { ref field, .. }) if field == "sku"
        ));
    }

    #[test]
    fn test_zero_quantity() {
        let mut data = dataset();
        let mut bad = record("s2", &["P1", "P1"]);
        bad.items[1].quantity = 0;
        data.purchase_records = Some(vec![record("s1", &["P1"]), bad]);

        assert_eq!(
            validate_dataset(&data).unwrap_err(),
            ValidationError::ZeroQuantity {
                record_index: 1,
                sku: "P1".to_string()
            }
        );
    }

    #[test]
    fn test_customers_without_id() {
        let data: Dataset = serde_json::from_value(serde_json::json!({
            "sellers": [{
                "id": "s1",
                "first_name": "A",
                "last_name": "B",
                "start_date": "2024-01-01",
                "position": "Seller"
            }],
            "products": [{
                "sku": "P1",
                "name": "P1",
                "category": "Misc",
                "purchase_price": 1.0,
                "sale_price": 2.0
            }],
            "customers": [{ "name": "Walk-in" }, {}],
            "purchase_records": [{ "seller_id": "s1", "items": [] }]
        }))
        .unwrap();

        let customers = data.customers.as_deref().unwrap();
        assert_eq!(customers[0].attributes["name"], "Walk-in");
        assert!(validate_dataset(&data).is_ok());
    }

    #[test]
    fn test_resolve_references() {
        let sellers: HashMap<&str, usize> = [("s1", 0), ("s2", 1)].into_iter().collect();
        let catalogue = vec![product("P1"), product("P2")];
        let products: HashMap<&str, &Product> =
            catalogue.iter().map(|p| (p.sku.as_str(), p)).collect();

        let records = vec![record("s2", &["P2", "P1"]), record("s1", &[])];
        let resolved = resolve_references(&records, &sellers, &products).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].seller, 1);
        assert_eq!(resolved[0].lines[0].1.sku, "P2");
        assert_eq!(resolved[0].lines[1].1.sku, "P1");
        assert_eq!(resolved[1].record_index, 1);
        assert!(resolved[1].lines.is_empty());
    }

    #[test]
    fn test_unknown_references() {
        let sellers: HashMap<&str, usize> = [("s1", 0)].into_iter().collect();
        let catalogue = vec![product("P1")];
        let products: HashMap<&str, &Product> =
            catalogue.iter().map(|p| (p.sku.as_str(), p)).collect();

        let bad_seller = vec![record("s1", &["P1"]), record("ghost", &["P1"])];
        let err = resolve_references(&bad_seller, &sellers, &products).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnknownReference { kind: ReferenceKind::Seller, ref id, record_index: 1 }
                if id == "ghost"
        ));

        let bad_sku = vec![record("s1", &["P1", "P9"])];
        let err = resolve_references(&bad_sku, &sellers, &products).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnknownReference { kind: ReferenceKind::Product, ref id, record_index: 0 }
                if id == "P9"
        ));
    }
}
