//! # Sales Analysis
//!
//! Turns a [`Dataset`] into a profit-ranked list of [`SellerReport`]s.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        analyze_sales_data                               │
//! │                                                                         │
//! │  1. validate_dataset      four collections, unique ids      InvalidData │
//! │  2. policy check          revenue + bonus present         MissingPolicy │
//! │  3. build indexes         seller id → slot, sku → product               │
//! │  4. resolve_references    every id resolves            UnknownReference │
//! │  ─────────────────────── no aggregation before this line ────────────── │
//! │  5. aggregate             per line: qty, revenue (cents), profit (f64)  │
//! │                           per record: sales_count += 1                  │
//! │  6. rank products         quantity desc, keep top N                     │
//! │  7. rank sellers          profit desc, stable                           │
//! │  8. finalize              bonus(rank, total), round to cents            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use tally_core::{analyze_sales_data, AnalysisOptions, Dataset};
//!
//! let dataset: Dataset = serde_json::from_str(r#"{
//!     "sellers": [
//!         { "id": "S1", "first_name": "Anna", "last_name": "Ivanova",
//!           "start_date": "2023-01-10", "position": "Seller" }
//!     ],
//!     "products": [
//!         { "sku": "P1", "name": "Lamp", "category": "Home",
//!           "purchase_price": 10.0, "sale_price": 20.0 }
//!     ],
//!     "customers": [ { "id": "C1" } ],
//!     "purchase_records": [
//!         { "seller_id": "S1", "items": [ { "sku": "P1", "quantity": 5, "discount": 0 } ] }
//!     ]
//! }"#).unwrap();
//!
//! let reports = analyze_sales_data(&dataset, &AnalysisOptions::with_defaults()).unwrap();
//! assert_eq!(reports[0].revenue.to_string(), "100.00");
//! assert_eq!(reports[0].profit.to_string(), "50.00");
//! assert_eq!(reports[0].bonus.to_string(), "7.50");
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::money::Money;
use crate::policy::{BonusByProfit, BonusPolicy, RevenuePolicy, SimpleRevenue};
use crate::types::{Dataset, Product, SellerReport, SellerStat};
use crate::validation::{resolve_references, validate_dataset, ValidDataset};
use crate::DEFAULT_TOP_PRODUCTS_LIMIT;

// =============================================================================
// Analysis Options
// =============================================================================

/// Policies and limits for [`analyze_sales_data`].
///
/// Policy slots start empty; running with an empty slot fails with
/// [`AnalysisError::MissingPolicy`].
pub struct AnalysisOptions {
    revenue_policy: Option<Box<dyn RevenuePolicy>>,
    bonus_policy: Option<Box<dyn BonusPolicy>>,
    top_products_limit: usize,
}

impl AnalysisOptions {
    /// Options with no policies and the default product limit.
    pub fn new() -> Self {
        AnalysisOptions {
            revenue_policy: None,
            bonus_policy: None,
            top_products_limit: DEFAULT_TOP_PRODUCTS_LIMIT,
        }
    }

    /// [`SimpleRevenue`] and the default [`BonusByProfit`].
    pub fn with_defaults() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    /// Built-in policies parameterised by `config`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new()
            .revenue_policy(SimpleRevenue)
            .bonus_policy(BonusByProfit::from_settings(&config.bonus))
            .top_products_limit(config.report.top_products_limit)
    }

    /// Sets the revenue policy.
    pub fn revenue_policy(mut self, policy: impl RevenuePolicy + 'static) -> Self {
        self.revenue_policy = Some(Box::new(policy));
        self
    }

    /// Sets the bonus policy.
    pub fn bonus_policy(mut self, policy: impl BonusPolicy + 'static) -> Self {
        self.bonus_policy = Some(Box::new(policy));
        self
    }

    /// Sets how many products each report keeps.
    pub fn top_products_limit(mut self, limit: usize) -> Self {
        self.top_products_limit = limit;
        self
    }

    /// Builds an analyzer borrowing these options' policies.
    pub fn analyzer(&self) -> AnalysisResult<SalesAnalyzer<'_>> {
        let revenue = self
            .revenue_policy
            .as_deref()
            .ok_or(AnalysisError::MissingPolicy { policy: "revenue" })?;
        let bonus = self
            .bonus_policy
            .as_deref()
            .ok_or(AnalysisError::MissingPolicy { policy: "bonus" })?;

        Ok(SalesAnalyzer::new(revenue, bonus).with_top_products_limit(self.top_products_limit))
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnalysisOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisOptions")
            .field("revenue_policy", &self.revenue_policy.is_some())
            .field("bonus_policy", &self.bonus_policy.is_some())
            .field("top_products_limit", &self.top_products_limit)
            .finish()
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Validates `dataset` and `options`, then builds the ranked report.
///
/// ## Errors
/// Checked in this order, all before any aggregation:
/// - [`AnalysisError::InvalidData`]: a collection is missing or empty, ids repeat, or a quantity is zero
/// - [`AnalysisError::MissingPolicy`]: a policy slot in `options` is empty
/// - [`AnalysisError::UnknownReference`]: a record names an unknown seller or SKU
pub fn analyze_sales_data(
    dataset: &Dataset,
    options: &AnalysisOptions,
) -> AnalysisResult<Vec<SellerReport>> {
    let data = validate_dataset(dataset)?;
    options.analyzer()?.run(data)
}

// =============================================================================
// Sales Analyzer
// =============================================================================

/// One analysis configuration with both policies bound.
///
/// Holding the policies by reference makes a missing policy
/// unrepresentable, so only dataset errors remain.
#[derive(Clone, Copy)]
pub struct SalesAnalyzer<'p> {
    revenue: &'p dyn RevenuePolicy,
    bonus: &'p dyn BonusPolicy,
    top_products_limit: usize,
}

impl<'p> SalesAnalyzer<'p> {
    /// Creates an analyzer with the default product limit.
    pub fn new(revenue: &'p dyn RevenuePolicy, bonus: &'p dyn BonusPolicy) -> Self {
        SalesAnalyzer {
            revenue,
            bonus,
            top_products_limit: DEFAULT_TOP_PRODUCTS_LIMIT,
        }
    }

    /// Keeps at most `limit` products per seller.
    pub fn with_top_products_limit(mut self, limit: usize) -> Self {
        self.top_products_limit = limit;
        self
    }

    /// Validates `dataset` and builds the ranked report.
    pub fn analyze(&self, dataset: &Dataset) -> AnalysisResult<Vec<SellerReport>> {
        let data = validate_dataset(dataset)?;
        self.run(data)
    }

    fn run(&self, data: ValidDataset<'_>) -> AnalysisResult<Vec<SellerReport>> {
        debug!(
            sellers = data.sellers.len(),
            products = data.products.len(),
            records = data.purchase_records.len(),
            "Analyzing sales data"
        );

        // One accumulator per seller, in input order
        let mut stats: Vec<SellerStat> = data.sellers.iter().map(SellerStat::for_seller).collect();
        let seller_index: HashMap<&str, usize> = data
            .sellers
            .iter()
            .enumerate()
            .map(|(slot, seller)| (seller.id.as_str(), slot))
            .collect();
        let product_index: HashMap<&str, &Product> = data
            .products
            .iter()
            .map(|product| (product.sku.as_str(), product))
            .collect();

        let records = resolve_references(data.purchase_records, &seller_index, &product_index)?;

        for record in &records {
            let stat = &mut stats[record.seller];
            trace!(
                record = record.record_index,
                seller_id = %stat.seller_id,
                lines = record.lines.len(),
                "Aggregating purchase record"
            );

            for &(item, product) in &record.lines {
                stat.add_quantity(&item.sku, u64::from(item.quantity));

                let cost = product.purchase_price * f64::from(item.quantity);
                let revenue = self.revenue.line_revenue(item, product);
                stat.revenue += Money::from_amount(revenue);
                stat.profit += revenue - cost;
            }

            stat.sales_count += 1;
        }

        for stat in &mut stats {
            stat.rank_products(self.top_products_limit);
        }

        // Stable: equal profits keep seller input order
        stats.sort_by(|a, b| b.profit.total_cmp(&a.profit));

        let total = stats.len();
        let reports: Vec<SellerReport> = stats
            .into_iter()
            .enumerate()
            .map(|(rank, stat)| {
                let bonus = self.bonus.bonus(rank, total, &stat);
                stat.into_report(bonus)
            })
            .collect();

        debug!(sellers = reports.len(), "Sales analysis complete");
        Ok(reports)
    }
}

impl fmt::Debug for SalesAnalyzer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SalesAnalyzer")
            .field("top_products_limit", &self.top_products_limit)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
