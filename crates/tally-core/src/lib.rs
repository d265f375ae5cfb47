//! # tally-core: Seller Performance Analysis
//!
//! Computes a ranked sales-performance report from raw transactional data:
//! revenue, profit, completed sales, best-selling products and a rank-based
//! bonus for every seller.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller (CLI, service, UI)                    │   │
//! │  │     load JSON ──► Dataset          SellerReport ──► render      │   │
//! │  └──────────────────────┬──────────────────────▲───────────────────┘   │
//! │                         │                      │                        │
//! │  ┌──────────────────────▼──────────────────────┴───────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  policy   │  │ analysis  │  │ validation│  │   │
//! │  │   │  Seller   │  │  Revenue  │  │  ranking  │  │  shape    │  │   │
//! │  │   │  Report   │  │  Bonus    │  │  bonuses  │  │  refs     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATASET LOADING • NO FORMATTING • DETERMINISTIC            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Input entities and report types
//! - [`money`] - Two-decimal `Money` in integer cents
//! - [`policy`] - Revenue and bonus policies
//! - [`validation`] - Dataset and reference checks
//! - [`analysis`] - The aggregation and ranking pipeline
//! - [`config`] - analysis.toml and environment overrides
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{analyze_sales_data, AnalysisConfig, AnalysisOptions, Dataset};
//!
//! # fn load() -> Dataset { Dataset::default() }
//! let dataset = load();
//! let options = AnalysisOptions::from_config(&AnalysisConfig::default());
//!
//! match analyze_sales_data(&dataset, &options) {
//!     Ok(reports) => {
//!         for report in reports {
//!             println!("{} {} bonus {}", report.seller_id, report.profit, report.bonus);
//!         }
//!     }
//!     Err(err) => eprintln!("analysis failed: {err}"),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analysis;
pub mod config;
pub mod error;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analysis::{analyze_sales_data, AnalysisOptions, SalesAnalyzer};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult, ConfigError, ReferenceKind, ValidationError};
pub use money::Money;
pub use policy::{BonusByProfit, BonusPolicy, BonusTierOrder, RevenuePolicy, SimpleRevenue};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of best-selling products kept per seller unless configured otherwise.
pub const DEFAULT_TOP_PRODUCTS_LIMIT: usize = 10;
