//! # Business Policies
//!
//! Revenue-per-line and bonus-per-rank formulas are injected into the
//! analyzer instead of being hard-coded.
//!
//! ## Policy Contracts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RevenuePolicy                                                          │
//! │    line_revenue(&LineItem, &Product) -> f64                             │
//! │    Called once per line item, in input order. Unrounded result.         │
//! │                                                                         │
//! │  BonusPolicy                                                            │
//! │    bonus(rank, total, &SellerStat) -> f64                               │
//! │    Called once per seller after ranking. rank is 0-based.               │
//! │                                                                         │
//! │  Both must be deterministic for the report to be reproducible.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Plain closures with matching signatures implement both traits:
//!
//! ```rust
//! use tally_core::policy::{BonusPolicy, RevenuePolicy};
//! use tally_core::{LineItem, Product, SellerStat};
//!
//! let flat_price = |item: &LineItem, _product: &Product| item.quantity as f64 * 10.0;
//! let no_bonus = |_rank: usize, _total: usize, _seller: &SellerStat| 0.0;
//!
//! let revenue: &dyn RevenuePolicy = &flat_price;
//! let bonus: &dyn BonusPolicy = &no_bonus;
//! # let _ = (revenue, bonus);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::BonusSettings;
use crate::types::{LineItem, Product, SellerStat};

// =============================================================================
// Policy Traits
// =============================================================================

/// Computes the revenue of one line item.
pub trait RevenuePolicy {
    /// Revenue for `item` in currency units, before any rounding.
    fn line_revenue(&self, item: &LineItem, product: &Product) -> f64;
}

impl<F> RevenuePolicy for F
where
    F: Fn(&LineItem, &Product) -> f64,
{
    fn line_revenue(&self, item: &LineItem, product: &Product) -> f64 {
        self(item, product)
    }
}

/// Computes a seller's bonus from their final rank.
pub trait BonusPolicy {
    /// Bonus in currency units for the seller at `rank` (0-based) out of `total`.
    fn bonus(&self, rank: usize, total: usize, seller: &SellerStat) -> f64;
}

impl<F> BonusPolicy for F
where
    F: Fn(usize, usize, &SellerStat) -> f64,
{
    fn bonus(&self, rank: usize, total: usize, seller: &SellerStat) -> f64 {
        self(rank, total, seller)
    }
}

// =============================================================================
// Simple Revenue
// =============================================================================

/// `price × quantity × (1 − discount / 100)`.
///
/// `price` is the line's own `sale_price` when present, else the
/// catalogue `sale_price`.
///
/// ## Example
/// ```rust
/// use tally_core::policy::{RevenuePolicy, SimpleRevenue};
/// use tally_core::{LineItem, Product};
///
/// let product = Product {
///     sku: "P1".into(),
///     name: "Widget".into(),
///     category: "Tools".into(),
///     purchase_price: 10.0,
///     sale_price: 20.0,
/// };
/// let item = LineItem { sku: "P1".into(), quantity: 5, discount: 10.0, sale_price: None };
///
/// assert_eq!(SimpleRevenue.line_revenue(&item, &product), 90.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRevenue;

impl RevenuePolicy for SimpleRevenue {
    fn line_revenue(&self, item: &LineItem, product: &Product) -> f64 {
        let price = item.sale_price.unwrap_or(product.sale_price);
        let discount = 1.0 - item.discount / 100.0;
        price * item.quantity as f64 * discount
    }
}

// =============================================================================
// Bonus By Profit
// =============================================================================

/// Which check wins when the last-placed seller is also in the top three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusTierOrder {
    /// Rank 0, then ranks 1-2, then last place.
    /// With two sellers the runner-up gets the podium rate, and a single
    /// seller gets the first-place rate.
    #[default]
    PodiumFirst,

    /// Last place is checked first, so it always gets the last-place rate.
    LastPlaceFirst,
}

impl std::fmt::Display for BonusTierOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BonusTierOrder::PodiumFirst => write!(f, "podium_first"),
            BonusTierOrder::LastPlaceFirst => write!(f, "last_place_first"),
        }
    }
}

impl std::str::FromStr for BonusTierOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "podium_first" | "podium-first" => Ok(BonusTierOrder::PodiumFirst),
            "last_place_first" | "last-place-first" => Ok(BonusTierOrder::LastPlaceFirst),
            other => Err(format!(
                "Unknown bonus tier order: '{}'. Valid options: podium_first, last_place_first",
                other
            )),
        }
    }
}

/// Percentage of profit by rank, in basis points (1500 = 15%).
///
/// ## Tiers (defaults)
/// ```text
/// rank 0            → 15%
/// rank 1, 2         → 10%
/// rank total - 1    →  0%
/// everyone else     →  5%
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusByProfit {
    pub first_place_bps: u32,
    pub podium_bps: u32,
    pub standard_bps: u32,
    pub last_place_bps: u32,
    pub tier_order: BonusTierOrder,
}

impl Default for BonusByProfit {
    fn default() -> Self {
        BonusByProfit::from_settings(&BonusSettings::default())
    }
}

impl BonusByProfit {
    /// Builds the policy from the `[bonus]` config section.
    pub fn from_settings(settings: &BonusSettings) -> Self {
        BonusByProfit {
            first_place_bps: settings.first_place_bps,
            podium_bps: settings.podium_bps,
            standard_bps: settings.standard_bps,
            last_place_bps: settings.last_place_bps,
            tier_order: settings.tier_order,
        }
    }

    /// Returns the rate that applies to `rank`, in basis points.
    pub fn rate_bps(&self, rank: usize, total: usize) -> u32 {
        let is_last = rank + 1 == total;
        if self.tier_order == BonusTierOrder::LastPlaceFirst && is_last {
            return self.last_place_bps;
        }

        match rank {
            0 => self.first_place_bps,
            1 | 2 => self.podium_bps,
            _ if is_last => self.last_place_bps,
            _ => self.standard_bps,
        }
    }
}

impl BonusPolicy for BonusByProfit {
    fn bonus(&self, rank: usize, total: usize, seller: &SellerStat) -> f64 {
        let rate = self.rate_bps(rank, total) as f64 / 10_000.0;
        seller.profit * rate
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
