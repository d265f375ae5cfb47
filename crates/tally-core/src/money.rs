//! # Money Module
//!
//! Provides the `Money` type for two-decimal report amounts.
//!
//! ## Where Rounding Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Policies speak f64 currency units, reports speak integer cents         │
//! │                                                                         │
//! │  line revenue 33.333… ──► Money::from_amount ──► 3333 cents (per line) │
//! │  profit 12.3456…      ──► accumulated as f64, converted once at the end │
//! │  bonus  1.851…        ──► converted once at the end                     │
//! │                                                                         │
//! │  Rounding works on the exact binary value of the f64, so 1.045 (stored  │
//! │  as 1.04499…) becomes 1.04. Re-rounding a report value is a no-op.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let line = Money::from_amount(33.333);
//! assert_eq!(line.cents(), 3333);
//!
//! let total = line + Money::from_cents(1667);
//! assert_eq!(total.to_string(), "50.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

/// Number of minor units per currency unit.
const CENTS_PER_UNIT: f64 = 100.0;

/// Decimal places kept in reports.
const REPORT_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Profit and bonus go negative when goods sell below cost
/// - **Saturating**: Sums clamp at the i64 bounds instead of wrapping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support, serialized as integer cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a currency amount to two decimals and stores it as cents.
    ///
    /// The exact value of the `f64` is rounded, with halves going away
    /// from zero. NaN maps to zero. Amounts outside the i64 cent range,
    /// infinities included, saturate at the bounds.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(7.5).cents(), 750);
    /// assert_eq!(Money::from_amount(0.125).cents(), 13);
    /// assert_eq!(Money::from_amount(-0.125).cents(), -13);
    /// // 1.045 is stored as 1.04499999999999992894572642398998...
    /// assert_eq!(Money::from_amount(1.045).cents(), 104);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        if amount.is_nan() {
            return Money::zero();
        }

        Decimal::from_f64_retain(amount)
            .map(|exact| {
                exact.round_dp_with_strategy(REPORT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
            })
            .and_then(|rounded| rounded.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .unwrap_or(if amount.is_sign_negative() {
                Money(i64::MIN)
            } else {
                Money(i64::MAX)
            })
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in currency units.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1050).as_amount(), 10.5);
    /// ```
    #[inline]
    pub fn as_amount(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Rounds a currency amount to two decimals.
///
/// Same rule as [`Money::from_amount`], for callers that want a plain `f64`.
///
/// ## Example
/// ```rust
/// use tally_core::money::round_to_cents;
///
/// assert_eq!(round_to_cents(7.499), 7.5);
/// assert_eq!(round_to_cents(round_to_cents(1.005)), round_to_cents(1.005));
/// ```
pub fn round_to_cents(amount: f64) -> f64 {
    Money::from_amount(amount).as_amount()
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two-decimal display without a currency symbol.
///
/// Currency is the caller's concern; reports only guarantee two decimals.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
