//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  AnalysisError        - Aborts a whole analysis run                     │
//! │  ├── InvalidData      - Dataset shape/uniqueness (wraps ValidationError)│
//! │  ├── MissingPolicy    - Revenue or bonus policy not supplied            │
//! │  └── UnknownReference - Record points at a seller/SKU that isn't there  │
//! │                                                                         │
//! │  ConfigError          - analysis.toml / environment problems            │
//! │                                                                         │
//! │  Flow: ValidationError → AnalysisError → caller                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (seller id, SKU, record index)
//! 3. Errors are enum variants, never String
//! 4. Every failure aborts the run, there are no partial reports

use std::fmt;

use thiserror::Error;

// =============================================================================
// Analysis Error
// =============================================================================

/// Errors raised by [`crate::analysis`].
///
/// All variants are raised before any aggregation starts, so a failed run
/// never produces a partial report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The dataset is structurally malformed or a required collection is empty.
    #[error("Invalid input data: {0}")]
    InvalidData(#[from] ValidationError),

    /// A policy slot was left empty.
    ///
    /// ## When This Occurs
    /// - `AnalysisOptions::new()` used without setting both policies
    /// - A caller cleared a policy while reconfiguring options
    #[error("Missing {policy} policy")]
    MissingPolicy { policy: &'static str },

    /// A purchase record references a seller or product that is not in the dataset.
    ///
    /// ## User Workflow
    /// ```text
    /// purchase_records[3].seller_id = "seller_9"
    ///      │
    ///      ▼
    /// seller index lookup: absent
    ///      │
    ///      ▼
    /// UnknownReference { kind: Seller, id: "seller_9", record_index: 3 }
    /// ```
    #[error("Purchase record {record_index} references unknown {kind} '{id}'")]
    UnknownReference {
        kind: ReferenceKind,
        id: String,
        record_index: usize,
    },
}

/// What kind of identifier failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A `seller_id` on a purchase record.
    Seller,
    /// A `sku` on a line item.
    Product,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Seller => write!(f, "seller"),
            ReferenceKind::Product => write!(f, "product"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Dataset validation errors.
///
/// Used for early validation before any aggregation runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required collection is absent from the dataset.
    #[error("{field} is required")]
    MissingCollection { field: String },

    /// A required collection is present but has no entries.
    #[error("{field} must not be empty")]
    EmptyCollection { field: String },

    /// Two entries share a key that must be unique (seller id, SKU).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },

    /// A line item sells no units.
    #[error("Purchase record {record_index} has zero quantity for '{sku}'")]
    ZeroQuantity { record_index: usize, sku: String },
}

// =============================================================================
// Config Error
// =============================================================================

/// Errors from loading or saving [`crate::config::AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Values parsed but break a config rule.
    #[error("Invalid analysis configuration: {0}")]
    Invalid(String),

    /// No explicit path and no platform config directory.
    #[error("No config path available")]
    NoConfigPath,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with AnalysisError.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Convenience type alias for Results with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
