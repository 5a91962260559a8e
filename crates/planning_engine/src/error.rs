//! Engine error taxonomy.
//!
//! Every engine entry point returns `Result<T, EngineError>`. The engine
//! never logs, retries, or swallows an error (see the crate-level error
//! handling policy): a failed call returns nothing, and it is entirely
//! the caller's job to turn an `EngineError` into a user-facing message.

use crate::assumptions::Region;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the public engine API.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A requested `(region, version)` assumptions bundle is not registered.
    AssumptionNotFound { region: Region, version: String },
    /// An input violated a documented invariant. `field` names the
    /// offending field so a UI can highlight it.
    Validation { field: &'static str, message: String },
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::AssumptionNotFound { region, version } => {
                write!(f, "no assumptions bundle for {region:?} {version}")
            }
            EngineError::Validation { field, message } => {
                write!(f, "invalid {field}: {message}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Internal data-contract violations in a compiled-in assumptions bundle.
///
/// Bundles are compile-time constants, so this is not expected at
/// runtime — it exists so tests can assert the calibration invariants of
/// a bundle hold, the same way a spreadsheet model's unit tests would.
/// Correlation symmetry isn't a variant here: `CorrelationMap` stores a
/// single entry per unordered asset pair, so an asymmetric correlation
/// can't be represented in the first place.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    RegimeProbabilitiesNotNormalized { sum: f64 },
    CorrelationDiagonalNotOne { asset: String, value: f64 },
    CorrelationOutOfRange { a: String, b: String, value: f64 },
}
