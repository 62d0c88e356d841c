//! Tunable Parameters: named, range-constrained values edited from a panel.
//!
//! # Invariants
//! - Parameter names are unique within a store; each name has exactly one owning declaration.
//! - Stored numeric values always lie within the declared `[min, max]`, on the step grid.
//! - Subscribers observe a change only when one of their keys was actually rewritten.

mod overrides;
mod store;
mod value;

pub use overrides::{load_overrides, parse_overrides};
pub use store::{ParamEntry, ParamStore, SubscriptionId};
pub use value::{Declaration, NumberRange, ParamSpec, ParamValue, ParamValues};

/// Errors from parameter operations.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("parameter {name:?} is already declared by {owner:?}")]
    NameCollision { name: String, owner: String },
    #[error("unknown parameter {0:?}")]
    Unknown(String),
    #[error("parameter {name:?} expects a {expected} value")]
    TypeMismatch { name: String, expected: &'static str },
    #[error("parameter {name:?} has an invalid range: {reason}")]
    InvalidRange { name: String, reason: &'static str },
    #[error("parameter {0:?} cannot be set to NaN")]
    NotANumber(String),
    #[error("unknown subscription {0:?}")]
    UnknownSubscription(SubscriptionId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
