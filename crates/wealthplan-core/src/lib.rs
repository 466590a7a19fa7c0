//! Calculation engine for a loan and investment planner.
//!
//! Every function is a pure, synchronous computation over its inputs.
//! Money and rates use 128-bit decimals; rates on public records are annual
//! percentages (8.5 = 8.5% p.a.).

pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loan")]
pub mod loan;

#[cfg(feature = "income")]
pub mod income;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::{Degradation, PlannerError};
pub use types::*;

/// Standard result type for all planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
