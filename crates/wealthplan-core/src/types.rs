use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlannerError;

/// All monetary values (rupee-denominated). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual rates as entered by the user, in percent (8.5 = 8.5% p.a.).
pub type Percent = Decimal;

/// Per-period rates expressed as decimals (0.0070833 = 0.708% per month).
pub type Rate = Decimal;

/// How often an extra loan payment recurs once it has started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraPaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    Semiannually,
    Annually,
}

impl ExtraPaymentFrequency {
    pub fn interval_months(self) -> u32 {
        match self {
            ExtraPaymentFrequency::Monthly => 1,
            ExtraPaymentFrequency::Quarterly => 3,
            ExtraPaymentFrequency::Semiannually => 6,
            ExtraPaymentFrequency::Annually => 12,
        }
    }

    /// True when an extra payment falls due in `month`, counting intervals
    /// from `start_month`.
    pub fn is_due(self, month: u32, start_month: u32) -> bool {
        month >= start_month && (month - start_month) % self.interval_months() == 0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExtraPaymentFrequency::Monthly => "monthly",
            ExtraPaymentFrequency::Quarterly => "quarterly",
            ExtraPaymentFrequency::Semiannually => "semiannually",
            ExtraPaymentFrequency::Annually => "annually",
        }
    }
}

impl fmt::Display for ExtraPaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtraPaymentFrequency {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(ExtraPaymentFrequency::Monthly),
            "quarterly" => Ok(ExtraPaymentFrequency::Quarterly),
            "semiannually" => Ok(ExtraPaymentFrequency::Semiannually),
            "annually" => Ok(ExtraPaymentFrequency::Annually),
            other => Err(PlannerError::invalid(
                "extra_payment_frequency",
                format!("unknown frequency '{other}'"),
            )),
        }
    }
}

/// How often a recurring investment contribution is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionFrequency {
    #[default]
    Monthly,
    Quarterly,
    Annually,
    OneTime,
}

impl ContributionFrequency {
    /// Contribution boundaries are counted from month 1: quarterly lands on
    /// months 1, 4, 7…, annually on 1, 13, 25…, one-time on month 1 only.
    pub fn is_due(self, month: u32) -> bool {
        if month == 0 {
            return false;
        }
        match self {
            ContributionFrequency::Monthly => true,
            ContributionFrequency::Quarterly => (month - 1) % 3 == 0,
            ContributionFrequency::Annually => (month - 1) % 12 == 0,
            ContributionFrequency::OneTime => month == 1,
        }
    }

    /// Number of months one contribution covers; `None` for a one-time contribution.
    pub fn interval_months(self) -> Option<u32> {
        match self {
            ContributionFrequency::Monthly => Some(1),
            ContributionFrequency::Quarterly => Some(3),
            ContributionFrequency::Annually => Some(12),
            ContributionFrequency::OneTime => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContributionFrequency::Monthly => "monthly",
            ContributionFrequency::Quarterly => "quarterly",
            ContributionFrequency::Annually => "annually",
            ContributionFrequency::OneTime => "one-time",
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionFrequency {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(ContributionFrequency::Monthly),
            "quarterly" => Ok(ContributionFrequency::Quarterly),
            "annually" => Ok(ContributionFrequency::Annually),
            "one-time" => Ok(ContributionFrequency::OneTime),
            other => Err(PlannerError::invalid(
                "contribution_frequency",
                format!("unknown frequency '{other}'"),
            )),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
