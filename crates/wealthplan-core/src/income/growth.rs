//! Investment growth projection for a lump sum plus recurring contributions.
//!
//! Two variants answer different questions:
//! - `FutureValue` compounds at the geometric monthly rate, so twelve months
//!   reproduce the stated annual return exactly.
//! - `TaxAdjusted` builds a nominal schedule (annual / 12), taxes each month's
//!   growth before crediting it, and reports inflation-deflated figures next
//!   to the nominal ones. The deflated figures never feed back into the balance.
//!
//! Contributions land at the start of the month and grow with it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{Degradation, PlannerError};
use crate::time_value::{compounded_monthly_rate, normalize, ratio, simple_monthly_rate};
use crate::types::{with_metadata, ComputationOutput, ContributionFrequency, Money, Percent, Rate};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest projection produced (100 years). Longer horizons are truncated.
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which growth question the projection answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GrowthVariant {
    /// Pure compounding at the geometric monthly rate.
    #[default]
    FutureValue,
    /// Nominal monthly rate with tax on growth and inflation-deflated reporting.
    /// Missing percentages default to 0.
    TaxAdjusted {
        #[serde(default)]
        tax_bracket: Option<Percent>,
        #[serde(default)]
        inflation_rate: Option<Percent>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeParameters {
    pub initial_lump_sum: Money,
    pub periodic_contribution: Money,
    #[serde(default)]
    pub contribution_frequency: ContributionFrequency,
    /// Annual growth in percent; may be zero or negative (above -100).
    pub annual_growth_rate: Percent,
    pub time_horizon_months: u32,
    #[serde(default)]
    pub variant: GrowthVariant,
}

impl IncomeParameters {
    pub fn validate(&self) -> PlannerResult<()> {
        if self.initial_lump_sum < Decimal::ZERO {
            return Err(PlannerError::invalid("initial_lump_sum", "lump sum cannot be negative"));
        }
        if self.periodic_contribution < Decimal::ZERO {
            return Err(PlannerError::invalid(
                "periodic_contribution",
                "contribution cannot be negative",
            ));
        }
        if self.time_horizon_months == 0 {
            return Err(PlannerError::invalid(
                "time_horizon_months",
                "time horizon must be at least 1 month",
            ));
        }
        if self.annual_growth_rate <= dec!(-100) {
            return Err(PlannerError::invalid(
                "annual_growth_rate",
                "growth rate must be above -100%",
            ));
        }
        if let GrowthVariant::TaxAdjusted {
            tax_bracket,
            inflation_rate,
        } = &self.variant
        {
            let tax = tax_bracket.unwrap_or(Decimal::ZERO);
            if tax < Decimal::ZERO || tax > dec!(100) {
                return Err(PlannerError::invalid("tax_bracket", "tax bracket must be within 0-100%"));
            }
            if inflation_rate.unwrap_or(Decimal::ZERO) <= dec!(-100) {
                return Err(PlannerError::invalid(
                    "inflation_rate",
                    "inflation rate must be above -100%",
                ));
            }
        }
        Ok(())
    }

    /// Monthly rate implied by the variant's convention.
    pub fn monthly_rate(&self, warnings: &mut Vec<String>) -> Rate {
        match self.variant {
            GrowthVariant::FutureValue => normalize(
                compounded_monthly_rate(self.annual_growth_rate),
                "compounded monthly growth rate",
                warnings,
            ),
            GrowthVariant::TaxAdjusted { .. } => simple_monthly_rate(self.annual_growth_rate),
        }
    }
}

/// One month of the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeScheduleRow {
    pub month: u32,
    pub starting_balance: Money,
    pub contribution: Money,
    /// Growth credited to the balance, net of tax.
    pub growth: Money,
    pub tax_on_growth: Money,
    pub ending_balance: Money,
    pub real_ending_balance: Money,
    pub real_growth: Money,
}

/// Month-ordered projection. `horizon_truncated` is set when the requested
/// horizon ran past [`MAX_PROJECTION_MONTHS`] and the rows stop there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeProjection {
    pub rows: Vec<IncomeScheduleRow>,
    pub horizon_truncated: bool,
}

impl IncomeProjection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IncomeScheduleRow> {
        self.rows.last()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub final_balance: Money,
    /// Lump sum plus every periodic contribution.
    pub total_contributions: Money,
    pub total_growth: Money,
    pub total_tax: Money,
    pub final_real_balance: Money,
}

/// Twelve-month rollup of the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeYear {
    pub year: u32,
    pub contributions: Money,
    pub growth: Money,
    pub ending_balance: Money,
    pub real_ending_balance: Money,
}

/// Top-level output from `analyze_income`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeAnalysis {
    pub monthly_rate: Rate,
    pub summary: IncomeSummary,
    pub year_by_year: Vec<IncomeYear>,
    pub horizon_truncated: bool,
    pub rows: Vec<IncomeScheduleRow>,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Month-by-month growth schedule from month 1 to the horizon. Horizons past
/// [`MAX_PROJECTION_MONTHS`] stop at the cap with `horizon_truncated` set.
pub fn project_growth(params: &IncomeParameters) -> PlannerResult<IncomeProjection> {
    params.validate()?;
    let mut warnings = Vec::new();
    let rate = params.monthly_rate(&mut warnings);
    Ok(run_projection(params, rate, &mut warnings))
}

/// Aggregate a projection. An empty slice summarizes to all zeros.
pub fn summarize_projection(rows: &[IncomeScheduleRow]) -> IncomeSummary {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return IncomeSummary::default();
    };

    let mut summary = IncomeSummary {
        final_balance: last.ending_balance,
        total_contributions: first.starting_balance,
        final_real_balance: last.real_ending_balance,
        ..IncomeSummary::default()
    };
    for row in rows {
        summary.total_contributions += row.contribution;
        summary.total_growth += row.growth;
        summary.total_tax += row.tax_on_growth;
    }
    summary
}

/// Projection, summary and yearly rollup in one envelope.
pub fn analyze_income(params: &IncomeParameters) -> PlannerResult<ComputationOutput<IncomeAnalysis>> {
    let start = Instant::now();
    params.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    let monthly_rate = params.monthly_rate(&mut warnings);
    let projection = run_projection(params, monthly_rate, &mut warnings);
    if projection.horizon_truncated {
        warnings.push(truncation_degradation().report());
    }
    let summary = summarize_projection(&projection.rows);
    let year_by_year = yearly_rollup(&projection.rows);

    let (methodology, tax_bracket, inflation_rate) = match &params.variant {
        GrowthVariant::FutureValue => (
            "Future value projection (geometric monthly compounding)",
            None,
            None,
        ),
        GrowthVariant::TaxAdjusted {
            tax_bracket,
            inflation_rate,
        } => (
            "Tax-adjusted income growth (nominal monthly rate, taxed growth, inflation-deflated reporting)",
            Some(tax_bracket.unwrap_or(Decimal::ZERO)),
            Some(inflation_rate.unwrap_or(Decimal::ZERO)),
        ),
    };

    let output = IncomeAnalysis {
        monthly_rate,
        summary,
        year_by_year,
        horizon_truncated: projection.horizon_truncated,
        rows: projection.rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "initial_lump_sum": params.initial_lump_sum.to_string(),
            "periodic_contribution": params.periodic_contribution.to_string(),
            "contribution_frequency": params.contribution_frequency.as_str(),
            "annual_growth_rate_pct": params.annual_growth_rate.to_string(),
            "time_horizon_months": params.time_horizon_months,
            "tax_bracket_pct": tax_bracket.map(|t| t.to_string()),
            "inflation_rate_pct": inflation_rate.map(|i| i.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn truncation_degradation() -> Degradation {
    Degradation::IterationCapReached {
        simulation: "income projection".into(),
        iterations: MAX_PROJECTION_MONTHS,
    }
}

/// Run the monthly simulation at `rate`. Parameters are assumed validated.
pub(crate) fn run_projection(
    params: &IncomeParameters,
    rate: Rate,
    warnings: &mut Vec<String>,
) -> IncomeProjection {
    let (tax_fraction, monthly_inflation) = match &params.variant {
        GrowthVariant::FutureValue => (Decimal::ZERO, Decimal::ZERO),
        GrowthVariant::TaxAdjusted {
            tax_bracket,
            inflation_rate,
        } => (
            tax_bracket.unwrap_or(Decimal::ZERO) / dec!(100),
            simple_monthly_rate(inflation_rate.unwrap_or(Decimal::ZERO)),
        ),
    };

    let horizon_truncated = params.time_horizon_months > MAX_PROJECTION_MONTHS;
    let months = params.time_horizon_months.min(MAX_PROJECTION_MONTHS);

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = params.initial_lump_sum;
    let mut inflation_factor = Decimal::ONE;

    for month in 1..=months {
        let starting = balance;
        let contribution = if params.contribution_frequency.is_due(month) {
            params.periodic_contribution
        } else {
            Decimal::ZERO
        };
        let invested = normalize(
            starting.checked_add(contribution),
            &format!("invested balance in month {month}"),
            warnings,
        );
        let gross = normalize(
            invested.checked_mul(rate),
            &format!("growth in month {month}"),
            warnings,
        );
        let tax = gross.max(Decimal::ZERO) * tax_fraction;
        let growth = gross - tax;
        let ending = match invested.checked_add(growth) {
            Some(v) => v,
            None => {
                warnings.push(
                    Degradation::NonFiniteNormalized {
                        context: format!("ending balance in month {month}"),
                    }
                    .report(),
                );
                invested
            }
        };

        inflation_factor = normalize(
            inflation_factor.checked_mul(Decimal::ONE + monthly_inflation),
            &format!("inflation factor in month {month}"),
            warnings,
        );

        rows.push(IncomeScheduleRow {
            month,
            starting_balance: starting,
            contribution,
            growth,
            tax_on_growth: tax,
            ending_balance: ending,
            real_ending_balance: ratio(ending, inflation_factor),
            real_growth: ratio(growth, inflation_factor),
        });
        balance = ending;
    }

    tracing::debug!(
        months = rows.len(),
        truncated = horizon_truncated,
        final_balance = %balance,
        "income projection built"
    );
    IncomeProjection {
        rows,
        horizon_truncated,
    }
}

fn yearly_rollup(rows: &[IncomeScheduleRow]) -> Vec<IncomeYear> {
    rows.chunks(12)
        .enumerate()
        .filter_map(|(i, chunk)| {
            let last = chunk.last()?;
            Some(IncomeYear {
                year: i as u32 + 1,
                contributions: chunk.iter().map(|r| r.contribution).sum(),
                growth: chunk.iter().map(|r| r.growth).sum(),
                ending_balance: last.ending_balance,
                real_ending_balance: last.real_ending_balance,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
