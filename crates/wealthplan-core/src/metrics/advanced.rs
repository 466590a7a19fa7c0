//! Comparative metrics derived from a loan schedule and an investment
//! projection. Every ratio is zero-safe: a zero principal, contribution total
//! or horizon yields 0 instead of an error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PlannerError;
use crate::income::growth::{
    run_projection, summarize_projection, truncation_degradation, IncomeParameters,
};
use crate::loan::amortization::{
    build_schedule, cap_degradation, installment_normalized, summarize_schedule, LoanParameters,
};
use crate::metrics::break_even::break_even_month;
use crate::time_value::{finite_or_zero, normalize, ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PlannerResult;

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedMetricsInput {
    pub loan: LoanParameters,
    pub income: IncomeParameters,
    /// Annual inflation in percent. Defaults to 0.
    #[serde(default)]
    pub inflation_rate: Option<Percent>,
    /// Marginal tax bracket on investment returns, in percent. Defaults to 0.
    #[serde(default)]
    pub tax_bracket: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    // Loan cost
    pub effective_interest_rate: Percent,
    pub interest_to_principal_pct: Percent,
    pub total_cost_multiple: Decimal,
    // Investment return
    pub investment_return_pct: Percent,
    pub investment_multiple: Decimal,
    pub wealth_accumulation_rate: Percent,
    pub real_return_after_inflation: Percent,
    pub post_tax_return: Percent,
    // Interaction
    pub break_even_month: u32,
    pub debt_to_investment_ratio: Decimal,
    /// Investment growth minus loan interest over the two horizons.
    pub net_growth_over_interest: Money,
}

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

/// Annualized cost of borrowing: `interest / principal * 100 / (tenure / 12)`.
pub fn effective_interest_rate(total_interest: Money, principal: Money, tenure_months: u32) -> Percent {
    let years = Decimal::from(tenure_months) / MONTHS_PER_YEAR;
    finite_or_zero(
        percentage(total_interest, principal).map(|pct| ratio(pct, years)),
        "effective interest rate",
    )
}

/// Nominal return less inflation (simple subtraction).
pub fn real_return_after_inflation(expected_return: Percent, inflation_rate: Percent) -> Percent {
    finite_or_zero(
        expected_return.checked_sub(inflation_rate),
        "real return after inflation",
    )
}

/// Return left after tax at `tax_bracket` percent.
pub fn post_tax_return(expected_return: Percent, tax_bracket: Percent) -> Percent {
    let kept = Decimal::ONE.checked_sub(tax_bracket / PERCENT);
    finite_or_zero(
        kept.and_then(|k| expected_return.checked_mul(k)),
        "post-tax return",
    )
}

/// `numerator / denominator * 100`; zero on a zero denominator, `None` past
/// the decimal range.
fn percentage(numerator: Decimal, denominator: Decimal) -> Option<Percent> {
    ratio(numerator, denominator).checked_mul(PERCENT)
}

/// Lump sum and monthly-equivalent contribution used for the break-even search.
/// A one-time contribution joins the lump sum.
fn monthly_equivalent(income: &IncomeParameters) -> (Money, Money) {
    match income.contribution_frequency.interval_months() {
        Some(months) => (
            income.initial_lump_sum,
            income.periodic_contribution / Decimal::from(months),
        ),
        None => (
            finite_or_zero(
                income.initial_lump_sum.checked_add(income.periodic_contribution),
                "break-even lump sum",
            ),
            Decimal::ZERO,
        ),
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute the full metrics bundle for a loan/investment pair.
pub fn compute_advanced_metrics(
    input: &AdvancedMetricsInput,
) -> PlannerResult<ComputationOutput<AdvancedMetrics>> {
    let start = Instant::now();
    input.loan.validate()?;
    input.income.validate()?;
    let tax_bracket = input.tax_bracket.unwrap_or(Decimal::ZERO);
    if tax_bracket < Decimal::ZERO || tax_bracket > PERCENT {
        return Err(PlannerError::invalid("tax_bracket", "tax bracket must be within 0-100%"));
    }
    let inflation_rate = input.inflation_rate.unwrap_or(Decimal::ZERO);

    let mut warnings: Vec<String> = Vec::new();

    // --- Loan side ---
    let emi = installment_normalized(&input.loan, &mut warnings);
    let schedule = build_schedule(&input.loan, emi);
    if schedule.iteration_cap_reached {
        warnings.push(cap_degradation("loan amortization").report());
    }
    let loan = summarize_schedule(&schedule);
    let principal = input.loan.principal;

    // --- Investment side ---
    let rate = input.income.monthly_rate(&mut warnings);
    let projection = run_projection(&input.income, rate, &mut warnings);
    if projection.horizon_truncated {
        warnings.push(truncation_degradation().report());
    }
    let investment = summarize_projection(&projection.rows);
    let horizon_years = Decimal::from(projection.len() as u32) / MONTHS_PER_YEAR;
    let investment_return_pct = normalize(
        percentage(investment.total_growth, investment.total_contributions),
        "investment return",
        &mut warnings,
    );

    // --- Interaction ---
    let (lump_sum, monthly) = monthly_equivalent(&input.income);
    let break_even = break_even_month(
        &input.loan,
        lump_sum,
        monthly,
        input.income.annual_growth_rate,
    )?;

    let expected_return = input.income.annual_growth_rate;
    let interest_to_principal_pct = normalize(
        percentage(loan.total_interest, principal),
        "interest to principal",
        &mut warnings,
    );
    let net_growth_over_interest = normalize(
        investment.total_growth.checked_sub(loan.total_interest),
        "net growth over interest",
        &mut warnings,
    );
    let metrics = AdvancedMetrics {
        effective_interest_rate: effective_interest_rate(
            loan.total_interest,
            principal,
            loan.actual_tenure_months,
        ),
        interest_to_principal_pct,
        total_cost_multiple: ratio(loan.total_payments, principal),
        investment_return_pct,
        investment_multiple: ratio(investment.final_balance, investment.total_contributions),
        wealth_accumulation_rate: ratio(investment_return_pct, horizon_years),
        real_return_after_inflation: real_return_after_inflation(expected_return, inflation_rate),
        post_tax_return: post_tax_return(expected_return, tax_bracket),
        break_even_month: break_even,
        debt_to_investment_ratio: ratio(principal, investment.final_balance),
        net_growth_over_interest,
    };

    if investment.total_contributions.is_zero() {
        warnings.push("No contributions; investment ratios reported as 0".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Advanced loan/investment metrics (effective cost, returns, break-even)",
        &serde_json::json!({
            "principal": principal.to_string(),
            "annual_interest_rate_pct": input.loan.annual_interest_rate.to_string(),
            "tenure_months": input.loan.tenure_months,
            "annual_growth_rate_pct": expected_return.to_string(),
            "time_horizon_months": input.income.time_horizon_months,
            "inflation_rate_pct": inflation_rate.to_string(),
            "tax_bracket_pct": tax_bracket.to_string(),
            "break_even_investment": {
                "lump_sum": lump_sum.to_string(),
                "monthly_equivalent": monthly.to_string(),
            },
        }),
        warnings,
        elapsed,
        metrics,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
