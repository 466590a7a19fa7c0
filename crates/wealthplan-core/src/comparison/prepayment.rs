//! Prepay the loan or invest the same money?
//!
//! Two simulations run side by side with the same periodic amount on the same
//! months:
//! - **Prepay**: the amount goes to principal as an extra payment until the
//!   loan is retired.
//! - **Invest**: the loan runs on its plain schedule and the amount is invested
//!   at the investment rate (nominal monthly, credited at month end).
//!
//! Both are measured over the same horizon, the month the prepaid loan is
//! retired. Over that horizon the prepay strategy saves
//! `baseline_interest - prepay_interest`, and the invest strategy earns
//! `corpus - contributions`. When the investment rate equals the loan rate the
//! two figures coincide, because the gap between the two loan balances evolves
//! exactly like the investment account.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{Degradation, PlannerError};
use crate::loan::amortization::{
    build_schedule, cap_degradation, installment_normalized, AmortizationSchedule,
    LoanParameters,
};
use crate::time_value::simple_monthly_rate;
use crate::types::{with_metadata, ComputationOutput, ExtraPaymentFrequency, Money, Percent};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_start_month() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentComparisonInput {
    pub principal: Money,
    /// Annual loan rate in percent.
    pub annual_interest_rate: Percent,
    pub tenure_months: u32,
    /// Amount either prepaid or invested on each due month.
    pub periodic_amount: Money,
    #[serde(default)]
    pub frequency: ExtraPaymentFrequency,
    #[serde(default = "default_start_month")]
    pub start_month: u32,
    /// Annual investment return in percent.
    pub investment_return_rate: Percent,
    /// Tax on investment gains in percent. Defaults to 0.
    #[serde(default)]
    pub investment_tax_rate: Option<Percent>,
}

impl PrepaymentComparisonInput {
    fn prepay_loan(&self) -> LoanParameters {
        LoanParameters::new(self.principal, self.annual_interest_rate, self.tenure_months)
            .with_extra_payment(self.periodic_amount, self.frequency, self.start_month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    PrepayLoan,
    InvestMoney,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub months_to_repay_with_prepayment: u32,
    pub baseline_tenure_months: u32,
    pub months_saved: u32,
    pub baseline_total_interest: Money,
    pub total_interest_with_prepayment: Money,
    /// Interest avoided over the whole life of the loan.
    pub lifetime_interest_saved: Money,
    /// Interest avoided up to the prepaid loan's payoff month.
    pub interest_saved: Money,
    pub total_invested: Money,
    pub investment_value: Money,
    pub investment_tax: Money,
    /// Investment value less contributions and tax, at the payoff month.
    pub net_gain_from_investment: Money,
    pub recommendation: Recommendation,
    /// Absolute gap between `interest_saved` and `net_gain_from_investment`.
    pub difference: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn compare_prepayment_vs_investment(
    input: &PrepaymentComparisonInput,
) -> PlannerResult<ComputationOutput<ComparisonResult>> {
    let start = Instant::now();
    let prepay_params = input.prepay_loan();
    prepay_params.validate()?;
    if input.investment_return_rate <= dec!(-100) {
        return Err(PlannerError::invalid(
            "investment_return_rate",
            "investment return must be above -100%",
        ));
    }
    let tax_rate = input.investment_tax_rate.unwrap_or(Decimal::ZERO);
    if tax_rate < Decimal::ZERO || tax_rate > dec!(100) {
        return Err(PlannerError::invalid(
            "investment_tax_rate",
            "tax rate must be within 0-100%",
        ));
    }

    let mut warnings: Vec<String> = Vec::new();

    // --- (a) loan with and without prepayment ---
    let emi = installment_normalized(&prepay_params, &mut warnings);
    let baseline = build_schedule(&prepay_params.without_extra_payments(), emi);
    let prepaid = build_schedule(&prepay_params, emi);
    if baseline.iteration_cap_reached || prepaid.iteration_cap_reached {
        warnings.push(cap_degradation("prepayment simulation").report());
    }

    let horizon = prepaid.len();
    let baseline_total_interest = total_interest(&baseline, baseline.len());
    let baseline_interest_to_horizon = total_interest(&baseline, horizon);
    let total_interest_with_prepayment = total_interest(&prepaid, horizon);
    let interest_saved = baseline_interest_to_horizon - total_interest_with_prepayment;

    // --- (b) same amount invested on the same months ---
    let (total_invested, investment_value) = simulate_investment(input, horizon as u32, &mut warnings);
    let gross_gain = investment_value - total_invested;
    let investment_tax = gross_gain.max(Decimal::ZERO) * tax_rate / dec!(100);
    let net_gain_from_investment = gross_gain - investment_tax;

    // Ties go to prepayment.
    let recommendation = if interest_saved >= net_gain_from_investment {
        Recommendation::PrepayLoan
    } else {
        Recommendation::InvestMoney
    };

    let baseline_tenure_months = baseline.len() as u32;
    let months_to_repay = horizon as u32;
    let output = ComparisonResult {
        months_to_repay_with_prepayment: months_to_repay,
        baseline_tenure_months,
        months_saved: baseline_tenure_months.saturating_sub(months_to_repay),
        baseline_total_interest,
        total_interest_with_prepayment,
        lifetime_interest_saved: baseline_total_interest - total_interest_with_prepayment,
        interest_saved,
        total_invested,
        investment_value,
        investment_tax,
        net_gain_from_investment,
        recommendation,
        difference: (interest_saved - net_gain_from_investment).abs(),
    };

    tracing::debug!(
        months = months_to_repay,
        %interest_saved,
        %net_gain_from_investment,
        ?recommendation,
        "prepayment comparison finished"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepay vs invest (equal-horizon simulation to prepaid payoff month)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_interest_rate_pct": input.annual_interest_rate.to_string(),
            "tenure_months": input.tenure_months,
            "periodic_amount": input.periodic_amount.to_string(),
            "frequency": input.frequency.as_str(),
            "start_month": input.start_month,
            "investment_return_rate_pct": input.investment_return_rate.to_string(),
            "investment_tax_rate_pct": tax_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn total_interest(schedule: &AmortizationSchedule, months: usize) -> Money {
    schedule.rows.iter().take(months).map(|r| r.interest).sum()
}

/// Invest `periodic_amount` on every due month up to `months`. Returns
/// (contributions, corpus).
fn simulate_investment(
    input: &PrepaymentComparisonInput,
    months: u32,
    warnings: &mut Vec<String>,
) -> (Money, Money) {
    let growth = Decimal::ONE + simple_monthly_rate(input.investment_return_rate);
    let mut corpus = Decimal::ZERO;
    let mut contributed = Decimal::ZERO;

    for month in 1..=months {
        let contribution = if input.frequency.is_due(month, input.start_month) {
            input.periodic_amount
        } else {
            Decimal::ZERO
        };
        corpus = match corpus.checked_mul(growth).and_then(|v| v.checked_add(contribution)) {
            Some(v) => v,
            None => {
                warnings.push(
                    Degradation::NonFiniteNormalized {
                        context: format!("investment corpus in month {month}"),
                    }
                    .report(),
                );
                return (contributed + contribution, Decimal::ZERO);
            }
        };
        contributed += contribution;
    }

    (contributed, corpus)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
