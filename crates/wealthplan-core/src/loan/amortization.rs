//! Level-installment loan amortization with optional recurring extra payments.
//!
//! Interest accrues monthly at the nominal rate (annual / 12). Extra payments
//! go straight to principal and can retire the loan before the contractual
//! tenure; the final row always absorbs the residual balance so the schedule
//! never goes negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{Degradation, PlannerError};
use crate::time_value::{installment, normalize, simple_monthly_rate};
use crate::types::{with_metadata, ComputationOutput, ExtraPaymentFrequency, Money, Percent};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on months simulated for a single schedule. Longer tenures are
/// cut here and the partial schedule is returned.
pub const MAX_SCHEDULE_ITERATIONS: u32 = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_start_month() -> u32 {
    1
}

/// Loan terms for a single scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    /// Annual interest rate in percent (8.5 = 8.5%).
    pub annual_interest_rate: Percent,
    pub tenure_months: u32,
    /// Recurring extra payment toward principal. Defaults to 0.
    #[serde(default)]
    pub extra_payment: Money,
    /// Defaults to monthly.
    #[serde(default)]
    pub extra_payment_frequency: ExtraPaymentFrequency,
    /// First month (1-based) an extra payment is made. Defaults to 1.
    #[serde(default = "default_start_month")]
    pub extra_payment_start_month: u32,
}

impl LoanParameters {
    /// Plain loan with no extra payments.
    pub fn new(principal: Money, annual_interest_rate: Percent, tenure_months: u32) -> Self {
        LoanParameters {
            principal,
            annual_interest_rate,
            tenure_months,
            extra_payment: Decimal::ZERO,
            extra_payment_frequency: ExtraPaymentFrequency::Monthly,
            extra_payment_start_month: 1,
        }
    }

    pub fn with_extra_payment(
        mut self,
        amount: Money,
        frequency: ExtraPaymentFrequency,
        start_month: u32,
    ) -> Self {
        self.extra_payment = amount;
        self.extra_payment_frequency = frequency;
        self.extra_payment_start_month = start_month;
        self
    }

    /// Same loan without any extra payments.
    pub fn without_extra_payments(&self) -> Self {
        LoanParameters::new(self.principal, self.annual_interest_rate, self.tenure_months)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(PlannerError::invalid("principal", "principal must be > 0"));
        }
        if self.tenure_months == 0 {
            return Err(PlannerError::invalid("tenure_months", "tenure must be at least 1 month"));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(PlannerError::invalid(
                "annual_interest_rate",
                "interest rate cannot be negative",
            ));
        }
        if self.extra_payment < Decimal::ZERO {
            return Err(PlannerError::invalid("extra_payment", "extra payment cannot be negative"));
        }
        if self.extra_payment_start_month == 0 {
            return Err(PlannerError::invalid(
                "extra_payment_start_month",
                "start month is 1-based",
            ));
        }
        Ok(())
    }
}

/// One month of the repayment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub scheduled_payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub extra_payment: Money,
    pub total_payment: Money,
    pub remaining_balance: Money,
}

/// Month-ordered repayment schedule. `iteration_cap_reached` is set when the
/// simulation stopped at [`MAX_SCHEDULE_ITERATIONS`] with balance still owed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    pub iteration_cap_reached: bool,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Balance outstanding after `month`; zero once the loan is retired. Past
    /// the end of a capped schedule the last known balance carries forward.
    pub fn balance_after(&self, month: u32) -> Money {
        match self.rows.iter().take_while(|r| r.month <= month).last() {
            Some(row) => row.remaining_balance,
            None => self
                .rows
                .first()
                .map(|r| r.principal + r.extra_payment + r.remaining_balance)
                .unwrap_or(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub installment: Money,
    pub total_payments: Money,
    pub total_interest: Money,
    pub total_extra_payments: Money,
    pub actual_tenure_months: u32,
}

/// Effect of the configured extra payments against the same loan without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentImpact {
    pub baseline_total_interest: Money,
    pub interest_saved: Money,
    pub baseline_tenure_months: u32,
    pub months_saved: u32,
}

/// Top-level output from `analyze_loan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub installment: Money,
    pub summary: LoanSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payment_impact: Option<ExtraPaymentImpact>,
    pub schedule: AmortizationSchedule,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Equated monthly installment for the loan.
///
/// Returns 0 rather than an error when the formula leaves the decimal range
/// (absurd rate/tenure combinations).
pub fn compute_installment(params: &LoanParameters) -> PlannerResult<Money> {
    params.validate()?;
    let mut warnings = Vec::new();
    Ok(installment_normalized(params, &mut warnings))
}

/// Month-by-month repayment schedule, including extra payments.
pub fn generate_schedule(params: &LoanParameters) -> PlannerResult<AmortizationSchedule> {
    params.validate()?;
    let mut warnings = Vec::new();
    let emi = installment_normalized(params, &mut warnings);
    Ok(build_schedule(params, emi))
}

/// Aggregate a schedule. An empty schedule summarizes to all zeros.
pub fn summarize_schedule(schedule: &AmortizationSchedule) -> LoanSummary {
    let Some(first) = schedule.rows.first() else {
        return LoanSummary::default();
    };

    let mut summary = LoanSummary {
        installment: first.scheduled_payment,
        actual_tenure_months: schedule.rows.len() as u32,
        ..LoanSummary::default()
    };
    for row in &schedule.rows {
        summary.total_payments += row.total_payment;
        summary.total_interest += row.interest;
        summary.total_extra_payments += row.extra_payment;
    }
    summary
}

/// Installment, schedule and summary in one envelope. When extra payments are
/// configured the result also reports the saving against a plain schedule.
pub fn analyze_loan(params: &LoanParameters) -> PlannerResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    params.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    let emi = installment_normalized(params, &mut warnings);
    let schedule = build_schedule(params, emi);
    if schedule.iteration_cap_reached {
        warnings.push(cap_degradation("loan amortization").report());
    }
    if emi.is_zero() {
        warnings.push("Installment is zero; schedule is empty".into());
    }
    let summary = summarize_schedule(&schedule);

    let extra_payment_impact = if params.extra_payment > Decimal::ZERO {
        let baseline = summarize_schedule(&build_schedule(&params.without_extra_payments(), emi));
        Some(ExtraPaymentImpact {
            baseline_total_interest: baseline.total_interest,
            interest_saved: baseline.total_interest - summary.total_interest,
            baseline_tenure_months: baseline.actual_tenure_months,
            months_saved: baseline
                .actual_tenure_months
                .saturating_sub(summary.actual_tenure_months),
        })
    } else {
        None
    };

    let output = LoanAnalysis {
        installment: emi,
        summary,
        extra_payment_impact,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-installment amortization (nominal monthly rate, extra payments to principal)",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "annual_interest_rate_pct": params.annual_interest_rate.to_string(),
            "tenure_months": params.tenure_months,
            "extra_payment": params.extra_payment.to_string(),
            "extra_payment_frequency": params.extra_payment_frequency.as_str(),
            "extra_payment_start_month": params.extra_payment_start_month,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn installment_normalized(params: &LoanParameters, warnings: &mut Vec<String>) -> Money {
    let rate = simple_monthly_rate(params.annual_interest_rate);
    normalize(
        installment(params.principal, rate, params.tenure_months),
        "installment",
        warnings,
    )
}

pub(crate) fn cap_degradation(simulation: &str) -> Degradation {
    Degradation::IterationCapReached {
        simulation: simulation.to_string(),
        iterations: MAX_SCHEDULE_ITERATIONS,
    }
}

/// Simulate the loan with a precomputed installment. Parameters are assumed
/// validated.
pub(crate) fn build_schedule(params: &LoanParameters, emi: Money) -> AmortizationSchedule {
    if emi <= Decimal::ZERO {
        return AmortizationSchedule::default();
    }

    let rate = simple_monthly_rate(params.annual_interest_rate);
    let capacity = params.tenure_months.min(MAX_SCHEDULE_ITERATIONS) as usize;
    let mut rows: Vec<AmortizationRow> = Vec::with_capacity(capacity);
    let mut balance = params.principal;
    let mut iteration_cap_reached = false;

    for month in 1..=params.tenure_months {
        if month > MAX_SCHEDULE_ITERATIONS {
            iteration_cap_reached = true;
            break;
        }

        let interest = balance * rate;
        // The last contractual month clears whatever rounding left behind.
        let mut principal = if month == params.tenure_months {
            balance
        } else {
            (emi - interest).max(Decimal::ZERO)
        };
        let mut extra = if params
            .extra_payment_frequency
            .is_due(month, params.extra_payment_start_month)
        {
            params.extra_payment
        } else {
            Decimal::ZERO
        };

        if principal >= balance {
            principal = balance;
            extra = Decimal::ZERO;
            balance = Decimal::ZERO;
        } else if principal + extra >= balance {
            extra = balance - principal;
            balance = Decimal::ZERO;
        } else {
            balance = balance - principal - extra;
        }

        let scheduled_payment = principal + interest;
        rows.push(AmortizationRow {
            month,
            scheduled_payment,
            principal,
            interest,
            extra_payment: extra,
            total_payment: scheduled_payment + extra,
            remaining_balance: balance,
        });

        if balance.is_zero() {
            break;
        }
    }

    tracing::debug!(
        months = rows.len(),
        capped = iteration_cap_reached,
        "loan schedule built"
    );

    AmortizationSchedule {
        rows,
        iteration_cap_reached,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
