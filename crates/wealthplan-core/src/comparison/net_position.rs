use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::income::growth::{run_projection, truncation_degradation, IncomeParameters};
use crate::loan::amortization::{build_schedule, cap_degradation, installment_normalized, LoanParameters};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::PlannerResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetPositionRow {
    pub month: u32,
    pub loan_balance: Money,
    pub investment_balance: Money,
    /// Investment balance less the outstanding loan.
    pub net_position: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetPositionTimeline {
    pub opening_net_position: Money,
    pub final_net_position: Money,
    /// First month the investments cover the outstanding loan, if ever.
    pub first_non_negative_month: Option<u32>,
    pub rows: Vec<NetPositionRow>,
}

/// Month-by-month net position of a borrower who also invests, over the
/// investment horizon. The loan follows its full schedule (extra payments
/// included) and counts as zero once retired.
pub fn net_position_over_time(
    loan: &LoanParameters,
    income: &IncomeParameters,
) -> PlannerResult<ComputationOutput<NetPositionTimeline>> {
    let start = Instant::now();
    loan.validate()?;
    income.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    let emi = installment_normalized(loan, &mut warnings);
    let schedule = build_schedule(loan, emi);
    if schedule.iteration_cap_reached {
        warnings.push(cap_degradation("loan amortization").report());
    }
    let rate = income.monthly_rate(&mut warnings);
    let projection = run_projection(income, rate, &mut warnings);
    if projection.horizon_truncated {
        warnings.push(truncation_degradation().report());
    }

    let mut rows = Vec::with_capacity(projection.len());
    let mut first_non_negative_month = None;
    for entry in &projection.rows {
        // A capped schedule keeps its last known balance.
        let loan_balance = schedule.balance_after(entry.month);
        let net_position = entry.ending_balance - loan_balance;
        if first_non_negative_month.is_none() && net_position >= Decimal::ZERO {
            first_non_negative_month = Some(entry.month);
        }
        rows.push(NetPositionRow {
            month: entry.month,
            loan_balance,
            investment_balance: entry.ending_balance,
            net_position,
        });
    }

    if first_non_negative_month.is_none() {
        warnings.push("Net position stays negative over the whole horizon".into());
    }

    let output = NetPositionTimeline {
        opening_net_position: income.initial_lump_sum - loan.principal,
        final_net_position: rows.last().map(|r| r.net_position).unwrap_or(Decimal::ZERO),
        first_non_negative_month,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net position over time (investment balance less outstanding loan)",
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "annual_interest_rate_pct": loan.annual_interest_rate.to_string(),
            "tenure_months": loan.tenure_months,
            "extra_payment": loan.extra_payment.to_string(),
            "annual_growth_rate_pct": income.annual_growth_rate.to_string(),
            "time_horizon_months": income.time_horizon_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}
