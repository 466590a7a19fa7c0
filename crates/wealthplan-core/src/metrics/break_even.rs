use rust_decimal::Decimal;

use crate::error::PlannerError;
use crate::loan::amortization::{cap_degradation, installment_normalized, LoanParameters, MAX_SCHEDULE_ITERATIONS};
use crate::time_value::{remaining_balance, simple_monthly_rate};
use crate::types::{Money, Percent};
use crate::PlannerResult;

/// First month in which a side investment is worth at least the loan's
/// outstanding balance.
///
/// The investment is seeded with `initial_investment`; each month
/// `monthly_investment` is added and the total grows at the nominal monthly
/// rate. The loan balance comes from the closed-form remaining-balance formula
/// on the plain installment, so extra payments in `loan` are not considered.
///
/// Returns 0 when the initial investment already covers the principal and the
/// tenure when the two paths never cross. Tenures beyond
/// [`MAX_SCHEDULE_ITERATIONS`] stop at the cap.
pub fn break_even_month(
    loan: &LoanParameters,
    initial_investment: Money,
    monthly_investment: Money,
    investment_annual_rate: Percent,
) -> PlannerResult<u32> {
    loan.validate()?;
    if initial_investment < Decimal::ZERO {
        return Err(PlannerError::invalid(
            "initial_investment",
            "initial investment cannot be negative",
        ));
    }
    if monthly_investment < Decimal::ZERO {
        return Err(PlannerError::invalid(
            "monthly_investment",
            "monthly investment cannot be negative",
        ));
    }

    if initial_investment >= loan.principal {
        return Ok(0);
    }

    let mut warnings = Vec::new();
    let emi = installment_normalized(loan, &mut warnings);
    let loan_rate = simple_monthly_rate(loan.annual_interest_rate);
    let growth = Decimal::ONE + simple_monthly_rate(investment_annual_rate);
    let mut investment = initial_investment;

    for month in 1..=loan.tenure_months {
        if month > MAX_SCHEDULE_ITERATIONS {
            cap_degradation("break-even search").report();
            return Ok(MAX_SCHEDULE_ITERATIONS);
        }

        // An investment that overflows the decimal range has certainly passed the loan.
        investment = match investment
            .checked_add(monthly_investment)
            .and_then(|v| v.checked_mul(growth))
        {
            Some(v) => v,
            None => return Ok(month),
        };
        let outstanding =
            remaining_balance(loan.principal, emi, loan_rate, month).unwrap_or(Decimal::ZERO);

        if investment >= outstanding {
            tracing::debug!(month, %investment, %outstanding, "break-even reached");
            return Ok(month);
        }
    }

    Ok(loan.tenure_months)
}
