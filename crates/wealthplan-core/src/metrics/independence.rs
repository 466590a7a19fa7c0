use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Degradation, PlannerError};
use crate::time_value::{compound, finite_or_zero, simple_monthly_rate};
use crate::types::{Money, Percent};
use crate::PlannerResult;

/// Longest horizon searched for financial independence (100 years).
pub const MAX_FI_MONTHS: u32 = 1200;

/// Corpus multiple implied by a 4% safe withdrawal rate.
const SAFE_WITHDRAWAL_MULTIPLE: Decimal = dec!(25);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialIndependence {
    /// `annual_expenses * 25`.
    pub target_corpus: Money,
    pub months: u32,
    pub years: Decimal,
    /// Zero when the corpus left the decimal range in the final month.
    pub corpus_at_end: Money,
    /// False when the search stopped at [`MAX_FI_MONTHS`] short of the target.
    pub reached: bool,
}

/// Years of saving needed before the corpus sustains `annual_expenses` under
/// the 4% rule.
///
/// Savings are spread evenly over the year and compound monthly at the
/// nominal real return. Fails when `annual_savings` is not positive since the
/// corpus could then never grow toward the target, and when 25x expenses
/// does not fit a decimal.
pub fn years_to_financial_independence(
    annual_expenses: Money,
    annual_savings: Money,
    real_return: Percent,
) -> PlannerResult<FinancialIndependence> {
    if annual_savings <= Decimal::ZERO {
        return Err(PlannerError::invalid(
            "annual_savings",
            "annual savings must be > 0 for the corpus to converge",
        ));
    }
    if annual_expenses < Decimal::ZERO {
        return Err(PlannerError::invalid(
            "annual_expenses",
            "annual expenses cannot be negative",
        ));
    }
    if real_return <= dec!(-100) {
        return Err(PlannerError::invalid("real_return", "real return must be above -100%"));
    }

    let target_corpus = annual_expenses
        .checked_mul(SAFE_WITHDRAWAL_MULTIPLE)
        .ok_or_else(|| {
            PlannerError::invalid(
                "annual_expenses",
                "target corpus (25x expenses) exceeds the decimal range",
            )
        })?;
    let monthly_saving = annual_savings / dec!(12);
    let growth = Decimal::ONE + simple_monthly_rate(real_return);
    let mut corpus = Decimal::ZERO;

    let finish = |months: u32, corpus: Money, reached: bool| FinancialIndependence {
        target_corpus,
        months,
        years: Decimal::from(months) / dec!(12),
        corpus_at_end: corpus,
        reached,
    };

    if corpus >= target_corpus {
        return Ok(finish(0, corpus, true));
    }

    for month in 1..=MAX_FI_MONTHS {
        // A corpus past the decimal range is past any representable target.
        corpus = match corpus.checked_mul(growth).and_then(|v| v.checked_add(monthly_saving)) {
            Some(v) => v,
            None => {
                let corpus = finite_or_zero(None, "financial independence corpus");
                return Ok(finish(month, corpus, true));
            }
        };
        if corpus >= target_corpus {
            return Ok(finish(month, corpus, true));
        }
    }

    Degradation::IterationCapReached {
        simulation: "financial independence search".into(),
        iterations: MAX_FI_MONTHS,
    }
    .report();
    Ok(finish(MAX_FI_MONTHS, corpus, false))
}

/// Level monthly investment that grows `initial` to `target` in `months`.
///
/// Solves the future-value-of-annuity equation for the payment at the nominal
/// monthly rate; at a zero rate it degrades to `(target - initial) / months`.
/// Returns 0 when the initial amount alone already reaches the target and
/// when the closed form leaves the decimal range. Negative amounts are
/// rejected.
pub fn required_monthly_investment(
    target: Money,
    initial: Money,
    annual_return: Percent,
    months: u32,
) -> PlannerResult<Money> {
    if months == 0 {
        return Err(PlannerError::invalid("months", "horizon must be at least 1 month"));
    }
    if target < Decimal::ZERO {
        return Err(PlannerError::invalid("target", "target cannot be negative"));
    }
    if initial < Decimal::ZERO {
        return Err(PlannerError::invalid("initial", "initial amount cannot be negative"));
    }
    if annual_return <= dec!(-100) {
        return Err(PlannerError::invalid(
            "annual_return",
            "annual return must be above -100%",
        ));
    }

    let rate = simple_monthly_rate(annual_return);
    if rate.is_zero() {
        let linear = target
            .checked_sub(initial)
            .and_then(|gap| gap.checked_div(Decimal::from(months)));
        return Ok(finite_or_zero(linear, "required monthly investment").max(Decimal::ZERO));
    }

    let payment = compound(rate, months).and_then(|factor| {
        let shortfall = target.checked_sub(initial.checked_mul(factor)?)?;
        let denom = factor.checked_sub(Decimal::ONE)?;
        if denom.is_zero() {
            return None;
        }
        shortfall.checked_mul(rate)?.checked_div(denom)
    });

    Ok(finite_or_zero(payment, "required monthly investment").max(Decimal::ZERO))
}
