//! Canonical time-value formulas shared by every engine in the crate.
//!
//! Two monthly-rate conventions coexist on purpose. `simple_monthly_rate`
//! (annual / 12) is the nominal convention lenders quote and is used wherever
//! a month-by-month schedule is built. `compounded_monthly_rate` is the
//! geometric twelfth root of the annual factor, so twelve monthly steps
//! reproduce the stated annual return exactly; it answers "what does this
//! grow to" questions.
//!
//! Closed-form helpers return `Option`: `None` means the computation left the
//! decimal range (the analogue of NaN/Infinity). Callers normalize it to zero
//! through [`normalize`].

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::Degradation;
use crate::types::{Money, Percent, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Nominal monthly rate: `annual / 12 / 100`.
pub fn simple_monthly_rate(annual_pct: Percent) -> Rate {
    annual_pct / MONTHS_PER_YEAR / PERCENT
}

/// Geometric monthly rate: `(1 + annual/100)^(1/12) - 1`.
pub fn compounded_monthly_rate(annual_pct: Percent) -> Option<Rate> {
    if annual_pct.is_zero() {
        return Some(Decimal::ZERO);
    }
    let base = Decimal::ONE.checked_add(annual_pct.checked_div(PERCENT)?)?;
    if base <= Decimal::ZERO {
        return None;
    }
    let monthly_factor = base.checked_powd(Decimal::ONE / MONTHS_PER_YEAR)?;
    monthly_factor.checked_sub(Decimal::ONE)
}

/// Compute (1 + r)^n via iterative checked multiplication.
pub fn compound(rate: Rate, n: u32) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_add(rate)?;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(factor)?;
    }
    Some(result)
}

/// Level installment: `P * r * (1+r)^n / ((1+r)^n - 1)`, or `P / n` at a zero rate.
pub fn installment(principal: Money, rate: Rate, n: u32) -> Option<Money> {
    if n == 0 {
        return None;
    }
    if rate.is_zero() {
        return principal.checked_div(Decimal::from(n));
    }
    let factor = compound(rate, n)?;
    let denom = factor.checked_sub(Decimal::ONE)?;
    if denom.is_zero() {
        return None;
    }
    principal
        .checked_mul(rate)?
        .checked_mul(factor)?
        .checked_div(denom)
}

/// Future value of `n` end-of-period payments: `pmt * ((1+r)^n - 1) / r`.
pub fn future_value_of_annuity(payment: Money, rate: Rate, n: u32) -> Option<Money> {
    if rate.is_zero() {
        return payment.checked_mul(Decimal::from(n));
    }
    let factor = compound(rate, n)?;
    payment
        .checked_mul(factor.checked_sub(Decimal::ONE)?)?
        .checked_div(rate)
}

/// Outstanding balance after `k` level installments, clamped at zero:
/// `P(1+r)^k - I((1+r)^k - 1)/r`, or `P - I*k` at a zero rate.
pub fn remaining_balance(principal: Money, installment: Money, rate: Rate, k: u32) -> Option<Money> {
    let balance = if rate.is_zero() {
        principal.checked_sub(installment.checked_mul(Decimal::from(k))?)?
    } else {
        let factor = compound(rate, k)?;
        let grown = principal.checked_mul(factor)?;
        let paid = installment
            .checked_mul(factor.checked_sub(Decimal::ONE)?)?
            .checked_div(rate)?;
        grown.checked_sub(paid)?
    };
    Some(balance.max(Decimal::ZERO))
}

/// Division that yields zero instead of failing on a zero denominator.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Scalar counterpart of [`normalize`] for helpers that carry no warnings
/// list. The degradation is still emitted as a `tracing` event.
pub fn finite_or_zero(value: Option<Decimal>, context: &str) -> Decimal {
    value.unwrap_or_else(|| {
        Degradation::NonFiniteNormalized {
            context: context.to_string(),
        }
        .report();
        Decimal::ZERO
    })
}

/// Resolve a closed-form result, replacing an out-of-range value with zero and
/// recording the degradation.
pub fn normalize(value: Option<Decimal>, context: &str, warnings: &mut Vec<String>) -> Decimal {
    match value {
        Some(v) => v,
        None => {
            let degradation = Degradation::NonFiniteNormalized {
                context: context.to_string(),
            };
            warnings.push(degradation.report());
            Decimal::ZERO
        }
    }
}
