use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wealthplan_core::comparison::{
    compare_prepayment_vs_investment, net_position_over_time, PrepaymentComparisonInput,
    Recommendation,
};
use wealthplan_core::income::{GrowthVariant, IncomeParameters};
use wealthplan_core::loan::{self, LoanParameters};
use wealthplan_core::{ContributionFrequency, ExtraPaymentFrequency};

fn prepay_input(loan_rate: Decimal, investment_rate: Decimal) -> PrepaymentComparisonInput {
    PrepaymentComparisonInput {
        principal: dec!(1_000_000),
        annual_interest_rate: loan_rate,
        tenure_months: 240,
        periodic_amount: dec!(5_000),
        frequency: ExtraPaymentFrequency::Monthly,
        start_month: 1,
        investment_return_rate: investment_rate,
        investment_tax_rate: None,
    }
}

// ===========================================================================
// Prepay vs invest
// ===========================================================================

#[test]
fn test_equal_rates_neither_strategy_dominates() {
    let result = compare_prepayment_vs_investment(&prepay_input(dec!(8.5), dec!(8.5))).unwrap();
    let r = &result.result;
    assert!(r.interest_saved > Decimal::ZERO);
    assert!(r.difference < dec!(0.01), "difference={}", r.difference);
}

#[test]
fn test_recommendation_follows_rate_spread() {
    let invest = compare_prepayment_vs_investment(&prepay_input(dec!(8.5), dec!(13))).unwrap();
    assert_eq!(invest.result.recommendation, Recommendation::InvestMoney);

    let prepay = compare_prepayment_vs_investment(&prepay_input(dec!(8.5), dec!(5))).unwrap();
    assert_eq!(prepay.result.recommendation, Recommendation::PrepayLoan);
}

#[test]
fn test_comparison_agrees_with_loan_engine() {
    let input = PrepaymentComparisonInput {
        frequency: ExtraPaymentFrequency::Annually,
        periodic_amount: dec!(100_000),
        start_month: 12,
        ..prepay_input(dec!(9), dec!(10))
    };
    let comparison = compare_prepayment_vs_investment(&input).unwrap().result;

    let params = LoanParameters::new(dec!(1_000_000), dec!(9), 240).with_extra_payment(
        dec!(100_000),
        ExtraPaymentFrequency::Annually,
        12,
    );
    let summary = loan::summarize_schedule(&loan::generate_schedule(&params).unwrap());
    assert_eq!(comparison.months_to_repay_with_prepayment, summary.actual_tenure_months);
    assert_eq!(comparison.total_interest_with_prepayment, summary.total_interest);
    assert_eq!(
        comparison.months_saved,
        240 - summary.actual_tenure_months
    );
}

#[test]
fn test_comparison_input_from_json() {
    let json = r#"{
        "principal": "2000000",
        "annual_interest_rate": "9",
        "tenure_months": 180,
        "periodic_amount": "50000",
        "frequency": "quarterly",
        "investment_return_rate": "11",
        "investment_tax_rate": "10"
    }"#;
    let input: PrepaymentComparisonInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.start_month, 1);

    let result = compare_prepayment_vs_investment(&input).unwrap().result;
    assert!(result.investment_tax > Decimal::ZERO);
    assert_eq!(
        result.net_gain_from_investment,
        result.investment_value - result.total_invested - result.investment_tax
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_equal_rates_converge(
        principal in 100_000u32..20_000_000,
        rate_bp in 100u32..2000,
        tenure in 12u32..360,
        amount in 1_000u32..200_000,
        freq in 0u8..4,
        start in 1u32..24,
    ) {
        let rate = Decimal::new(rate_bp as i64, 2);
        let input = PrepaymentComparisonInput {
            principal: Decimal::from(principal),
            annual_interest_rate: rate,
            tenure_months: tenure,
            periodic_amount: Decimal::from(amount),
            frequency: match freq {
                0 => ExtraPaymentFrequency::Monthly,
                1 => ExtraPaymentFrequency::Quarterly,
                2 => ExtraPaymentFrequency::Semiannually,
                _ => ExtraPaymentFrequency::Annually,
            },
            start_month: start,
            investment_return_rate: rate,
            investment_tax_rate: None,
        };
        let result = compare_prepayment_vs_investment(&input).unwrap().result;
        prop_assert!(result.difference < dec!(0.01), "difference={}", result.difference);
    }
}

// ===========================================================================
// Net position
// ===========================================================================

#[test]
fn test_net_position_turns_positive() {
    let loan = LoanParameters::new(dec!(1_000_000), dec!(8.5), 240);
    let income = IncomeParameters {
        initial_lump_sum: dec!(100_000),
        periodic_contribution: dec!(15_000),
        contribution_frequency: ContributionFrequency::Monthly,
        annual_growth_rate: dec!(12),
        time_horizon_months: 240,
        variant: GrowthVariant::FutureValue,
    };
    let result = net_position_over_time(&loan, &income).unwrap();
    let timeline = &result.result;

    assert_eq!(timeline.rows.len(), 240);
    assert_eq!(timeline.opening_net_position, dec!(-900_000));
    let month = timeline.first_non_negative_month.unwrap();
    assert!(timeline.rows[month as usize - 1].net_position >= Decimal::ZERO);
    if month > 1 {
        assert!(timeline.rows[month as usize - 2].net_position < Decimal::ZERO);
    }
    assert_eq!(timeline.rows[239].loan_balance, Decimal::ZERO);
    assert_eq!(timeline.final_net_position, timeline.rows[239].investment_balance);
    assert!(result.warnings.is_empty());
}
