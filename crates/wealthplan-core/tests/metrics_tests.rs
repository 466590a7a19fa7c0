use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wealthplan_core::income::{GrowthVariant, IncomeParameters};
use wealthplan_core::loan::{LoanParameters, MAX_SCHEDULE_ITERATIONS};
use wealthplan_core::metrics::{
    break_even_month, compute_advanced_metrics, required_monthly_investment,
    years_to_financial_independence, AdvancedMetricsInput,
};
use wealthplan_core::ContributionFrequency;

// ===========================================================================
// Break-even
// ===========================================================================

#[test]
fn test_break_even_zero_rate_crossing() {
    // Investment 20k + 5k*m against 120k - 10k*m
    let loan = LoanParameters::new(dec!(120_000), Decimal::ZERO, 12);
    let month = break_even_month(&loan, dec!(20_000), dec!(5_000), Decimal::ZERO).unwrap();
    assert_eq!(month, 7);
}

#[test]
fn test_break_even_initial_covers_principal() {
    let loan = LoanParameters::new(dec!(500_000), dec!(9), 120);
    assert_eq!(break_even_month(&loan, dec!(500_000), Decimal::ZERO, dec!(8)).unwrap(), 0);
    assert_eq!(break_even_month(&loan, dec!(900_000), dec!(1), dec!(8)).unwrap(), 0);
}

#[test]
fn test_break_even_search_stops_at_iteration_cap() {
    let loan = LoanParameters::new(dec!(2_000_000), dec!(7.5), 1100);
    let month = break_even_month(&loan, Decimal::ZERO, Decimal::ZERO, dec!(10)).unwrap();
    assert_eq!(month, MAX_SCHEDULE_ITERATIONS);
    assert_eq!(month, 1000);
}

#[test]
fn test_break_even_negative_investment_rejected() {
    let loan = LoanParameters::new(dec!(500_000), dec!(9), 120);
    assert!(break_even_month(&loan, dec!(-1), Decimal::ZERO, dec!(8)).is_err());
    assert!(break_even_month(&loan, Decimal::ZERO, dec!(-1), dec!(8)).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_no_investment_never_breaks_even_early(
        principal in 10_000u32..10_000_000,
        rate_bp in 0u32..2400,
        tenure in 1u32..480,
    ) {
        let loan = LoanParameters::new(
            Decimal::from(principal),
            Decimal::new(rate_bp as i64, 2),
            tenure,
        );
        let month = break_even_month(&loan, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO).unwrap();
        prop_assert_eq!(month, tenure);
    }

    #[test]
    fn prop_break_even_within_tenure(
        principal in 10_000u32..10_000_000,
        rate_bp in 0u32..2400,
        tenure in 1u32..480,
        monthly in 0u32..500_000,
        growth_bp in 0u32..2000,
    ) {
        let loan = LoanParameters::new(
            Decimal::from(principal),
            Decimal::new(rate_bp as i64, 2),
            tenure,
        );
        let month = break_even_month(
            &loan,
            Decimal::ZERO,
            Decimal::from(monthly),
            Decimal::new(growth_bp as i64, 2),
        )
        .unwrap();
        prop_assert!(month >= 1 && month <= tenure);
    }
}

// ===========================================================================
// Advanced metrics bundle
// ===========================================================================

fn bundle_input() -> AdvancedMetricsInput {
    AdvancedMetricsInput {
        loan: LoanParameters::new(dec!(1_000_000), dec!(8.5), 240),
        income: IncomeParameters {
            initial_lump_sum: Decimal::ZERO,
            periodic_contribution: dec!(10_000),
            contribution_frequency: ContributionFrequency::Monthly,
            annual_growth_rate: dec!(12),
            time_horizon_months: 240,
            variant: GrowthVariant::FutureValue,
        },
        inflation_rate: None,
        tax_bracket: None,
    }
}

#[test]
fn test_home_loan_cost_metrics() {
    let result = compute_advanced_metrics(&bundle_input()).unwrap();
    let m = &result.result;

    // ~1,082,800 interest on 1M over 20 years: ~108% of principal, ~5.4% a year
    assert!((m.interest_to_principal_pct - dec!(108.28)).abs() < dec!(0.05));
    assert!((m.effective_interest_rate - dec!(5.414)).abs() < dec!(0.01));
    assert!((m.total_cost_multiple - dec!(2.0828)).abs() < dec!(0.001));
}

#[test]
fn test_defaults_for_missing_rates() {
    let result = compute_advanced_metrics(&bundle_input()).unwrap();
    let m = &result.result;
    assert_eq!(m.real_return_after_inflation, dec!(12));
    assert_eq!(m.post_tax_return, dec!(12));
}

#[test]
fn test_investment_metrics_consistent() {
    let result = compute_advanced_metrics(&bundle_input()).unwrap();
    let m = &result.result;
    // multiple = final / contributions = 1 + return%/100
    let implied = Decimal::ONE + m.investment_return_pct / dec!(100);
    assert!((m.investment_multiple - implied).abs() < dec!(0.000001));
    assert!((m.wealth_accumulation_rate - m.investment_return_pct / dec!(20)).abs() < dec!(0.000001));
    assert!(m.break_even_month > 0 && m.break_even_month < 240);
}

#[test]
fn test_metrics_input_from_json() {
    let json = r#"{
        "loan": { "principal": "750000", "annual_interest_rate": "10", "tenure_months": 120 },
        "income": {
            "initial_lump_sum": "50000",
            "periodic_contribution": "30000",
            "contribution_frequency": "quarterly",
            "annual_growth_rate": "9",
            "time_horizon_months": 120
        },
        "inflation_rate": "4",
        "tax_bracket": "10"
    }"#;
    let input: AdvancedMetricsInput = serde_json::from_str(json).unwrap();
    let result = compute_advanced_metrics(&input).unwrap();
    assert_eq!(result.result.real_return_after_inflation, dec!(5));
    assert_eq!(result.result.post_tax_return, dec!(8.1));
}

// ===========================================================================
// Financial independence
// ===========================================================================

#[test]
fn test_fi_years_and_required_investment() {
    let fi = years_to_financial_independence(dec!(480_000), dec!(600_000), dec!(7)).unwrap();
    assert_eq!(fi.target_corpus, dec!(12_000_000));
    assert!(fi.reached);
    assert!(fi.years > dec!(10) && fi.years < dec!(15), "years={}", fi.years);

    let pmt = required_monthly_investment(fi.target_corpus, Decimal::ZERO, dec!(7), fi.months).unwrap();
    // The search saves 50k a month and stops on the first month at or past
    // the target, so the exact payment is at most that.
    assert!(pmt <= dec!(50_000));
    assert!(pmt > dec!(45_000));
}

#[test]
fn test_out_of_range_inputs_do_not_panic() {
    assert!(years_to_financial_independence(Decimal::MAX / dec!(10), dec!(1), dec!(5)).is_err());
    assert!(required_monthly_investment(Decimal::MAX, Decimal::MIN, Decimal::ZERO, 12).is_err());
    assert_eq!(
        wealthplan_core::metrics::effective_interest_rate(Decimal::MAX, Decimal::ONE, 12),
        Decimal::ZERO
    );
}
