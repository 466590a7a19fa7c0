use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wealthplan_core::income::{self, GrowthVariant, IncomeParameters, MAX_PROJECTION_MONTHS};
use wealthplan_core::time_value::{compound, compounded_monthly_rate};
use wealthplan_core::ContributionFrequency;

fn monthly_sip(amount: Decimal, growth: Decimal, months: u32) -> IncomeParameters {
    IncomeParameters {
        initial_lump_sum: Decimal::ZERO,
        periodic_contribution: amount,
        contribution_frequency: ContributionFrequency::Monthly,
        annual_growth_rate: growth,
        time_horizon_months: months,
        variant: GrowthVariant::FutureValue,
    }
}

// ===========================================================================
// Future value
// ===========================================================================

#[test]
fn test_ten_year_sip_within_one_percent_of_closed_form() {
    let params = monthly_sip(dec!(25_000), dec!(11), 120);
    let rows = income::project_growth(&params).unwrap();
    let final_balance = rows.last().unwrap().ending_balance;

    let r = compounded_monthly_rate(dec!(11)).unwrap();
    let closed_form = dec!(25_000) * (compound(r, 120).unwrap() - Decimal::ONE) / r;
    assert!(
        (final_balance - closed_form).abs() <= closed_form * dec!(0.01),
        "final={final_balance} closed_form={closed_form}"
    );
}

#[test]
fn test_lump_sum_tracks_annual_rate_yearly() {
    // A lump sum with no contributions grows by exactly the annual rate each year.
    let params = IncomeParameters {
        initial_lump_sum: dec!(1_000_000),
        periodic_contribution: Decimal::ZERO,
        ..monthly_sip(Decimal::ZERO, dec!(10), 24)
    };
    let result = income::analyze_income(&params).unwrap();
    let years = &result.result.year_by_year;
    assert_eq!(years.len(), 2);
    assert!((years[0].ending_balance - dec!(1_100_000)).abs() < dec!(1));
    assert!((years[1].ending_balance - dec!(1_210_000)).abs() < dec!(1));
}

#[test]
fn test_annual_contribution_schedule() {
    let params = IncomeParameters {
        contribution_frequency: ContributionFrequency::Annually,
        ..monthly_sip(dec!(120_000), Decimal::ZERO, 36)
    };
    let projection = income::project_growth(&params).unwrap();
    let due: Vec<u32> = projection
        .rows
        .iter()
        .filter(|r| r.contribution > Decimal::ZERO)
        .map(|r| r.month)
        .collect();
    assert_eq!(due, vec![1, 13, 25]);
    assert_eq!(projection.last().unwrap().ending_balance, dec!(360_000));
}

// ===========================================================================
// Tax-adjusted
// ===========================================================================

#[test]
fn test_tax_and_inflation_reporting() {
    let params = IncomeParameters {
        initial_lump_sum: dec!(200_000),
        variant: GrowthVariant::TaxAdjusted {
            tax_bracket: Some(dec!(20)),
            inflation_rate: Some(dec!(5)),
        },
        ..monthly_sip(dec!(10_000), dec!(10), 60)
    };
    let result = income::analyze_income(&params).unwrap();
    let summary = &result.result.summary;

    assert!(summary.total_tax > Decimal::ZERO);
    // 20% of gross growth goes to tax, so net growth is 4x the tax.
    assert!((summary.total_growth - summary.total_tax * dec!(4)).abs() < dec!(0.0001));
    assert!(summary.final_real_balance < summary.final_balance);
    assert_eq!(summary.total_contributions, dec!(800_000));
}

#[test]
fn test_tax_adjusted_json_defaults() {
    let json = r#"{
        "initial_lump_sum": "0",
        "periodic_contribution": "5000",
        "annual_growth_rate": "8",
        "time_horizon_months": 12,
        "variant": { "kind": "tax-adjusted" }
    }"#;
    let params: IncomeParameters = serde_json::from_str(json).unwrap();
    assert_eq!(params.contribution_frequency, ContributionFrequency::Monthly);

    let rows = income::project_growth(&params).unwrap().rows;
    assert!(rows.iter().all(|r| r.tax_on_growth.is_zero()));
    assert!(rows.iter().all(|r| r.real_ending_balance == r.ending_balance));
}

#[test]
fn test_long_horizon_is_truncated_with_warning() {
    let params = monthly_sip(dec!(100), dec!(6), MAX_PROJECTION_MONTHS + 60);
    let result = income::analyze_income(&params).unwrap();
    assert_eq!(result.result.rows.len() as u32, MAX_PROJECTION_MONTHS);
    assert!(result.result.horizon_truncated);
    assert_eq!(result.warnings.len(), 1);

    let projection = income::project_growth(&params).unwrap();
    assert_eq!(projection.rows, result.result.rows);
    assert!(projection.horizon_truncated);
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_balance_is_contributions_plus_growth(
        lump in 0u32..5_000_000,
        amount in 0u32..200_000,
        growth_bp in 0u32..2000,
        months in 1u32..360,
        freq in 0u8..4,
    ) {
        let params = IncomeParameters {
            initial_lump_sum: Decimal::from(lump),
            periodic_contribution: Decimal::from(amount),
            contribution_frequency: match freq {
                0 => ContributionFrequency::Monthly,
                1 => ContributionFrequency::Quarterly,
                2 => ContributionFrequency::Annually,
                _ => ContributionFrequency::OneTime,
            },
            annual_growth_rate: Decimal::new(growth_bp as i64, 2),
            time_horizon_months: months,
            variant: GrowthVariant::FutureValue,
        };
        let rows = income::project_growth(&params).unwrap().rows;
        prop_assert_eq!(rows.len() as u32, months);

        let summary = income::summarize_projection(&rows);
        let reconstructed = summary.total_contributions + summary.total_growth;
        prop_assert!((summary.final_balance - reconstructed).abs() < dec!(0.0001));

        let mut previous = params.initial_lump_sum;
        for row in &rows {
            prop_assert!(row.ending_balance >= previous);
            previous = row.ending_balance;
        }
    }
}
