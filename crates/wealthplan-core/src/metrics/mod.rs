pub mod advanced;
pub mod break_even;
pub mod independence;

pub use advanced::{
    compute_advanced_metrics, effective_interest_rate, post_tax_return,
    real_return_after_inflation, AdvancedMetrics, AdvancedMetricsInput,
};
pub use break_even::break_even_month;
pub use independence::{
    required_monthly_investment, years_to_financial_independence, FinancialIndependence,
    MAX_FI_MONTHS,
};
