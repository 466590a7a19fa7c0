pub mod amortization;

pub use amortization::{
    analyze_loan, compute_installment, generate_schedule, summarize_schedule, AmortizationRow,
    AmortizationSchedule, ExtraPaymentImpact, LoanAnalysis, LoanParameters, LoanSummary,
    MAX_SCHEDULE_ITERATIONS,
};
