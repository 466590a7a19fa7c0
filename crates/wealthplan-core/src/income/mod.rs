pub mod growth;

pub use growth::{
    analyze_income, project_growth, summarize_projection, GrowthVariant, IncomeAnalysis,
    IncomeParameters, IncomeProjection, IncomeScheduleRow, IncomeSummary, IncomeYear,
    MAX_PROJECTION_MONTHS,
};
