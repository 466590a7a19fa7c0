pub mod net_position;
pub mod prepayment;

pub use net_position::{net_position_over_time, NetPositionRow, NetPositionTimeline};
pub use prepayment::{
    compare_prepayment_vs_investment, ComparisonResult, PrepaymentComparisonInput, Recommendation,
};
