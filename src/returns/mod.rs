//! Per-member return analysis and IRR solving

pub mod irr;
mod analyzer;

pub use irr::{IrrSolver, calculate_irr, annualize_monthly_rate, net_present_value};
pub use analyzer::{ReturnAnalyzer, MemberReturn, analyze, member_cashflows};
