//! Chit Fund - rotating savings scheme simulator
//!
//! This library provides:
//! - Month-by-month withdrawal schedules with settlement and carry-over
//! - Lending of idle pool balances between periods
//! - Per-member cashflows and IRR (Newton-Raphson with bisection fallback)
//! - Batch and loan-utilization sweep runs
//! - CSV/JSON reporting

pub mod error;
pub mod scheme;
pub mod schedule;
pub mod returns;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use error::SchemeError;
pub use scheme::{SchemeParameters, CommissionType};
pub use schedule::{ScheduleEngine, ScheduleResult, ScheduleSummary, MonthRecord, LoanRecord};
pub use returns::{IrrSolver, MemberReturn, ReturnAnalyzer};
pub use scenario::ScenarioRunner;

/// Run the full pipeline for one scheme: schedule, then member returns
pub fn run_scheme(params: &SchemeParameters) -> ScheduleResult {
    let mut result = ScheduleEngine::new(params.clone()).run();
    result.member_returns = returns::analyze(&result);
    result
}
