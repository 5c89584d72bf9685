//! Month-by-month withdrawal and loan schedule simulation

mod state;
mod engine;
mod records;

pub use state::SimulationState;
pub use engine::{ScheduleEngine, simulate, round_currency};
pub use records::{MonthRecord, LoanRecord, ScheduleResult, ScheduleSummary};
