//! CSV and JSON output for schedules, loans and member returns

use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::schedule::{MonthRecord, ScheduleResult, ScheduleSummary};

/// Schedule row with an optional calendar due date
#[derive(Debug, Serialize)]
struct ScheduleCsvRow {
    month: u32,
    due_date: Option<NaiveDate>,
    withdrawal_amount: f64,
    contribution_per_member: f64,
    gross_new_contributions: f64,
    carry_over_from_previous: f64,
    loan_repayment_received: f64,
    available_pool: f64,
    actual_withdrawal_count: u32,
    total_withdrawn: f64,
    remaining_pool: f64,
    remaining_members_after: u32,
    is_settlement_month: bool,
}

impl ScheduleCsvRow {
    fn new(record: &MonthRecord, start_date: Option<NaiveDate>) -> Self {
        Self {
            month: record.month,
            due_date: start_date.and_then(|d| due_date(d, record.month)),
            withdrawal_amount: record.withdrawal_amount,
            contribution_per_member: record.contribution_per_member,
            gross_new_contributions: record.gross_new_contributions,
            carry_over_from_previous: record.carry_over_from_previous,
            loan_repayment_received: record.loan_repayment_received,
            available_pool: record.available_pool,
            actual_withdrawal_count: record.actual_withdrawal_count,
            total_withdrawn: record.total_withdrawn,
            remaining_pool: record.remaining_pool,
            remaining_members_after: record.remaining_members_after,
            is_settlement_month: record.is_settlement_month,
        }
    }
}

/// Calendar date of a 1-based period, counting whole months from `start_date`
pub fn due_date(start_date: NaiveDate, month: u32) -> Option<NaiveDate> {
    start_date.checked_add_months(Months::new(month.saturating_sub(1)))
}

/// Write one row per simulated month
pub fn write_schedule_csv<W: Write>(writer: W, result: &ScheduleResult, start_date: Option<NaiveDate>) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in &result.months {
        csv_writer.serialize(ScheduleCsvRow::new(record, start_date))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one row per issued loan
pub fn write_loans_csv<W: Write>(writer: W, result: &ScheduleResult) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for loan in &result.loans {
        csv_writer.serialize(loan)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one row per withdrawing member
pub fn write_member_returns_csv<W: Write>(writer: W, result: &ScheduleResult) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for member in &result.member_returns {
        csv_writer.serialize(member)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one summary row per scheme
pub fn write_summaries_csv<W: Write>(writer: W, summaries: &[ScheduleSummary]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(summary)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON of the full result
pub fn to_json(result: &ScheduleResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
