//! Output structures for a simulated schedule

use serde::{Deserialize, Serialize};
use crate::returns::MemberReturn;

/// One simulated period
///
/// Monetary fields are rounded to whole currency units for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// 1-based period number
    pub month: u32,
    pub withdrawal_amount: f64,
    pub contribution_per_member: f64,

    /// New contributions net of this period's commission
    pub gross_new_contributions: f64,

    /// Pool carried over from the previous period, excluding the loan repayment
    pub carry_over_from_previous: f64,
    pub loan_repayment_received: f64,
    pub available_pool: f64,
    pub actual_withdrawal_count: u32,
    pub total_withdrawn: f64,
    pub remaining_pool: f64,
    pub remaining_members_after: u32,
    pub is_settlement_month: bool,
}

/// Idle pool funds lent out at the end of a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub month: u32,
    pub pool_available_for_loan: f64,
    pub loan_amount: f64,
    pub interest_rate_percent: f64,
    pub interest_earned: f64,
    pub repayment_due_next_period: f64,
}

/// Complete result of one scheme run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Number of simulated periods
    pub duration: u32,
    pub total_pool: f64,
    pub commission_per_month: f64,
    pub total_commission: f64,
    pub net_pool_per_month: f64,
    pub months: Vec<MonthRecord>,
    pub total_members_served: u32,
    pub final_carry_over: f64,
    pub loans: Vec<LoanRecord>,
    pub total_loan_amount: f64,
    pub total_interest_earned: f64,
    pub member_returns: Vec<MemberReturn>,
}

impl ScheduleResult {
    /// All-zero result for a scheme with no members
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_month(&mut self, record: MonthRecord) {
        self.months.push(record);
    }

    pub fn add_loan(&mut self, record: LoanRecord) {
        self.loans.push(record);
    }

    /// The period in which the remaining members were cleared, if any
    pub fn settlement_month(&self) -> Option<&MonthRecord> {
        self.months.iter().find(|m| m.is_settlement_month)
    }

    /// Loan issued at the end of `month`, if any
    pub fn loan_for_month(&self, month: u32) -> Option<&LoanRecord> {
        self.loans.iter().find(|l| l.month == month)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let irrs: Vec<f64> = self
            .member_returns
            .iter()
            .filter_map(|m| m.annualized_irr)
            .collect();

        let (mean_annualized_irr, min_annualized_irr, max_annualized_irr) = if irrs.is_empty() {
            (None, None, None)
        } else {
            let mean = irrs.iter().sum::<f64>() / irrs.len() as f64;
            let min = irrs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = irrs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (Some(mean), Some(min), Some(max))
        };

        let planned_members = self
            .months
            .first()
            .map(|m| m.remaining_members_after + m.actual_withdrawal_count)
            .unwrap_or(0);

        ScheduleSummary {
            duration: self.duration,
            total_pool: self.total_pool,
            total_commission: self.total_commission,
            total_members_served: self.total_members_served,
            members_unserved: planned_members.saturating_sub(self.total_members_served),
            final_carry_over: self.final_carry_over,
            total_loan_amount: self.total_loan_amount,
            total_interest_earned: self.total_interest_earned,
            settlement_months: self.months.iter().filter(|m| m.is_settlement_month).count() as u32,
            mean_annualized_irr,
            min_annualized_irr,
            max_annualized_irr,
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub duration: u32,
    pub total_pool: f64,
    pub total_commission: f64,
    pub total_members_served: u32,
    pub members_unserved: u32,
    pub final_carry_over: f64,
    pub total_loan_amount: f64,
    pub total_interest_earned: f64,
    pub settlement_months: u32,
    /// Annualized IRR statistics in percent, over members whose IRR converged
    pub mean_annualized_irr: Option<f64>,
    pub min_annualized_irr: Option<f64>,
    pub max_annualized_irr: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = ScheduleResult::empty().summary();
        assert_eq!(summary.duration, 0);
        assert_eq!(summary.total_members_served, 0);
        assert_eq!(summary.members_unserved, 0);
        assert_eq!(summary.settlement_months, 0);
        assert!(summary.mean_annualized_irr.is_none());
    }
}
