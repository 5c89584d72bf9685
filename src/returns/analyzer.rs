//! Per-member cashflows and return metrics derived from a schedule

use serde::{Deserialize, Serialize};
use crate::schedule::{MonthRecord, ScheduleResult};
use super::irr::{annualize_monthly_rate, IrrSolver};

/// Return metrics for one withdrawing member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberReturn {
    /// Sequential id in withdrawal order, starting at 1
    pub member_id: u32,
    pub withdrawal_month: u32,

    /// Sum of every period's contribution over the whole scheme
    pub total_contribution: f64,
    pub withdrawal_amount: f64,
    pub net_return: f64,

    /// Net return as a percent of total contribution
    pub return_percentage: f64,

    /// Monthly IRR in percent, None if the solver did not converge
    pub monthly_irr: Option<f64>,

    /// Compounded annual IRR in percent
    pub annualized_irr: Option<f64>,
}

/// Builds member cashflows from a schedule and solves each for its IRR
#[derive(Debug, Clone, Default)]
pub struct ReturnAnalyzer {
    solver: IrrSolver,
}

impl ReturnAnalyzer {
    pub fn new(solver: IrrSolver) -> Self {
        Self { solver }
    }

    /// Return metrics for every member paid out in `schedule`, in payout order
    pub fn analyze(&self, schedule: &ScheduleResult) -> Vec<MemberReturn> {
        // Every member owes every period's contribution, whenever they withdraw
        let total_contribution: f64 = schedule
            .months
            .iter()
            .map(|m| m.contribution_per_member)
            .sum();

        let mut returns = Vec::with_capacity(schedule.total_members_served as usize);
        let mut next_member_id = 1;

        for month in &schedule.months {
            if month.actual_withdrawal_count == 0 {
                continue;
            }

            // Members paid in the same month have identical cashflows
            let cashflows = member_cashflows(&schedule.months, month.month);
            let monthly_rate = self.solver.solve(&cashflows);
            if monthly_rate.is_none() {
                log::warn!(
                    "IRR did not converge for members withdrawing in month {}",
                    month.month
                );
            }

            let net_return = month.withdrawal_amount - total_contribution;
            let return_percentage = if total_contribution != 0.0 {
                net_return / total_contribution * 100.0
            } else {
                0.0
            };

            for _ in 0..month.actual_withdrawal_count {
                returns.push(MemberReturn {
                    member_id: next_member_id,
                    withdrawal_month: month.month,
                    total_contribution,
                    withdrawal_amount: month.withdrawal_amount,
                    net_return,
                    return_percentage,
                    monthly_irr: monthly_rate.map(|r| r * 100.0),
                    annualized_irr: monthly_rate.map(|r| annualize_monthly_rate(r) * 100.0),
                });
                next_member_id += 1;
            }
        }

        returns
    }
}

/// Analyze with the default IRR solver
pub fn analyze(schedule: &ScheduleResult) -> Vec<MemberReturn> {
    ReturnAnalyzer::default().analyze(schedule)
}

/// Cashflows for a member who withdraws in `withdrawal_month`, one per period
///
/// The member pays every period's contribution and receives the payout in
/// their own month.
pub fn member_cashflows(months: &[MonthRecord], withdrawal_month: u32) -> Vec<f64> {
    months
        .iter()
        .map(|m| {
            if m.month == withdrawal_month {
                m.withdrawal_amount - m.contribution_per_member
            } else {
                -m.contribution_per_member
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::irr::net_present_value;
    use crate::scheme::{CommissionType, SchemeParameters};
    use crate::schedule::ScheduleEngine;
    use approx::assert_abs_diff_eq;

    fn month(month: u32, withdrawal: f64, contribution: f64, count: u32) -> MonthRecord {
        MonthRecord {
            month,
            withdrawal_amount: withdrawal,
            contribution_per_member: contribution,
            gross_new_contributions: 0.0,
            carry_over_from_previous: 0.0,
            loan_repayment_received: 0.0,
            available_pool: 0.0,
            actual_withdrawal_count: count,
            total_withdrawn: withdrawal * count as f64,
            remaining_pool: 0.0,
            remaining_members_after: 0,
            is_settlement_month: false,
        }
    }

    fn schedule_of(months: Vec<MonthRecord>) -> ScheduleResult {
        ScheduleResult {
            duration: months.len() as u32,
            total_members_served: months.iter().map(|m| m.actual_withdrawal_count).sum(),
            months,
            ..ScheduleResult::default()
        }
    }

    #[test]
    fn test_member_cashflows() {
        let months = vec![month(1, 300.0, 100.0, 1), month(2, 320.0, 100.0, 1), month(3, 340.0, 80.0, 1)];
        assert_eq!(member_cashflows(&months, 1), vec![200.0, -100.0, -80.0]);
        assert_eq!(member_cashflows(&months, 3), vec![-100.0, -100.0, 260.0]);
    }

    #[test]
    fn test_break_even_members() {
        let schedule = schedule_of(vec![month(1, 150.0, 100.0, 3), month(2, 150.0, 50.0, 2)]);
        let returns = analyze(&schedule);

        assert_eq!(returns.len(), 5);
        let ids: Vec<u32> = returns.iter().map(|r| r.member_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(returns[2].withdrawal_month, 1);
        assert_eq!(returns[3].withdrawal_month, 2);

        for member in &returns {
            assert_eq!(member.total_contribution, 150.0);
            assert_eq!(member.net_return, 0.0);
            assert_eq!(member.return_percentage, 0.0);
            assert_abs_diff_eq!(member.monthly_irr.unwrap(), 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(member.annualized_irr.unwrap(), 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_non_convergence_leaves_irr_absent() {
        let schedule = schedule_of(vec![month(1, 0.0, 100.0, 1), month(2, 400.0, 100.0, 1)]);
        let returns = analyze(&schedule);

        // First member only ever pays in; second still gets a rate
        assert!(returns[0].monthly_irr.is_none());
        assert!(returns[0].annualized_irr.is_none());
        assert_eq!(returns[0].net_return, -200.0);
        assert_eq!(returns[0].return_percentage, -100.0);
        assert!(returns[1].monthly_irr.is_some());
    }

    #[test]
    fn test_empty_schedule() {
        assert!(analyze(&ScheduleResult::empty()).is_empty());
    }

    #[test]
    fn test_reference_scheme_returns() {
        let schedule = ScheduleEngine::new(SchemeParameters::default()).run();
        let returns = analyze(&schedule);

        assert_eq!(returns.len() as u32, schedule.total_members_served);
        assert_eq!(returns.first().unwrap().member_id, 1);
        assert_eq!(returns.last().unwrap().member_id, 20);

        let total: f64 = schedule.months.iter().map(|m| m.contribution_per_member).sum();
        let first = &returns[0];
        assert_eq!(first.withdrawal_month, 1);
        assert_eq!(first.total_contribution, total);
        assert_eq!(first.net_return, 80_000.0 - total);

        // Early withdrawal borrows from the pool, so the member pays a positive rate
        let monthly = first.monthly_irr.unwrap() / 100.0;
        assert!(monthly > 0.0);
        let cashflows = member_cashflows(&schedule.months, 1);
        assert_abs_diff_eq!(net_present_value(&cashflows, monthly), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            first.annualized_irr.unwrap(),
            ((1.0 + monthly).powi(12) - 1.0) * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_custom_solver_iterations() {
        let params = SchemeParameters {
            commission_type: CommissionType::FixedTotal,
            fixed_commission_total: 20_000.0,
            ..Default::default()
        };
        let schedule = ScheduleEngine::new(params).run();

        let default_returns = analyze(&schedule);
        let strict = ReturnAnalyzer::new(IrrSolver::new(500, 1e-9)).analyze(&schedule);
        assert_eq!(default_returns.len(), strict.len());
        for (a, b) in default_returns.iter().zip(&strict) {
            if let (Some(x), Some(y)) = (a.monthly_irr, b.monthly_irr) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-4);
            }
        }
    }
}
