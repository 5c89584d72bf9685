//! Core schedule engine for monthly withdrawal and loan simulation

use crate::scheme::SchemeParameters;
use super::state::SimulationState;
use super::records::{LoanRecord, MonthRecord, ScheduleResult};

/// Slack added before flooring the withdrawal count, so a pool that covers
/// exactly N payouts is not cut to N-1 by float error
const COUNT_TOLERANCE: f64 = 1e-9;

/// Round a monetary amount to the nearest whole unit for reporting
pub fn round_currency(value: f64) -> f64 {
    let rounded = value.round();
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Simulate a scheme with an explicit loan utilization
pub fn simulate(params: &SchemeParameters, loan_utilization_percent: f64) -> ScheduleResult {
    ScheduleEngine::new(params.clone()).simulate(loan_utilization_percent)
}

/// Loan of idle funds issued at the end of a period (unrounded)
#[derive(Debug, Clone, Copy)]
struct LoanIssue {
    pool_available: f64,
    amount: f64,
    interest_rate_percent: f64,
    interest: f64,
    repayment: f64,
}

/// Everything computed for one period, at full precision
#[derive(Debug, Clone)]
struct PeriodOutcome {
    month: u32,
    withdrawal_amount: f64,
    contribution_per_member: f64,
    net_contributions: f64,
    carry_over: f64,
    loan_repayment: f64,
    available_pool: f64,
    withdrawal_count: u32,
    total_withdrawn: f64,
    remaining_pool: f64,
    remaining_members_after: u32,
    is_settlement: bool,
    loan: Option<LoanIssue>,
}

impl PeriodOutcome {
    fn month_record(&self) -> MonthRecord {
        MonthRecord {
            month: self.month,
            withdrawal_amount: round_currency(self.withdrawal_amount),
            contribution_per_member: round_currency(self.contribution_per_member),
            gross_new_contributions: round_currency(self.net_contributions),
            carry_over_from_previous: round_currency(self.carry_over),
            loan_repayment_received: round_currency(self.loan_repayment),
            available_pool: round_currency(self.available_pool),
            actual_withdrawal_count: self.withdrawal_count,
            total_withdrawn: round_currency(self.total_withdrawn),
            remaining_pool: round_currency(self.remaining_pool),
            remaining_members_after: self.remaining_members_after,
            is_settlement_month: self.is_settlement,
        }
    }

    fn loan_record(&self) -> Option<LoanRecord> {
        self.loan.map(|loan| LoanRecord {
            month: self.month,
            pool_available_for_loan: round_currency(loan.pool_available),
            loan_amount: round_currency(loan.amount),
            interest_rate_percent: loan.interest_rate_percent,
            interest_earned: round_currency(loan.interest),
            repayment_due_next_period: round_currency(loan.repayment),
        })
    }
}

/// Main schedule engine
#[derive(Debug, Clone)]
pub struct ScheduleEngine {
    params: SchemeParameters,
}

impl ScheduleEngine {
    pub fn new(params: SchemeParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SchemeParameters {
        &self.params
    }

    /// Run the full schedule using the parameters' own loan utilization
    pub fn run(&self) -> ScheduleResult {
        self.simulate(self.params.loan_utilization_percent)
    }

    /// Run the full schedule, lending `loan_utilization_percent` of each
    /// period's idle pool
    ///
    /// A scheme with no members yields an all-zero result.
    pub fn simulate(&self, loan_utilization_percent: f64) -> ScheduleResult {
        let total_members = match u32::try_from(self.params.total_members) {
            Ok(n) if n > 0 => n,
            _ => {
                log::debug!(
                    "Scheme has {} members, returning empty schedule",
                    self.params.total_members
                );
                return ScheduleResult::empty();
            }
        };

        let mut result = ScheduleResult {
            total_pool: self.params.total_pool(),
            commission_per_month: self.params.commission_per_month(),
            net_pool_per_month: self.params.net_pool_per_month(),
            ..ScheduleResult::default()
        };

        let mut state = SimulationState::new(total_members);
        let mut total_loan_amount = 0.0;
        let mut total_interest = 0.0;

        while state.period_index < total_members && !state.is_complete() {
            let period = self.calculate_period(&mut state, loan_utilization_percent);

            if let Some(loan) = &period.loan {
                total_loan_amount += loan.amount;
                total_interest += loan.interest;
            }

            result.add_month(period.month_record());
            if let Some(loan) = period.loan_record() {
                result.add_loan(loan);
            }
        }

        result.duration = result.months.len() as u32;
        result.total_commission = self.params.total_commission(result.duration);
        result.total_members_served = result.months.iter().map(|m| m.actual_withdrawal_count).sum();
        result.final_carry_over = result.months.last().map(|m| m.remaining_pool).unwrap_or(0.0);
        result.total_loan_amount = round_currency(total_loan_amount);
        result.total_interest_earned = round_currency(total_interest);

        if state.is_complete() {
            log::info!(
                "Schedule complete: {} members served over {} months",
                result.total_members_served,
                result.duration
            );
        } else {
            log::warn!(
                "{} of {} members unserved after {} months",
                state.remaining_members,
                total_members,
                result.duration
            );
        }

        result
    }

    /// Calculate one period and advance the running state
    fn calculate_period(&self, state: &mut SimulationState, loan_utilization_percent: f64) -> PeriodOutcome {
        let month = state.month();
        let remaining_members = state.remaining_members;
        let withdrawal_amount = self.params.withdrawal_for_period(state.period_index);
        let effective_carry_over = state.effective_carry_over();

        // Baseline: every member pays the full contribution
        let mut contribution_per_member = self.params.monthly_contribution;
        let mut net_contributions = self.params.net_pool_per_month();
        let mut available_pool = net_contributions + effective_carry_over;

        // If the pool already covers everyone left, settle now and collect only what is needed
        let is_settlement = (remaining_members as f64 * withdrawal_amount) < available_pool;
        if is_settlement {
            let required_net = remaining_members as f64 * withdrawal_amount - effective_carry_over;
            if required_net <= 0.0 {
                contribution_per_member = 0.0;
                net_contributions = 0.0;
                available_pool = effective_carry_over;
            } else {
                let commission = self.params.commission_per_month();
                let members = self.params.total_members as f64;
                contribution_per_member = (required_net + commission) / members;
                net_contributions = contribution_per_member * members - commission;
                available_pool = net_contributions + effective_carry_over;
            }
            log::info!(
                "Month {}: settlement for {} remaining members at {:.2} each",
                month,
                remaining_members,
                withdrawal_amount
            );
        }

        let withdrawal_count = withdrawal_count(available_pool, withdrawal_amount, remaining_members);
        let total_withdrawn = withdrawal_amount * withdrawal_count as f64;
        let remaining_pool = available_pool - total_withdrawn;

        let loan = if !is_settlement && remaining_pool > 0.0 {
            Some(self.issue_loan(remaining_pool, loan_utilization_percent))
        } else {
            None
        };

        log::debug!(
            "Month {}: withdrawal {:.2} x {}, available {:.2}, remaining {:.2}, loan {:.2}",
            month,
            withdrawal_amount,
            withdrawal_count,
            available_pool,
            remaining_pool,
            loan.map_or(0.0, |l| l.amount)
        );

        let outcome = PeriodOutcome {
            month,
            withdrawal_amount,
            contribution_per_member,
            net_contributions,
            carry_over: state.carry_over_pool,
            loan_repayment: state.pending_loan_repayment,
            available_pool,
            withdrawal_count,
            total_withdrawn,
            remaining_pool,
            remaining_members_after: remaining_members - withdrawal_count,
            is_settlement,
            loan,
        };

        // Next period's state stays unrounded
        state.carry_over_pool = remaining_pool - loan.map_or(0.0, |l| l.amount);
        state.pending_loan_repayment = loan.map_or(0.0, |l| l.repayment);
        state.remaining_members -= withdrawal_count;
        state.period_index += 1;

        outcome
    }

    fn issue_loan(&self, remaining_pool: f64, loan_utilization_percent: f64) -> LoanIssue {
        let rate = self.params.loan_interest_rate_percent;
        let amount = remaining_pool * loan_utilization_percent / 100.0;
        let interest = amount * rate / 100.0;
        LoanIssue {
            pool_available: remaining_pool,
            amount,
            interest_rate_percent: rate,
            interest,
            repayment: amount + interest,
        }
    }
}

/// Number of members the pool can pay this period, capped at those remaining
fn withdrawal_count(available_pool: f64, withdrawal_amount: f64, remaining_members: u32) -> u32 {
    let affordable = (available_pool / withdrawal_amount + COUNT_TOLERANCE).floor();
    if affordable.is_nan() || affordable <= 0.0 {
        0
    } else if affordable >= remaining_members as f64 {
        remaining_members
    } else {
        affordable as u32
    }
}
