//! Scheme parameter structures

use serde::{Deserialize, Serialize};

/// How the organiser's commission is charged against the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionType {
    /// A percentage of the gross pool, deducted every period
    PerPeriodRate,
    /// A single total amount, amortized evenly across the term
    FixedTotal,
}

/// Immutable inputs for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeParameters {
    /// Number of participants (and planned number of periods)
    pub total_members: i64,

    /// Contribution each member pays into the pool per period
    pub monthly_contribution: f64,

    /// Lump sum paid to a withdrawing member in the first period
    pub first_withdrawal: f64,

    /// Amount the withdrawal grows by each period
    pub monthly_increment: f64,

    /// Commission model
    pub commission_type: CommissionType,

    /// Commission percent of the gross pool per period (PerPeriodRate only)
    pub commission_rate: f64,

    /// Total commission over the scheme (FixedTotal only)
    pub fixed_commission_total: f64,

    /// Interest charged on loans of idle pool funds, percent per period
    pub loan_interest_rate_percent: f64,

    /// Share of the idle pool lent out each period, 0-100
    pub loan_utilization_percent: f64,
}

impl Default for SchemeParameters {
    fn default() -> Self {
        Self {
            total_members: 20,
            monthly_contribution: 5_000.0,
            first_withdrawal: 80_000.0,
            monthly_increment: 1_000.0,
            commission_type: CommissionType::PerPeriodRate,
            commission_rate: 5.0,
            fixed_commission_total: 0.0,
            loan_interest_rate_percent: 2.0,
            loan_utilization_percent: 50.0,
        }
    }
}

impl SchemeParameters {
    /// Gross pool collected in a full period
    pub fn total_pool(&self) -> f64 {
        self.total_members as f64 * self.monthly_contribution
    }

    /// Commission deducted each period
    ///
    /// A fixed total is spread over the planned term of `total_members` periods.
    pub fn commission_per_month(&self) -> f64 {
        match self.commission_type {
            CommissionType::PerPeriodRate => self.total_pool() * self.commission_rate / 100.0,
            CommissionType::FixedTotal => {
                if self.total_members <= 0 {
                    0.0
                } else {
                    self.fixed_commission_total / self.total_members as f64
                }
            }
        }
    }

    /// Pool available for withdrawals in a full period, after commission
    pub fn net_pool_per_month(&self) -> f64 {
        self.total_pool() - self.commission_per_month()
    }

    /// Total commission charged over a run of `duration` periods
    ///
    /// For `FixedTotal` this is the agreed total, not the amount actually
    /// deducted: a scheme that settles before the planned term only collects
    /// `commission_per_month() * duration`.
    pub fn total_commission(&self, duration: u32) -> f64 {
        match self.commission_type {
            CommissionType::PerPeriodRate => self.commission_per_month() * duration as f64,
            CommissionType::FixedTotal => self.fixed_commission_total,
        }
    }

    /// Scheduled withdrawal for a zero-based period index
    pub fn withdrawal_for_period(&self, period_index: u32) -> f64 {
        self.first_withdrawal + self.monthly_increment * period_index as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_pool_figures() {
        let params = SchemeParameters::default();
        assert_relative_eq!(params.total_pool(), 100_000.0);
        assert_relative_eq!(params.commission_per_month(), 5_000.0);
        assert_relative_eq!(params.net_pool_per_month(), 95_000.0);
        assert_relative_eq!(params.total_commission(20), 100_000.0);
    }

    #[test]
    fn test_fixed_commission_amortized_over_term() {
        let params = SchemeParameters {
            commission_type: CommissionType::FixedTotal,
            fixed_commission_total: 40_000.0,
            ..Default::default()
        };
        assert_relative_eq!(params.commission_per_month(), 2_000.0);
        assert_relative_eq!(params.net_pool_per_month(), 98_000.0);
        // Total stays at the agreed figure however long the run
        assert_relative_eq!(params.total_commission(17), 40_000.0);
        assert_relative_eq!(params.commission_per_month() * 4.0, 8_000.0);
        assert_relative_eq!(params.total_commission(4), 40_000.0);
    }

    #[test]
    fn test_fixed_commission_with_no_members() {
        let params = SchemeParameters {
            total_members: 0,
            commission_type: CommissionType::FixedTotal,
            fixed_commission_total: 1_000.0,
            ..Default::default()
        };
        assert_eq!(params.commission_per_month(), 0.0);
    }

    #[test]
    fn test_withdrawal_escalation() {
        let params = SchemeParameters::default();
        assert_relative_eq!(params.withdrawal_for_period(0), 80_000.0);
        assert_relative_eq!(params.withdrawal_for_period(5), 85_000.0);
    }
}
