//! Running pool state carried between simulated periods

/// State of the pool at the start of a period
///
/// All amounts are kept at full precision. Only the reported records are
/// rounded, so rounding error never feeds back into later periods.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Zero-based index of the next period to simulate
    pub period_index: u32,

    /// Members who have not yet received their payout
    pub remaining_members: u32,

    /// Pool left over after last period's withdrawals and lending
    pub carry_over_pool: f64,

    /// Loan principal plus interest due back this period
    pub pending_loan_repayment: f64,
}

impl SimulationState {
    /// Initial state before the first period
    pub fn new(total_members: u32) -> Self {
        Self {
            period_index: 0,
            remaining_members: total_members,
            carry_over_pool: 0.0,
            pending_loan_repayment: 0.0,
        }
    }

    /// Funds brought into the period from the previous one, including the repaid loan
    pub fn effective_carry_over(&self) -> f64 {
        self.carry_over_pool + self.pending_loan_repayment
    }

    /// 1-based month number of the next period
    pub fn month(&self) -> u32 {
        self.period_index + 1
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_members == 0
    }
}
