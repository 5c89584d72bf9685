//! Scenario runner for batch and sweep runs
//!
//! Every run recomputes the whole pipeline from the parameters; nothing is
//! cached between runs.

use rayon::prelude::*;
use crate::returns::{IrrSolver, ReturnAnalyzer};
use crate::schedule::{ScheduleEngine, ScheduleResult};
use crate::scheme::SchemeParameters;

/// Runs schemes through the schedule engine and return analyzer
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let results = runner.run_utilization_sweep(&params, &[0.0, 25.0, 50.0, 75.0, 100.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    analyzer: ReturnAnalyzer,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with a non-default IRR solver
    pub fn with_solver(solver: IrrSolver) -> Self {
        Self {
            analyzer: ReturnAnalyzer::new(solver),
        }
    }

    /// Run a single scheme
    pub fn run(&self, params: &SchemeParameters) -> ScheduleResult {
        self.run_with_utilization(params, params.loan_utilization_percent)
    }

    /// Run a single scheme with an explicit loan utilization
    pub fn run_with_utilization(&self, params: &SchemeParameters, loan_utilization_percent: f64) -> ScheduleResult {
        let mut result = ScheduleEngine::new(params.clone()).simulate(loan_utilization_percent);
        result.member_returns = self.analyzer.analyze(&result);
        result
    }

    /// Run many schemes in parallel, results in input order
    pub fn run_batch(&self, schemes: &[SchemeParameters]) -> Vec<ScheduleResult> {
        log::info!("Running {} schemes", schemes.len());
        schemes.par_iter().map(|params| self.run(params)).collect()
    }

    /// Run one scheme at each loan utilization, results in input order
    pub fn run_utilization_sweep(&self, params: &SchemeParameters, utilizations: &[f64]) -> Vec<ScheduleResult> {
        utilizations
            .par_iter()
            .map(|&pct| self.run_with_utilization(params, pct))
            .collect()
    }
}

/// Upper bound on the number of runs in one sweep
pub const MAX_SWEEP_STEPS: usize = 1_000;

/// Utilization steps from `from` to `to` inclusive, at most `MAX_SWEEP_STEPS + 1` of them
pub fn utilization_steps(from: f64, to: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || to < from {
        return vec![from];
    }
    let steps = ((to - from) / step + 1e-9).floor();
    let count = if steps > MAX_SWEEP_STEPS as f64 {
        log::warn!(
            "Sweep step {} gives {} runs, truncating to {}",
            step,
            steps,
            MAX_SWEEP_STEPS + 1
        );
        MAX_SWEEP_STEPS
    } else {
        steps as usize
    };
    (0..=count).map(|i| from + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_scheme;

    #[test]
    fn test_run_matches_pipeline() {
        let params = SchemeParameters::default();
        assert_eq!(ScenarioRunner::new().run(&params), run_scheme(&params));
    }

    #[test]
    fn test_batch_preserves_order() {
        let schemes: Vec<_> = [10, 20, 30]
            .iter()
            .map(|&n| SchemeParameters {
                total_members: n,
                first_withdrawal: n as f64 * 4_000.0,
                ..Default::default()
            })
            .collect();

        let results = ScenarioRunner::new().run_batch(&schemes);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].total_pool, 50_000.0);
        assert_eq!(results[1].total_pool, 100_000.0);
        assert_eq!(results[2].total_pool, 150_000.0);
    }

    #[test]
    fn test_sweep_more_lending_earns_more_interest() {
        let params = SchemeParameters::default();
        let results = ScenarioRunner::new().run_utilization_sweep(&params, &[0.0, 50.0, 100.0]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].total_interest_earned, 0.0);
        assert!(results[1].total_interest_earned > 0.0);
        assert_eq!(results[1], run_scheme(&params));
        assert!(results[2].loans[0].loan_amount > results[1].loans[0].loan_amount);
    }

    #[test]
    fn test_utilization_steps() {
        assert_eq!(utilization_steps(0.0, 100.0, 25.0), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(utilization_steps(10.0, 30.0, 15.0), vec![10.0, 25.0]);
        assert_eq!(utilization_steps(50.0, 50.0, 10.0), vec![50.0]);
        assert_eq!(utilization_steps(0.0, 100.0, 0.0), vec![0.0]);
        assert_eq!(utilization_steps(0.0, 100.0, f64::NAN), vec![0.0]);
    }

    #[test]
    fn test_utilization_steps_capped() {
        let steps = utilization_steps(0.0, 100.0, 1e-12);
        assert_eq!(steps.len(), MAX_SWEEP_STEPS + 1);
        assert_eq!(steps[0], 0.0);

        let steps = utilization_steps(0.0, f64::INFINITY, 1.0);
        assert_eq!(steps.len(), MAX_SWEEP_STEPS + 1);
    }
}
