//! Internal Rate of Return (IRR) calculation
//!
//! Newton-Raphson from a 1% initial guess, falling back to bisection over
//! [-99%, 1000%] when the derivative vanishes or Newton runs out of iterations.

/// Default iteration cap for each method
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default convergence tolerance on |NPV|
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

const INITIAL_GUESS: f64 = 0.01;
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

/// Where Newton restarts after overshooting the floor or ceiling
const FLOOR_RESET: f64 = -0.5;
const CEILING_RESET: f64 = 1.0;

/// Periodic IRR solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrSolver {
    pub max_iterations: u32,
    pub tolerance: f64,
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl IrrSolver {
    pub fn new(max_iterations: u32, tolerance: f64) -> Self {
        Self { max_iterations, tolerance }
    }

    /// Solve for the periodic rate at which the NPV of `cashflows` is zero
    ///
    /// # Arguments
    /// * `cashflows` - one amount per period (positive = inflow, negative = outflow)
    ///
    /// # Returns
    /// * `Option<f64>` - periodic rate as a decimal, or None if neither method converged
    pub fn solve(&self, cashflows: &[f64]) -> Option<f64> {
        if cashflows.is_empty() {
            return None;
        }

        self.newton_raphson(cashflows)
            .or_else(|| self.bisection(cashflows))
    }

    fn newton_raphson(&self, cashflows: &[f64]) -> Option<f64> {
        let mut rate = INITIAL_GUESS;

        for _ in 0..self.max_iterations {
            let (npv, dnpv) = npv_and_derivative(cashflows, rate);

            if npv.abs() < self.tolerance {
                return Some(rate);
            }

            if dnpv.abs() < self.tolerance {
                // Flat NPV curve, Newton cannot make progress
                return None;
            }

            let candidate = rate - npv / dnpv;
            rate = if candidate < RATE_FLOOR {
                FLOOR_RESET
            } else if candidate > RATE_CEILING {
                CEILING_RESET
            } else {
                candidate
            };
        }

        log::debug!("Newton-Raphson exhausted {} iterations, trying bisection", self.max_iterations);
        None
    }

    fn bisection(&self, cashflows: &[f64]) -> Option<f64> {
        let mut low = RATE_FLOOR;
        let mut high = RATE_CEILING;

        for _ in 0..self.max_iterations {
            let mid = (low + high) / 2.0;
            let npv_mid = net_present_value(cashflows, mid);

            if npv_mid.abs() < self.tolerance {
                return Some(mid);
            }

            if net_present_value(cashflows, low) * npv_mid > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
        }

        None
    }
}

/// Solve with the default iteration cap and tolerance
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    IrrSolver::default().solve(cashflows)
}

/// Compound a periodic (monthly) rate to an annual one
pub fn annualize_monthly_rate(monthly_rate: f64) -> f64 {
    (1.0 + monthly_rate).powi(12) - 1.0
}

/// Calculate NPV at a given periodic rate, first cashflow undiscounted
pub fn net_present_value(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}
