//! Chit Fund CLI
//!
//! Command-line interface for simulating rotating savings schemes

use anyhow::{Context, Result};
use chit_fund::report;
use chit_fund::scenario::utilization_steps;
use chit_fund::scheme::{load_scheme_json, load_schemes};
use chit_fund::{CommissionType, ScenarioRunner, ScheduleResult, SchemeParameters};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "chit-fund",
    version,
    about = "Rotating savings scheme simulator with per-member IRR analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a single scheme and print its schedule
    Simulate {
        #[command(flatten)]
        scheme: SchemeArgs,

        /// Print the full result as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Directory for schedule.csv, loans.csv and members.csv
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Date of the first period, used to date the schedule (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// Run every scheme in a CSV file
    Batch {
        /// CSV file, one scheme per row
        #[arg(long)]
        input: PathBuf,

        /// Write per-scheme summaries to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Sweep loan utilization for a single scheme
    Sweep {
        #[command(flatten)]
        scheme: SchemeArgs,

        #[arg(long, default_value_t = 0.0)]
        from: f64,

        #[arg(long, default_value_t = 100.0)]
        to: f64,

        #[arg(long, default_value_t = 10.0)]
        step: f64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CommissionArg {
    Rate,
    Fixed,
}

/// Scheme inputs; anything not given falls back to the reference scheme
#[derive(Args, Debug)]
struct SchemeArgs {
    /// JSON file with the scheme parameters (flags below are ignored)
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    members: Option<i64>,

    #[arg(long)]
    contribution: Option<f64>,

    #[arg(long)]
    first_withdrawal: Option<f64>,

    #[arg(long)]
    increment: Option<f64>,

    #[arg(long, value_enum)]
    commission_type: Option<CommissionArg>,

    #[arg(long, help = "Commission percent of the pool per month")]
    commission_rate: Option<f64>,

    #[arg(long, help = "Total commission over the scheme")]
    fixed_commission: Option<f64>,

    #[arg(long, help = "Loan interest percent per month")]
    loan_interest: Option<f64>,

    #[arg(long, help = "Percent of the idle pool lent out each month")]
    loan_utilization: Option<f64>,
}

impl SchemeArgs {
    fn to_params(&self) -> Result<SchemeParameters> {
        if let Some(path) = &self.input {
            return load_scheme_json(path)
                .with_context(|| format!("Failed to load scheme from {}", path.display()));
        }

        let defaults = SchemeParameters::default();
        Ok(SchemeParameters {
            total_members: self.members.unwrap_or(defaults.total_members),
            monthly_contribution: self.contribution.unwrap_or(defaults.monthly_contribution),
            first_withdrawal: self.first_withdrawal.unwrap_or(defaults.first_withdrawal),
            monthly_increment: self.increment.unwrap_or(defaults.monthly_increment),
            commission_type: match self.commission_type {
                Some(CommissionArg::Rate) => CommissionType::PerPeriodRate,
                Some(CommissionArg::Fixed) => CommissionType::FixedTotal,
                None => defaults.commission_type,
            },
            commission_rate: self.commission_rate.unwrap_or(defaults.commission_rate),
            fixed_commission_total: self.fixed_commission.unwrap_or(defaults.fixed_commission_total),
            loan_interest_rate_percent: self.loan_interest.unwrap_or(defaults.loan_interest_rate_percent),
            loan_utilization_percent: self.loan_utilization.unwrap_or(defaults.loan_utilization_percent),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate { scheme, json, output_dir, start_date } => {
            run_simulate(&scheme.to_params()?, json, output_dir.as_deref(), start_date)
        }
        Command::Batch { input, output } => run_batch(&input, output.as_deref()),
        Command::Sweep { scheme, from, to, step } => run_sweep(&scheme.to_params()?, from, to, step),
    }
}

fn run_simulate(
    params: &SchemeParameters,
    json: bool,
    output_dir: Option<&Path>,
    start_date: Option<NaiveDate>,
) -> Result<()> {
    let result = ScenarioRunner::new().run(params);

    if json {
        println!("{}", report::to_json(&result)?);
    } else {
        print_schedule(&result, start_date);
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Unable to create {}", dir.display()))?;
        report::write_schedule_csv(create(&dir.join("schedule.csv"))?, &result, start_date)?;
        report::write_loans_csv(create(&dir.join("loans.csv"))?, &result)?;
        report::write_member_returns_csv(create(&dir.join("members.csv"))?, &result)?;
        println!("\nResults written to: {}", dir.display());
    }

    Ok(())
}

fn run_batch(input: &Path, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let schemes = load_schemes(input)
        .with_context(|| format!("Failed to load schemes from {}", input.display()))?;
    println!("Loaded {} schemes in {:?}", schemes.len(), start.elapsed());

    let results = ScenarioRunner::new().run_batch(&schemes);
    let summaries: Vec<_> = results.iter().map(ScheduleResult::summary).collect();
    println!("Simulations complete in {:?}\n", start.elapsed());

    println!("{:>6} {:>7} {:>8} {:>14} {:>14} {:>12} {:>10}",
        "Scheme", "Members", "Months", "Commission", "Interest", "Unserved", "Mean IRR%");
    println!("{}", "-".repeat(78));
    for (i, (scheme, summary)) in schemes.iter().zip(&summaries).enumerate() {
        println!("{:>6} {:>7} {:>8} {:>14.0} {:>14.0} {:>12} {:>10}",
            i + 1,
            scheme.total_members,
            summary.duration,
            summary.total_commission,
            summary.total_interest_earned,
            summary.members_unserved,
            format_rate(summary.mean_annualized_irr),
        );
    }

    if let Some(path) = output {
        report::write_summaries_csv(create(path)?, &summaries)?;
        println!("\nSummaries written to: {}", path.display());
    }

    Ok(())
}

fn run_sweep(params: &SchemeParameters, from: f64, to: f64, step: f64) -> Result<()> {
    let utilizations = utilization_steps(from, to, step);
    let results = ScenarioRunner::new().run_utilization_sweep(params, &utilizations);

    println!("{:>12} {:>14} {:>14} {:>8} {:>10}",
        "Utilization%", "Total Loans", "Interest", "Months", "Mean IRR%");
    println!("{}", "-".repeat(62));
    for (pct, result) in utilizations.iter().zip(&results) {
        let summary = result.summary();
        println!("{:>12.1} {:>14.0} {:>14.0} {:>8} {:>10}",
            pct,
            summary.total_loan_amount,
            summary.total_interest_earned,
            summary.duration,
            format_rate(summary.mean_annualized_irr),
        );
    }

    Ok(())
}

fn print_schedule(result: &ScheduleResult, start_date: Option<NaiveDate>) {
    println!("Chit Fund Schedule ({} months)", result.duration);
    println!("==============================\n");
    println!("  Total Pool:        {:.0}", result.total_pool);
    println!("  Commission/Month:  {:.0}", result.commission_per_month);
    println!("  Net Pool/Month:    {:.0}", result.net_pool_per_month);
    println!();

    println!("{:>5} {:>10} {:>12} {:>12} {:>12} {:>5} {:>12} {:>12} {:>7} {:>4}",
        "Month", "Due", "Withdrawal", "Contrib", "Available", "Paid", "Remaining", "Loan", "Members", "Stl");
    println!("{}", "-".repeat(103));
    for month in &result.months {
        let due = start_date
            .and_then(|d| report::due_date(d, month.month))
            .map(|d| d.to_string())
            .unwrap_or_default();
        let loan = result.loan_for_month(month.month).map(|l| l.loan_amount).unwrap_or(0.0);
        println!("{:>5} {:>10} {:>12.0} {:>12.0} {:>12.0} {:>5} {:>12.0} {:>12.0} {:>7} {:>4}",
            month.month,
            due,
            month.withdrawal_amount,
            month.contribution_per_member,
            month.available_pool,
            month.actual_withdrawal_count,
            month.remaining_pool,
            loan,
            month.remaining_members_after,
            if month.is_settlement_month { "*" } else { "" },
        );
    }

    println!("\n{:>6} {:>6} {:>12} {:>12} {:>12} {:>9} {:>10} {:>10}",
        "Member", "Month", "Paid In", "Received", "Net", "Return%", "IRR%/mo", "IRR%/yr");
    println!("{}", "-".repeat(84));
    for member in &result.member_returns {
        println!("{:>6} {:>6} {:>12.0} {:>12.0} {:>12.0} {:>9.2} {:>10} {:>10}",
            member.member_id,
            member.withdrawal_month,
            member.total_contribution,
            member.withdrawal_amount,
            member.net_return,
            member.return_percentage,
            format_rate(member.monthly_irr),
            format_rate(member.annualized_irr),
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Members Served:    {}", summary.total_members_served);
    println!("  Members Unserved:  {}", summary.members_unserved);
    println!("  Total Commission:  {:.0}", summary.total_commission);
    println!("  Total Loans:       {:.0}", summary.total_loan_amount);
    println!("  Interest Earned:   {:.0}", summary.total_interest_earned);
    println!("  Final Carry-Over:  {:.0}", summary.final_carry_over);
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "n/a".to_string())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
