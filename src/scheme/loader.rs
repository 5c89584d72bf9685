//! Load scheme parameters from CSV or JSON files

use super::{CommissionType, SchemeParameters};
use crate::error::{Result, SchemeError};
use csv::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Raw CSV row, one scheme per line
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "TotalMembers")]
    total_members: i64,
    #[serde(rename = "MonthlyContribution")]
    monthly_contribution: f64,
    #[serde(rename = "FirstWithdrawal")]
    first_withdrawal: f64,
    #[serde(rename = "MonthlyIncrement")]
    monthly_increment: f64,
    #[serde(rename = "CommissionType")]
    commission_type: String,
    #[serde(rename = "CommissionRate", default)]
    commission_rate: f64,
    #[serde(rename = "FixedCommissionTotal", default)]
    fixed_commission_total: f64,
    #[serde(rename = "LoanInterestRate", default)]
    loan_interest_rate_percent: f64,
    #[serde(rename = "LoanUtilization", default)]
    loan_utilization_percent: f64,
}

impl CsvRow {
    fn into_params(self) -> Result<SchemeParameters> {
        let commission_type = match self.commission_type.trim() {
            "PerPeriodRate" | "Percentage" => CommissionType::PerPeriodRate,
            "FixedTotal" | "Fixed" => CommissionType::FixedTotal,
            other => return Err(SchemeError::UnknownCommissionType(other.to_string())),
        };

        Ok(SchemeParameters {
            total_members: self.total_members,
            monthly_contribution: self.monthly_contribution,
            first_withdrawal: self.first_withdrawal,
            monthly_increment: self.monthly_increment,
            commission_type,
            commission_rate: self.commission_rate,
            fixed_commission_total: self.fixed_commission_total,
            loan_interest_rate_percent: self.loan_interest_rate_percent,
            loan_utilization_percent: self.loan_utilization_percent,
        })
    }
}

/// Load every scheme from a CSV file
pub fn load_schemes<P: AsRef<Path>>(path: P) -> Result<Vec<SchemeParameters>> {
    let path = path.as_ref();
    let schemes = load_schemes_from_reader(File::open(path)?)?;
    if schemes.is_empty() {
        return Err(SchemeError::EmptyInput(path.to_path_buf()));
    }
    log::info!("Loaded {} schemes from {}", schemes.len(), path.display());
    Ok(schemes)
}

/// Load schemes from any reader (e.g., string buffer, stdin)
pub fn load_schemes_from_reader<R: Read>(reader: R) -> Result<Vec<SchemeParameters>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut schemes = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        schemes.push(row.into_params()?);
    }

    Ok(schemes)
}

/// Load a single scheme from a JSON file
pub fn load_scheme_json<P: AsRef<Path>>(path: P) -> Result<SchemeParameters> {
    let file = File::open(path.as_ref())?;
    let params = serde_json::from_reader(BufReader::new(file))?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
TotalMembers,MonthlyContribution,FirstWithdrawal,MonthlyIncrement,CommissionType,CommissionRate,FixedCommissionTotal,LoanInterestRate,LoanUtilization
20,5000,80000,1000,PerPeriodRate,5,0,2,50
10,1000,8000,200,FixedTotal,0,5000,1.5,0
";

    #[test]
    fn test_load_schemes_from_reader() {
        let schemes = load_schemes_from_reader(SAMPLE.as_bytes()).expect("Failed to load schemes");
        assert_eq!(schemes.len(), 2);

        assert_eq!(schemes[0], SchemeParameters::default());

        let fixed = &schemes[1];
        assert_eq!(fixed.total_members, 10);
        assert_eq!(fixed.commission_type, CommissionType::FixedTotal);
        assert_eq!(fixed.fixed_commission_total, 5_000.0);
        assert_eq!(fixed.loan_utilization_percent, 0.0);
    }

    #[test]
    fn test_load_bundled_files() {
        let schemes = load_schemes("data/schemes.csv").expect("Failed to load schemes");
        assert_eq!(schemes.len(), 4);
        assert_eq!(schemes[2].commission_type, CommissionType::FixedTotal);

        let scheme = load_scheme_json("data/scheme.json").expect("Failed to load scheme");
        assert_eq!(scheme.total_members, 12);
        assert_eq!(scheme.fixed_commission_total, 60_000.0);
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let path = std::env::temp_dir().join("chit_fund_empty_schemes.csv");
        std::fs::write(&path, "TotalMembers,MonthlyContribution,FirstWithdrawal,MonthlyIncrement,CommissionType\n").unwrap();
        let err = load_schemes(&path).unwrap_err();
        assert!(matches!(err, SchemeError::EmptyInput(_)));
    }

    #[test]
    fn test_unknown_commission_type() {
        let csv = "\
TotalMembers,MonthlyContribution,FirstWithdrawal,MonthlyIncrement,CommissionType
5,100,400,10,Bogus
";
        let err = load_schemes_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemeError::UnknownCommissionType(ref s) if s == "Bogus"));
    }

    #[test]
    fn test_json_round_trip_field_names() {
        let json = serde_json::to_string(&SchemeParameters::default()).unwrap();
        assert!(json.contains("\"total_members\":20"));
        assert!(json.contains("\"commission_type\":\"PerPeriodRate\""));
        let back: SchemeParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SchemeParameters::default());
    }
}
