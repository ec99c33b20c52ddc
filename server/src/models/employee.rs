// salesdesk/server/src/models/employee.rs

use crate::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{non_blank, STATUS_ACTIVE, STATUS_INACTIVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
  Fixed,
  Commissioned,
}

#[derive(Debug, Error)]
#[error("unknown contract type '{0}'")]
pub struct UnknownContractType(pub String);

impl ContractType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ContractType::Fixed => "Fixed",
      ContractType::Commissioned => "Commissioned",
    }
  }
}

impl fmt::Display for ContractType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ContractType {
  type Err = UnknownContractType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Fixed" => Ok(ContractType::Fixed),
      "Commissioned" => Ok(ContractType::Commissioned),
      other => Err(UnknownContractType(other.to_string())),
    }
  }
}

impl TryFrom<String> for ContractType {
  type Error = UnknownContractType;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employee {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub role: String,
  #[sqlx(try_from = "String")]
  pub contract_type: ContractType,
  pub base_salary: Decimal,
  pub commission_rate: Decimal, // Percent of invoiced order value
  pub email: Option<String>,
  pub phone: Option<String>,
  pub status: String,
  pub hired_at: DateTime<Utc>,
}

/// Slim projection for selection widgets.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActiveEmployee {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployeeRequest {
  pub name: Option<String>,
  pub role: Option<String>,
  pub contract_type: Option<ContractType>,
  pub base_salary: Option<Decimal>,
  pub commission_rate: Option<Decimal>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
  pub name: String,
  pub role: String,
  pub contract_type: ContractType,
  pub base_salary: Decimal,
  pub commission_rate: Decimal,
  pub email: Option<String>,
  pub phone: Option<String>,
}

fn check_commission_rate(rate: Decimal) -> Result<(), AppError> {
  if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
    return Err(AppError::Validation("Commission rate must be between 0 and 100".into()));
  }
  Ok(())
}

impl CreateEmployeeRequest {
  pub fn into_new_employee(self) -> Result<NewEmployee, AppError> {
    let (name, role, contract_type, base_salary) =
      match (non_blank(self.name), non_blank(self.role), self.contract_type, self.base_salary) {
        (Some(name), Some(role), Some(contract_type), Some(base_salary)) => (name, role, contract_type, base_salary),
        _ => {
          return Err(AppError::Validation(
            "Missing required fields: name, role, contract_type, base_salary".into(),
          ))
        }
      };
    if base_salary < Decimal::ZERO {
      return Err(AppError::Validation("Base salary cannot be negative".into()));
    }
    let commission_rate = match (contract_type, self.commission_rate) {
      (ContractType::Commissioned, None) => {
        return Err(AppError::Validation(
          "Commission rate is required for commissioned employees".into(),
        ))
      }
      (_, rate) => rate.unwrap_or(Decimal::ZERO),
    };
    check_commission_rate(commission_rate)?;
    Ok(NewEmployee {
      name,
      role,
      contract_type,
      base_salary,
      commission_rate,
      email: non_blank(self.email),
      phone: non_blank(self.phone),
    })
  }
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployeeRequest {
  pub name: Option<String>,
  pub role: Option<String>,
  pub contract_type: Option<ContractType>,
  pub base_salary: Option<Decimal>,
  pub commission_rate: Option<Decimal>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub status: Option<String>,
}

impl UpdateEmployeeRequest {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.base_salary.is_some_and(|s| s < Decimal::ZERO) {
      return Err(AppError::Validation("Base salary cannot be negative".into()));
    }
    if let Some(rate) = self.commission_rate {
      check_commission_rate(rate)?;
    }
    if let Some(status) = self.status.as_deref() {
      if status != STATUS_ACTIVE && status != STATUS_INACTIVE {
        return Err(AppError::Validation(format!("Invalid status '{}'", status)));
      }
    }
    Ok(())
  }
}

/// Commission on invoiced sales, rounded to cents. Fixed contracts earn none.
pub fn commission_for(contract_type: ContractType, commission_rate: Decimal, invoiced_sales: Decimal) -> Decimal {
  match contract_type {
    ContractType::Commissioned => (invoiced_sales * commission_rate / Decimal::ONE_HUNDRED).round_dp(2),
    ContractType::Fixed => Decimal::ZERO,
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryEmployee {
  pub code: String,
  pub name: String,
  pub role: String,
  pub contract_type: ContractType,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SalaryPeriod {
  pub month: u32,
  pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryCalculation {
  pub base_salary: Decimal,
  pub commission_rate: Decimal,
  pub commission: Decimal,
  pub total_salary: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryBreakdown {
  pub employee: SalaryEmployee,
  pub period: SalaryPeriod,
  pub calculation: SalaryCalculation,
}

impl SalaryBreakdown {
  /// Base salary plus, for commissioned employees, the rate applied to the
  /// period's invoiced sales. Fixed contracts earn no commission.
  pub fn compute(employee: &Employee, period: SalaryPeriod, invoiced_sales: Decimal) -> Self {
    let commission = commission_for(employee.contract_type, employee.commission_rate, invoiced_sales);
    Self {
      employee: SalaryEmployee {
        code: employee.code.clone(),
        name: employee.name.clone(),
        role: employee.role.clone(),
        contract_type: employee.contract_type,
      },
      period,
      calculation: SalaryCalculation {
        base_salary: employee.base_salary,
        commission_rate: employee.commission_rate,
        commission,
        total_salary: employee.base_salary + commission,
      },
    }
  }
}

/// First day of the month and first day of the following month.
pub fn month_bounds(period: SalaryPeriod) -> Result<(NaiveDate, NaiveDate), AppError> {
  let invalid = || AppError::Validation(format!("Invalid period {}/{}", period.month, period.year));
  let start = NaiveDate::from_ymd_opt(period.year, period.month, 1).ok_or_else(invalid)?;
  let (next_year, next_month) = if period.month == 12 {
    (period.year + 1, 1)
  } else {
    (period.year, period.month + 1)
  };
  let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;
  Ok((start, end))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn employee(contract_type: ContractType, commission_rate: Decimal) -> Employee {
    Employee {
      id: 1,
      code: "#FUNC-001".into(),
      name: "Carlos Lima".into(),
      role: "Seller".into(),
      contract_type,
      base_salary: dec!(2000.00),
      commission_rate,
      email: None,
      phone: None,
      status: "active".into(),
      hired_at: Utc::now(),
    }
  }

  #[test]
  fn commissioned_contract_requires_a_rate() {
    let request = CreateEmployeeRequest {
      name: Some("Carlos".into()),
      role: Some("Seller".into()),
      contract_type: Some(ContractType::Commissioned),
      base_salary: Some(dec!(1500)),
      ..Default::default()
    };
    assert!(matches!(request.clone().into_new_employee(), Err(AppError::Validation(_))));

    let with_rate = CreateEmployeeRequest {
      commission_rate: Some(dec!(5)),
      ..request
    };
    assert_eq!(with_rate.into_new_employee().unwrap().commission_rate, dec!(5));
  }

  #[test]
  fn fixed_contract_defaults_rate_to_zero() {
    let request = CreateEmployeeRequest {
      name: Some("Bia".into()),
      role: Some("Stock".into()),
      contract_type: Some(ContractType::Fixed),
      base_salary: Some(dec!(1800)),
      ..Default::default()
    };
    assert_eq!(request.into_new_employee().unwrap().commission_rate, Decimal::ZERO);
  }

  #[test]
  fn contract_type_parses_from_json_and_text() {
    let request: CreateEmployeeRequest = serde_json::from_str(r#"{"contract_type": "Commissioned"}"#).unwrap();
    assert_eq!(request.contract_type, Some(ContractType::Commissioned));
    assert!("Hourly".parse::<ContractType>().is_err());
  }

  #[test]
  fn salary_adds_commission_for_commissioned_contracts() {
    let period = SalaryPeriod { month: 3, year: 2025 };
    let breakdown = SalaryBreakdown::compute(&employee(ContractType::Commissioned, dec!(5)), period, dec!(10000));
    assert_eq!(breakdown.calculation.commission, dec!(500.00));
    assert_eq!(breakdown.calculation.total_salary, dec!(2500.00));

    let fixed = SalaryBreakdown::compute(&employee(ContractType::Fixed, dec!(5)), period, dec!(10000));
    assert_eq!(fixed.calculation.commission, Decimal::ZERO);
    assert_eq!(fixed.calculation.total_salary, dec!(2000.00));
  }

  #[test]
  fn month_bounds_roll_over_the_year() {
    let (start, end) = month_bounds(SalaryPeriod { month: 12, year: 2024 }).unwrap();
    assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert!(month_bounds(SalaryPeriod { month: 13, year: 2024 }).is_err());
  }
}
