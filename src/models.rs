// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for EmployeeStatus {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(PayrollError::invalid(format!(
                "unknown employee status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub monthly_salary: Decimal,
    pub department_id: Option<i64>,
    pub status: EmployeeStatus,
}

/// Attendance tag recorded for one day of a timesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayStatus {
    Worked,
    NotWorked,
    PaidLeave,
    UnpaidLeave,
    Overtime,
    SickLeave,
    Weekend,
    PublicHoliday,
}

impl DayStatus {
    pub const ALL: [DayStatus; 8] = [
        DayStatus::Worked,
        DayStatus::NotWorked,
        DayStatus::PaidLeave,
        DayStatus::UnpaidLeave,
        DayStatus::Overtime,
        DayStatus::SickLeave,
        DayStatus::Weekend,
        DayStatus::PublicHoliday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Worked => "worked",
            DayStatus::NotWorked => "notWorked",
            DayStatus::PaidLeave => "paidLeave",
            DayStatus::UnpaidLeave => "unpaidLeave",
            DayStatus::Overtime => "overtime",
            DayStatus::SickLeave => "sickLeave",
            DayStatus::Weekend => "weekend",
            DayStatus::PublicHoliday => "publicHoliday",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayStatus {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DayStatus::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| PayrollError::invalid(format!("unknown day status '{}'", s)))
    }
}

/// A timesheet cell: either a bare status or a status with overtime details.
///
/// The wire form mirrors what attendance entry stores: `"worked"` or
/// `{"status":"overtime","hours":3,"isWeekend":true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayEntry {
    Simple(DayStatus),
    Detailed {
        status: DayStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hours: Option<Decimal>,
        #[serde(default, rename = "isWeekend")]
        is_weekend: bool,
        #[serde(default, rename = "isHoliday")]
        is_holiday: bool,
    },
}

impl DayEntry {
    pub fn overtime(hours: Decimal, is_weekend: bool, is_holiday: bool) -> Self {
        DayEntry::Detailed {
            status: DayStatus::Overtime,
            hours: Some(hours),
            is_weekend,
            is_holiday,
        }
    }

    pub fn status(&self) -> DayStatus {
        match self {
            DayEntry::Simple(s) => *s,
            DayEntry::Detailed { status, .. } => *status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub employee_id: i64,
    pub year: i32,
    pub month: u32, // 1..=12
    #[serde(default)]
    pub days: BTreeMap<u32, DayEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper bound of cumulative yearly income for this bracket; `None` is unbounded.
    pub limit: Option<Decimal>,
    pub rate: Decimal,
}

/// Payroll parameters in effect at computation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub sgk_rate: Decimal,
    pub unemployment_rate: Decimal,
    pub stamp_tax_rate: Decimal,
    pub minimum_wage: Decimal,
    pub daily_work_hours: Decimal,
    pub overtime_multiplier: Decimal,
    pub weekend_multiplier: Decimal,
    pub holiday_multiplier: Decimal,
    pub tax_brackets: Vec<TaxBracket>,
}

/// The slice of a persisted payroll that later months need for cumulative income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSummary {
    pub employee_id: i64,
    pub year: i32,
    pub month: u32,
    pub gross_salary: Decimal,
    pub sgk_employee: Decimal,
    pub unemployment: Decimal,
}

impl PayrollSummary {
    pub fn income_tax_base(&self) -> Decimal {
        self.gross_salary - self.sgk_employee - self.unemployment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayrollState {
    Pending,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    pub employee_id: i64,
    pub year: i32,
    pub month: u32,
    pub worked_days: u32,
    pub overtime_days: u32,
    pub days_in_month: u32,
    pub daily_salary: Decimal,
    pub gross_salary: Decimal,
    pub sgk_employee: Decimal,
    pub unemployment: Decimal,
    pub income_tax: Decimal,
    pub stamp_tax: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
}

impl Payroll {
    pub fn state(&self) -> PayrollState {
        if self.approved {
            PayrollState::Approved
        } else {
            PayrollState::Pending
        }
    }

    /// Pending -> Approved. Already-approved payrolls keep their first stamp.
    pub fn approve(&mut self, by: &str, at: DateTime<Utc>) {
        if self.approved {
            return;
        }
        self.approved = true;
        self.approved_at = Some(at);
        self.approved_by = Some(by.to_string());
    }

    /// Approved -> Pending, clearing who/when.
    pub fn unapprove(&mut self) {
        self.approved = false;
        self.approved_at = None;
        self.approved_by = None;
    }
}
