// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure payroll computation. Nothing in here touches the database or reads
//! process-wide state; settings and prior payrolls are passed in explicitly.

pub mod assemble;
pub mod cumulative;
pub mod settings;
pub mod tax;
pub mod timesheet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{PayrollError, PayrollResult};

pub use assemble::{PayrollBreakdown, PayrollInput, compute_payroll};
pub use cumulative::cumulative_income_before;
pub use tax::{minimum_wage_exemptions, progressive_tax, progressive_tax_walk};
pub use timesheet::{DayCounts, aggregate};

/// Calendar days in `month` (1..=12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> PayrollResult<u32> {
    if !(1..=12).contains(&month) {
        return Err(PayrollError::invalid(format!(
            "month {} is outside 1..=12",
            month
        )));
    }
    let (next_y, next_m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or_else(|| PayrollError::invalid(format!("year {} is out of range", year)))
}

/// Unwraps a `checked_*` result, naming the figure that left the decimal range.
pub(crate) fn checked(value: Option<Decimal>, what: &str) -> PayrollResult<Decimal> {
    value.ok_or_else(|| PayrollError::invalid(format!("{} overflows", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2025, 1).unwrap(), 31);
        assert_eq!(days_in_month(2025, 2).unwrap(), 28);
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 4).unwrap(), 30);
        assert_eq!(days_in_month(2025, 12).unwrap(), 31);
    }

    #[test]
    fn rejects_bad_month() {
        assert!(days_in_month(2025, 0).is_err());
        assert!(days_in_month(2025, 13).is_err());
    }
}
