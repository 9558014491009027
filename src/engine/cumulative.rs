// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use super::checked;
use crate::error::PayrollResult;
use crate::models::PayrollSummary;

/// Year-to-date income-tax base of `employee_id` before `month` of `year`.
///
/// Only persisted payrolls count; a month with no payroll adds nothing.
/// January always starts from zero since no earlier month of the year exists.
pub fn cumulative_income_before<'a, I>(
    prior: I,
    employee_id: i64,
    year: i32,
    month: u32,
) -> PayrollResult<Decimal>
where
    I: IntoIterator<Item = &'a PayrollSummary>,
{
    prior
        .into_iter()
        .filter(|p| p.employee_id == employee_id && p.year == year && p.month < month)
        .try_fold(Decimal::ZERO, |acc, p| {
            checked(acc.checked_add(p.income_tax_base()), "cumulative income")
        })
}
