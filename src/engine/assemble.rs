// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use super::cumulative::cumulative_income_before;
use super::tax::{
    Exemptions, TaxWalk, apply_exemption, minimum_wage_exemptions, progressive_tax_walk,
};
use super::{checked, days_in_month};
use super::timesheet::{DayCounts, aggregate};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{Employee, Payroll, PayrollSummary, Settings, Timesheet};

/// Everything one payroll computation depends on.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInput<'a> {
    pub employee: &'a Employee,
    pub year: i32,
    pub month: u32,
    /// `None` when no attendance was entered; the payroll is then zero.
    pub timesheet: Option<&'a Timesheet>,
    pub settings: &'a Settings,
    /// Persisted payrolls of earlier months. Entries for other employees,
    /// other years or later months are ignored.
    pub prior: &'a [PayrollSummary],
}

/// Full audit trail of one payroll computation. `to_payroll` projects the
/// persisted record out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollBreakdown {
    pub employee_id: i64,
    pub year: i32,
    pub month: u32,
    pub counts: DayCounts,
    pub days_in_month: u32,
    pub daily_salary: Decimal,
    pub hourly_rate: Decimal,
    pub base_salary: Decimal,
    pub weekday_overtime_pay: Decimal,
    pub weekend_overtime_pay: Decimal,
    pub holiday_overtime_pay: Decimal,
    pub overtime_pay: Decimal,
    pub gross_salary: Decimal,
    pub sgk_employee: Decimal,
    pub unemployment: Decimal,
    pub income_tax_base: Decimal,
    pub previous_cumulative: Decimal,
    pub tax_walk: TaxWalk,
    pub exemptions: Exemptions,
    pub income_tax: Decimal,
    pub stamp_tax_before_exemption: Decimal,
    pub stamp_tax: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

pub fn compute_payroll(input: &PayrollInput<'_>) -> PayrollResult<PayrollBreakdown> {
    let PayrollInput {
        employee,
        year,
        month,
        timesheet,
        settings,
        prior,
    } = *input;

    if employee.monthly_salary <= Decimal::ZERO {
        return Err(PayrollError::invalid(format!(
            "employee {} monthly salary must be positive (got {})",
            employee.id, employee.monthly_salary
        )));
    }
    settings.validate()?;
    let dim = days_in_month(year, month)?;

    let counts = match timesheet {
        Some(ts) => {
            if ts.employee_id != employee.id || ts.year != year || ts.month != month {
                return Err(PayrollError::invalid(format!(
                    "timesheet {} {}-{:02} does not match payroll {} {}-{:02}",
                    ts.employee_id, ts.year, ts.month, employee.id, year, month
                )));
            }
            aggregate(&ts.days, dim)?
        }
        None => DayCounts::default(),
    };

    let dim_dec = Decimal::from(dim);
    let daily_salary = checked(employee.monthly_salary.checked_div(dim_dec), "daily salary")?;
    let hourly_rate = checked(daily_salary.checked_div(settings.daily_work_hours), "hourly rate")?;
    // multiply before dividing so a fully paid month is exactly the salary
    let base_salary = checked(
        employee
            .monthly_salary
            .checked_mul(Decimal::from(counts.paid_days()))
            .and_then(|v| v.checked_div(dim_dec)),
        "base salary",
    )?;

    let overtime = |hours: Decimal, multiplier: Decimal, what: &str| {
        checked(
            hours
                .checked_mul(hourly_rate)
                .and_then(|v| v.checked_mul(multiplier)),
            what,
        )
    };
    let weekday_overtime_pay = overtime(
        counts.weekday_overtime_hours,
        settings.overtime_multiplier,
        "weekday overtime pay",
    )?;
    let weekend_overtime_pay = overtime(
        counts.weekend_overtime_hours,
        settings.weekend_multiplier,
        "weekend overtime pay",
    )?;
    let holiday_overtime_pay = overtime(
        counts.holiday_overtime_hours,
        settings.holiday_multiplier,
        "holiday overtime pay",
    )?;
    let overtime_pay = checked(
        weekday_overtime_pay
            .checked_add(weekend_overtime_pay)
            .and_then(|v| v.checked_add(holiday_overtime_pay)),
        "overtime pay",
    )?;
    let gross_salary = checked(base_salary.checked_add(overtime_pay), "gross salary")?;

    let sgk_employee = checked(gross_salary.checked_mul(settings.sgk_rate), "SGK deduction")?;
    let unemployment = checked(
        gross_salary.checked_mul(settings.unemployment_rate),
        "unemployment deduction",
    )?;
    // both deductions are at most the gross, so this cannot overflow
    let income_tax_base = gross_salary - sgk_employee - unemployment;

    let previous_cumulative = cumulative_income_before(prior, employee.id, year, month)?;
    let tax_walk =
        progressive_tax_walk(income_tax_base, previous_cumulative, &settings.tax_brackets)?;
    let exemptions = minimum_wage_exemptions(settings)?;
    let income_tax = apply_exemption(tax_walk.tax, exemptions.income_tax);

    let stamp_tax_before_exemption = checked(
        gross_salary.checked_mul(settings.stamp_tax_rate),
        "stamp tax",
    )?;
    let stamp_tax = apply_exemption(stamp_tax_before_exemption, exemptions.stamp_tax);

    let total_deductions = checked(
        sgk_employee
            .checked_add(unemployment)
            .and_then(|v| v.checked_add(income_tax))
            .and_then(|v| v.checked_add(stamp_tax)),
        "total deductions",
    )?;
    let net_salary = checked(gross_salary.checked_sub(total_deductions), "net salary")?;

    Ok(PayrollBreakdown {
        employee_id: employee.id,
        year,
        month,
        counts,
        days_in_month: dim,
        daily_salary,
        hourly_rate,
        base_salary,
        weekday_overtime_pay,
        weekend_overtime_pay,
        holiday_overtime_pay,
        overtime_pay,
        gross_salary,
        sgk_employee,
        unemployment,
        income_tax_base,
        previous_cumulative,
        tax_walk,
        exemptions,
        income_tax,
        stamp_tax_before_exemption,
        stamp_tax,
        total_deductions,
        net_salary,
    })
}

impl PayrollBreakdown {
    /// The record to persist. An existing row keeps its approval state, even
    /// when it is already approved and the figures change underneath it.
    pub fn to_payroll(&self, existing: Option<&Payroll>) -> Payroll {
        let (approved, approved_at, approved_by) = match existing {
            Some(p) => (p.approved, p.approved_at, p.approved_by.clone()),
            None => (false, None, None),
        };
        Payroll {
            employee_id: self.employee_id,
            year: self.year,
            month: self.month,
            worked_days: self.counts.worked,
            overtime_days: self.counts.overtime_days,
            days_in_month: self.days_in_month,
            daily_salary: self.daily_salary,
            gross_salary: self.gross_salary,
            sgk_employee: self.sgk_employee,
            unemployment: self.unemployment,
            income_tax: self.income_tax,
            stamp_tax: self.stamp_tax,
            total_deductions: self.total_deductions,
            net_salary: self.net_salary,
            approved,
            approved_at,
            approved_by,
        }
    }
}
