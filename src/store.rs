// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row mapping between SQLite and the engine's models. Decimals are stored
//! as TEXT so amounts round-trip without float drift.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::PayrollError;
use crate::models::{Employee, Payroll, PayrollSummary, Settings, TaxBracket, Timesheet};

pub const SETTING_KEYS: [&str; 9] = [
    "sgk_rate",
    "unemployment_rate",
    "stamp_tax_rate",
    "minimum_wage",
    "daily_work_hours",
    "overtime_multiplier",
    "weekend_multiplier",
    "holiday_multiplier",
    "tax_brackets",
];

fn dec_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// Settings

fn setting_value(settings: &Settings, key: &str) -> Result<String> {
    Ok(match key {
        "sgk_rate" => settings.sgk_rate.to_string(),
        "unemployment_rate" => settings.unemployment_rate.to_string(),
        "stamp_tax_rate" => settings.stamp_tax_rate.to_string(),
        "minimum_wage" => settings.minimum_wage.to_string(),
        "daily_work_hours" => settings.daily_work_hours.to_string(),
        "overtime_multiplier" => settings.overtime_multiplier.to_string(),
        "weekend_multiplier" => settings.weekend_multiplier.to_string(),
        "holiday_multiplier" => settings.holiday_multiplier.to_string(),
        "tax_brackets" => serde_json::to_string(&settings.tax_brackets)?,
        other => return Err(anyhow!("Unknown setting '{}'", other)),
    })
}

/// Applies one `key=value` pair to `settings` without validating the result.
pub fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    let parse = |v: &str| {
        v.parse::<Decimal>()
            .with_context(|| format!("Invalid decimal '{}' for setting {}", v, key))
    };
    match key.trim() {
        "sgk_rate" => settings.sgk_rate = parse(value)?,
        "unemployment_rate" => settings.unemployment_rate = parse(value)?,
        "stamp_tax_rate" => settings.stamp_tax_rate = parse(value)?,
        "minimum_wage" => settings.minimum_wage = parse(value)?,
        "daily_work_hours" => settings.daily_work_hours = parse(value)?,
        "overtime_multiplier" => settings.overtime_multiplier = parse(value)?,
        "weekend_multiplier" => settings.weekend_multiplier = parse(value)?,
        "holiday_multiplier" => settings.holiday_multiplier = parse(value)?,
        "tax_brackets" => {
            settings.tax_brackets = serde_json::from_str::<Vec<TaxBracket>>(value)
                .with_context(|| format!("Invalid tax brackets JSON '{}'", value))?
        }
        other => return Err(anyhow!("Unknown setting '{}'", other)),
    }
    Ok(())
}

/// Writes missing setting keys from `Settings::default()`; existing values win.
pub fn seed_default_settings(conn: &Connection) -> Result<usize> {
    let defaults = Settings::default();
    let mut inserted = 0;
    for key in SETTING_KEYS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO settings(key, value) VALUES (?1, ?2)",
            params![key, setting_value(&defaults, key)?],
        )?;
    }
    Ok(inserted)
}

/// Loads the effective settings. A missing key is an error rather than a
/// silent default, so an uninitialized database cannot produce payrolls.
pub fn load_settings(conn: &Connection) -> Result<Settings> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut map = HashMap::new();
    for row in rows {
        let (k, v) = row?;
        map.insert(k, v);
    }

    let mut settings = Settings::default();
    for key in SETTING_KEYS {
        let value = map.get(key).ok_or_else(|| {
            PayrollError::invalid(format!(
                "setting '{}' is missing; run `payslip init` first",
                key
            ))
        })?;
        apply_setting(&mut settings, key, value)?;
    }
    Ok(settings)
}

/// Validates the whole settings value, then stores every key in one go.
pub fn save_settings(conn: &Connection, settings: &Settings) -> Result<()> {
    settings.validate()?;
    for key in SETTING_KEYS {
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, setting_value(settings, key)?],
        )?;
    }
    Ok(())
}

// Employees

fn employee_from_row(r: &Row<'_>) -> rusqlite::Result<Employee> {
    let status: String = r.get(4)?;
    Ok(Employee {
        id: r.get(0)?,
        name: r.get(1)?,
        monthly_salary: dec_col(r, 2)?,
        department_id: r.get(3)?,
        status: status
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
    })
}

pub fn load_employee(conn: &Connection, id: i64) -> Result<Option<Employee>> {
    Ok(conn
        .query_row(
            "SELECT id, name, monthly_salary, department_id, status FROM employees WHERE id=?1",
            params![id],
            employee_from_row,
        )
        .optional()?)
}

pub fn list_employees(conn: &Connection, active_only: bool) -> Result<Vec<Employee>> {
    let sql = if active_only {
        "SELECT id, name, monthly_salary, department_id, status FROM employees
         WHERE status='active' ORDER BY id"
    } else {
        "SELECT id, name, monthly_salary, department_id, status FROM employees ORDER BY id"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], employee_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// Timesheets

pub fn load_timesheet(
    conn: &Connection,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<Option<Timesheet>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT days FROM timesheets WHERE employee_id=?1 AND year=?2 AND month=?3",
            params![employee_id, year, month],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => {
            let days = serde_json::from_str(&s).with_context(|| {
                format!(
                    "Invalid timesheet days for employee {} {}-{:02}",
                    employee_id, year, month
                )
            })?;
            Ok(Some(Timesheet {
                employee_id,
                year,
                month,
                days,
            }))
        }
        None => Ok(None),
    }
}

pub fn save_timesheet(conn: &Connection, ts: &Timesheet) -> Result<()> {
    conn.execute(
        "INSERT INTO timesheets(employee_id, year, month, days) VALUES (?1,?2,?3,?4)
         ON CONFLICT(employee_id, year, month) DO UPDATE SET days=excluded.days",
        params![ts.employee_id, ts.year, ts.month, serde_json::to_string(&ts.days)?],
    )?;
    Ok(())
}

/// Every stored timesheet, raw, for consistency checks.
pub fn all_timesheets(conn: &Connection) -> Result<Vec<(i64, i32, u32, String)>> {
    let mut stmt = conn.prepare(
        "SELECT employee_id, year, month, days FROM timesheets
         ORDER BY employee_id, year, month",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i32>(1)?,
            r.get::<_, u32>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// Payrolls

const PAYROLL_COLS: &str = "employee_id, year, month, worked_days, overtime_days, days_in_month, \
     daily_salary, gross_salary, sgk_employee, unemployment, income_tax, stamp_tax, \
     total_deductions, net_salary, approved, approved_at, approved_by";

fn payroll_from_row(r: &Row<'_>) -> rusqlite::Result<Payroll> {
    Ok(Payroll {
        employee_id: r.get(0)?,
        year: r.get(1)?,
        month: r.get(2)?,
        worked_days: r.get(3)?,
        overtime_days: r.get(4)?,
        days_in_month: r.get(5)?,
        daily_salary: dec_col(r, 6)?,
        gross_salary: dec_col(r, 7)?,
        sgk_employee: dec_col(r, 8)?,
        unemployment: dec_col(r, 9)?,
        income_tax: dec_col(r, 10)?,
        stamp_tax: dec_col(r, 11)?,
        total_deductions: dec_col(r, 12)?,
        net_salary: dec_col(r, 13)?,
        approved: r.get(14)?,
        approved_at: r.get(15)?,
        approved_by: r.get(16)?,
    })
}

pub fn load_payroll(
    conn: &Connection,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<Option<Payroll>> {
    let sql = format!(
        "SELECT {} FROM payrolls WHERE employee_id=?1 AND year=?2 AND month=?3",
        PAYROLL_COLS
    );
    Ok(conn
        .query_row(&sql, params![employee_id, year, month], payroll_from_row)
        .optional()?)
}

pub fn payrolls_for_month(conn: &Connection, year: i32, month: u32) -> Result<Vec<Payroll>> {
    let sql = format!(
        "SELECT {} FROM payrolls WHERE year=?1 AND month=?2 ORDER BY employee_id",
        PAYROLL_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![year, month], payroll_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Snapshot of earlier months of `year` for every employee, ascending by month.
pub fn prior_summaries(
    conn: &Connection,
    year: i32,
    before_month: u32,
) -> Result<Vec<PayrollSummary>> {
    let mut stmt = conn.prepare(
        "SELECT employee_id, year, month, gross_salary, sgk_employee, unemployment
         FROM payrolls WHERE year=?1 AND month<?2 ORDER BY employee_id, month",
    )?;
    let rows = stmt.query_map(params![year, before_month], |r| {
        Ok(PayrollSummary {
            employee_id: r.get(0)?,
            year: r.get(1)?,
            month: r.get(2)?,
            gross_salary: dec_col(r, 3)?,
            sgk_employee: dec_col(r, 4)?,
            unemployment: dec_col(r, 5)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Inserts or overwrites the figures of a payroll, stamping `computed_at`.
pub fn save_payroll(conn: &Connection, p: &Payroll, computed_at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO payrolls(employee_id, year, month, worked_days, overtime_days, days_in_month,
            daily_salary, gross_salary, sgk_employee, unemployment, income_tax, stamp_tax,
            total_deductions, net_salary, approved, approved_at, approved_by, computed_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)
         ON CONFLICT(employee_id, year, month) DO UPDATE SET
            worked_days=excluded.worked_days,
            overtime_days=excluded.overtime_days,
            days_in_month=excluded.days_in_month,
            daily_salary=excluded.daily_salary,
            gross_salary=excluded.gross_salary,
            sgk_employee=excluded.sgk_employee,
            unemployment=excluded.unemployment,
            income_tax=excluded.income_tax,
            stamp_tax=excluded.stamp_tax,
            total_deductions=excluded.total_deductions,
            net_salary=excluded.net_salary,
            approved=excluded.approved,
            approved_at=excluded.approved_at,
            approved_by=excluded.approved_by,
            computed_at=excluded.computed_at",
        params![
            p.employee_id,
            p.year,
            p.month,
            p.worked_days,
            p.overtime_days,
            p.days_in_month,
            p.daily_salary.to_string(),
            p.gross_salary.to_string(),
            p.sgk_employee.to_string(),
            p.unemployment.to_string(),
            p.income_tax.to_string(),
            p.stamp_tax.to_string(),
            p.total_deductions.to_string(),
            p.net_salary.to_string(),
            p.approved,
            p.approved_at,
            p.approved_by,
            computed_at,
        ],
    )?;
    Ok(())
}

/// Updates only the approval columns; figures and `computed_at` stay as they are.
pub fn save_approval(conn: &Connection, p: &Payroll) -> Result<()> {
    let n = conn.execute(
        "UPDATE payrolls SET approved=?1, approved_at=?2, approved_by=?3
         WHERE employee_id=?4 AND year=?5 AND month=?6",
        params![p.approved, p.approved_at, p.approved_by, p.employee_id, p.year, p.month],
    )?;
    if n == 0 {
        return Err(anyhow!(
            "No payroll for employee {} {}-{:02}",
            p.employee_id,
            p.year,
            p.month
        ));
    }
    Ok(())
}

pub fn delete_payroll(conn: &Connection, employee_id: i64, year: i32, month: u32) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM payrolls WHERE employee_id=?1 AND year=?2 AND month=?3",
        params![employee_id, year, month],
    )?;
    Ok(n > 0)
}

/// Months of `year` after `month` that already have a payroll for `employee_id`.
pub fn later_payroll_months(
    conn: &Connection,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<Vec<u32>> {
    let mut stmt = conn.prepare(
        "SELECT month FROM payrolls WHERE employee_id=?1 AND year=?2 AND month>?3 ORDER BY month",
    )?;
    let rows = stmt.query_map(params![employee_id, year, month], |r| r.get::<_, u32>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// `(employee_id, year, month, computed_at)` for every payroll, ordered by period.
pub fn payroll_computation_times(
    conn: &Connection,
) -> Result<Vec<(i64, i32, u32, DateTime<Utc>)>> {
    let mut stmt = conn.prepare(
        "SELECT employee_id, year, month, computed_at FROM payrolls
         ORDER BY employee_id, year, month",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i32>(1)?,
            r.get::<_, u32>(2)?,
            r.get::<_, DateTime<Utc>>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
