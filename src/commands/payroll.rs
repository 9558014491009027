// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::engine::{PayrollBreakdown, PayrollInput, compute_payroll};
use crate::error::require;
use crate::models::{Employee, Payroll, PayrollState, PayrollSummary, Settings};
use crate::store::{
    delete_payroll, later_payroll_months, list_employees, load_employee, load_payroll,
    load_settings, load_timesheet, payrolls_for_month, prior_summaries, save_approval,
    save_payroll,
};
use crate::utils::{
    fmt_money, fmt_period, id_for_employee, maybe_print_json, parse_month, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("generate", sub)) => generate(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("approve", sub)) => {
            let (employee_id, year, month) = target(conn, sub)?;
            let by = sub.get_one::<String>("by").unwrap().trim();
            let p = approve(conn, employee_id, year, month, by, Utc::now())?;
            println!(
                "Approved payroll {} for {} by {}",
                fmt_period(year, month),
                sub.get_one::<String>("employee").unwrap().trim(),
                p.approved_by.as_deref().unwrap_or(by)
            );
        }
        Some(("unapprove", sub)) => {
            let (employee_id, year, month) = target(conn, sub)?;
            unapprove(conn, employee_id, year, month)?;
            println!(
                "Approval removed from payroll {} for {}",
                fmt_period(year, month),
                sub.get_one::<String>("employee").unwrap().trim()
            );
        }
        Some(("rm", sub)) => {
            let (employee_id, year, month) = target(conn, sub)?;
            let name = sub.get_one::<String>("employee").unwrap().trim();
            if delete_payroll(conn, employee_id, year, month)? {
                info!(employee_id, year, month, "payroll deleted");
                println!("Deleted payroll {} for {}", fmt_period(year, month), name);
            } else {
                println!("No payroll {} for {}", fmt_period(year, month), name);
            }
        }
        _ => {}
    }
    Ok(())
}

fn target(conn: &Connection, sub: &clap::ArgMatches) -> Result<(i64, i32, u32)> {
    let employee_id = id_for_employee(conn, sub.get_one::<String>("employee").unwrap())?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    Ok((employee_id, year, month))
}

/// Computes one employee's payroll against the given settings and prior
/// snapshot and upserts it. With `skip_idle`, employees who worked no day
/// get no record at all.
#[allow(clippy::too_many_arguments)]
pub fn generate_for_employee(
    conn: &Connection,
    employee: &Employee,
    year: i32,
    month: u32,
    settings: &Settings,
    prior: &[PayrollSummary],
    skip_idle: bool,
    now: DateTime<Utc>,
) -> Result<Option<Payroll>> {
    let timesheet = load_timesheet(conn, employee.id, year, month)?;
    let breakdown = compute_payroll(&PayrollInput {
        employee,
        year,
        month,
        timesheet: timesheet.as_ref(),
        settings,
        prior,
    })
    .with_context(|| format!("Payroll for '{}' {}", employee.name, fmt_period(year, month)))?;

    if skip_idle && breakdown.counts.worked == 0 {
        info!(employee_id = employee.id, year, month, "no worked days, payroll skipped");
        return Ok(None);
    }

    let existing = load_payroll(conn, employee.id, year, month)?;
    if existing.as_ref().is_some_and(|p| p.approved) {
        warn!(
            employee_id = employee.id,
            year, month, "recomputing an approved payroll; approval is kept"
        );
    }
    let later = later_payroll_months(conn, employee.id, year, month)?;
    if !later.is_empty() {
        warn!(
            employee_id = employee.id,
            year,
            month,
            ?later,
            "later months were already computed and still use the old cumulative income"
        );
    }

    let payroll = breakdown.to_payroll(existing.as_ref());
    save_payroll(conn, &payroll, now)?;
    info!(
        employee_id = employee.id,
        year,
        month,
        gross = %payroll.gross_salary,
        net = %payroll.net_salary,
        "payroll saved"
    );
    Ok(Some(payroll))
}

/// Generates a month in one transaction, reading settings and prior payrolls
/// once so the whole batch sees the same snapshot.
pub fn generate_month(
    conn: &mut Connection,
    year: i32,
    month: u32,
    employee: Option<&str>,
) -> Result<Vec<Payroll>> {
    let tx = conn.transaction()?;
    let settings = load_settings(&tx)?;
    settings.validate()?;
    let prior = prior_summaries(&tx, year, month)?;
    let employees = match employee {
        Some(name) => {
            let id = id_for_employee(&tx, name)?;
            vec![require(load_employee(&tx, id)?, "employee")?]
        }
        None => list_employees(&tx, true)?,
    };

    let now = Utc::now();
    let mut saved = Vec::new();
    let skip_idle = employee.is_none();
    for emp in &employees {
        if let Some(p) =
            generate_for_employee(&tx, emp, year, month, &settings, &prior, skip_idle, now)?
        {
            saved.push(p);
        }
    }
    tx.commit()?;
    Ok(saved)
}

fn generate(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let employee = sub.get_one::<String>("employee").map(|s| s.trim());
    let saved = generate_month(conn, year, month, employee)?;
    let names = employee_names(conn)?;
    let rows = saved.iter().map(|p| payroll_row(p, &names)).collect();
    println!("{}", pretty_table(&PAYROLL_HEADERS, rows));
    println!("Generated {} payroll(s) for {}", saved.len(), fmt_period(year, month));
    Ok(())
}

pub fn approve(
    conn: &Connection,
    employee_id: i64,
    year: i32,
    month: u32,
    by: &str,
    at: DateTime<Utc>,
) -> Result<Payroll> {
    let mut p = load_payroll(conn, employee_id, year, month)?.ok_or_else(|| {
        anyhow!(
            "No payroll {} for employee {}; generate it first",
            fmt_period(year, month),
            employee_id
        )
    })?;
    if p.state() == PayrollState::Approved {
        info!(employee_id, year, month, "payroll already approved");
        return Ok(p);
    }
    p.approve(by, at);
    save_approval(conn, &p)?;
    info!(employee_id, year, month, by, "payroll approved");
    Ok(p)
}

pub fn unapprove(conn: &Connection, employee_id: i64, year: i32, month: u32) -> Result<Payroll> {
    let mut p = load_payroll(conn, employee_id, year, month)?.ok_or_else(|| {
        anyhow!(
            "No payroll {} for employee {}",
            fmt_period(year, month),
            employee_id
        )
    })?;
    p.unapprove();
    save_approval(conn, &p)?;
    info!(employee_id, year, month, "payroll approval removed");
    Ok(p)
}

pub fn employee_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    Ok(list_employees(conn, false)?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect())
}

const PAYROLL_HEADERS: [&str; 11] = [
    "Employee",
    "Worked",
    "Overtime",
    "Gross",
    "SGK",
    "Unemployment",
    "Income Tax",
    "Stamp Tax",
    "Deductions",
    "Net",
    "Status",
];

fn payroll_row(p: &Payroll, names: &HashMap<i64, String>) -> Vec<String> {
    vec![
        names
            .get(&p.employee_id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", p.employee_id)),
        format!("{}/{}", p.worked_days, p.days_in_month),
        p.overtime_days.to_string(),
        fmt_money(&p.gross_salary),
        fmt_money(&p.sgk_employee),
        fmt_money(&p.unemployment),
        fmt_money(&p.income_tax),
        fmt_money(&p.stamp_tax),
        fmt_money(&p.total_deductions),
        fmt_money(&p.net_salary),
        match p.state() {
            PayrollState::Approved => "approved".into(),
            PayrollState::Pending => "pending".into(),
        },
    ]
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let payrolls = payrolls_for_month(conn, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payrolls)? {
        let names = employee_names(conn)?;
        let rows = payrolls.iter().map(|p| payroll_row(p, &names)).collect();
        println!("{}", pretty_table(&PAYROLL_HEADERS, rows));
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PayrollDetail {
    stored: Option<Payroll>,
    current: PayrollBreakdown,
    up_to_date: bool,
}

/// Recomputes the breakdown from current inputs and shows it next to the
/// stored record, if any.
fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (employee_id, year, month) = target(conn, sub)?;
    let employee = require(load_employee(conn, employee_id)?, "employee")?;
    let settings = load_settings(conn)?;
    let prior = prior_summaries(conn, year, month)?;
    let timesheet = load_timesheet(conn, employee_id, year, month)?;
    let current = compute_payroll(&PayrollInput {
        employee: &employee,
        year,
        month,
        timesheet: timesheet.as_ref(),
        settings: &settings,
        prior: &prior,
    })?;
    let stored = load_payroll(conn, employee_id, year, month)?;
    let up_to_date = stored
        .as_ref()
        .is_some_and(|p| *p == current.to_payroll(Some(p)));
    let detail = PayrollDetail {
        stored,
        current,
        up_to_date,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &detail)? {
        return Ok(());
    }

    let b = &detail.current;
    let c = &b.counts;
    let rows = vec![
        vec!["Paid days".into(), format!("{} / {}", c.paid_days(), b.days_in_month)],
        vec!["Daily salary".into(), fmt_money(&b.daily_salary)],
        vec!["Hourly rate".into(), fmt_money(&b.hourly_rate)],
        vec!["Base salary".into(), fmt_money(&b.base_salary)],
        vec![
            format!("Weekday overtime ({}h)", c.weekday_overtime_hours),
            fmt_money(&b.weekday_overtime_pay),
        ],
        vec![
            format!("Weekend overtime ({}h)", c.weekend_overtime_hours),
            fmt_money(&b.weekend_overtime_pay),
        ],
        vec![
            format!("Holiday overtime ({}h)", c.holiday_overtime_hours),
            fmt_money(&b.holiday_overtime_pay),
        ],
        vec!["Gross salary".into(), fmt_money(&b.gross_salary)],
        vec!["SGK (employee)".into(), fmt_money(&b.sgk_employee)],
        vec!["Unemployment".into(), fmt_money(&b.unemployment)],
        vec!["Income tax base".into(), fmt_money(&b.income_tax_base)],
        vec!["Cumulative income before".into(), fmt_money(&b.previous_cumulative)],
        vec!["Calculated income tax".into(), fmt_money(&b.tax_walk.tax)],
        vec!["Minimum-wage income tax exemption".into(), fmt_money(&b.exemptions.income_tax)],
        vec!["Income tax".into(), fmt_money(&b.income_tax)],
        vec!["Calculated stamp tax".into(), fmt_money(&b.stamp_tax_before_exemption)],
        vec!["Minimum-wage stamp tax exemption".into(), fmt_money(&b.exemptions.stamp_tax)],
        vec!["Stamp tax".into(), fmt_money(&b.stamp_tax)],
        vec!["Total deductions".into(), fmt_money(&b.total_deductions)],
        vec!["Net salary".into(), fmt_money(&b.net_salary)],
    ];
    println!("{}", pretty_table(&["Item", "Amount"], rows));

    let slices = b
        .tax_walk
        .slices
        .iter()
        .map(|s| {
            vec![
                fmt_money(&s.from),
                fmt_money(&s.to),
                s.rate.to_string(),
                fmt_money(&s.tax),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["From", "To", "Rate", "Tax"], slices));

    match &detail.stored {
        None => println!("Not generated yet"),
        Some(p) => {
            let state = match (p.state(), &p.approved_by, &p.approved_at) {
                (PayrollState::Approved, Some(by), Some(at)) => {
                    format!("approved by {} at {}", by, at.format("%Y-%m-%d %H:%M"))
                }
                (PayrollState::Approved, _, _) => "approved".to_string(),
                (PayrollState::Pending, _, _) => "pending".to_string(),
            };
            if detail.up_to_date {
                println!("Stored payroll is {} and matches current inputs", state);
            } else {
                println!(
                    "Stored payroll is {} but differs from current inputs; run `payroll generate`",
                    state
                );
            }
        }
    }
    Ok(())
}
