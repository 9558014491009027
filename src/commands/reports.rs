// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::payroll::employee_names;
use crate::store::{list_employees, payrolls_for_month};
use crate::utils::{fmt_money, fmt_period, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub payrolls: usize,
    pub approved: usize,
    pub active_employees: usize,
    pub total_gross: Decimal,
    pub total_sgk: Decimal,
    pub total_unemployment: Decimal,
    pub total_income_tax: Decimal,
    pub total_stamp_tax: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
}

/// Sums the stored payrolls of one month.
pub fn monthly_report(conn: &Connection, year: i32, month: u32) -> Result<MonthlyReport> {
    let payrolls = payrolls_for_month(conn, year, month)?;
    let active_employees = list_employees(conn, true)?.len();
    let mut report = MonthlyReport {
        year,
        month,
        payrolls: payrolls.len(),
        approved: 0,
        active_employees,
        total_gross: Decimal::ZERO,
        total_sgk: Decimal::ZERO,
        total_unemployment: Decimal::ZERO,
        total_income_tax: Decimal::ZERO,
        total_stamp_tax: Decimal::ZERO,
        total_deductions: Decimal::ZERO,
        total_net: Decimal::ZERO,
    };
    for p in &payrolls {
        if p.approved {
            report.approved += 1;
        }
        report.total_gross += p.gross_salary;
        report.total_sgk += p.sgk_employee;
        report.total_unemployment += p.unemployment;
        report.total_income_tax += p.income_tax;
        report.total_stamp_tax += p.stamp_tax;
        report.total_deductions += p.total_deductions;
        report.total_net += p.net_salary;
    }
    Ok(report)
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = crate::utils::parse_month(sub.get_one::<String>("month").unwrap())?;
    let report = monthly_report(conn, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let names = employee_names(conn)?;
    let rows = payrolls_for_month(conn, year, month)?
        .iter()
        .map(|p| {
            vec![
                names
                    .get(&p.employee_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", p.employee_id)),
                fmt_money(&p.gross_salary),
                fmt_money(&p.total_deductions),
                fmt_money(&p.net_salary),
                if p.approved { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Employee", "Gross", "Deductions", "Net", "Approved"], rows)
    );

    let totals = vec![
        vec!["Gross".into(), fmt_money(&report.total_gross)],
        vec!["SGK".into(), fmt_money(&report.total_sgk)],
        vec!["Unemployment".into(), fmt_money(&report.total_unemployment)],
        vec!["Income tax".into(), fmt_money(&report.total_income_tax)],
        vec!["Stamp tax".into(), fmt_money(&report.total_stamp_tax)],
        vec!["Deductions".into(), fmt_money(&report.total_deductions)],
        vec!["Net".into(), fmt_money(&report.total_net)],
    ];
    let period = fmt_period(year, month);
    println!("{}", pretty_table(&[period.as_str(), "Total"], totals));
    println!(
        "Approved {} of {} payroll(s); {} active employee(s)",
        report.approved, report.payrolls, report.active_employees
    );
    Ok(())
}
