// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use crate::commands::payroll::employee_names;
use crate::store::payrolls_for_month;
use crate::utils::parse_month;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("payrolls", sub)) => {
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
            let n = export_payrolls(conn, year, month, &fmt, Path::new(out))?;
            println!("Exported {} payroll(s) to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes the month's payrolls to `out` as csv or json. Amounts keep full
/// precision.
pub fn export_payrolls(
    conn: &Connection,
    year: i32,
    month: u32,
    fmt: &str,
    out: &Path,
) -> Result<usize> {
    let payrolls = payrolls_for_month(conn, year, month)?;
    let names = employee_names(conn)?;
    let name_of = |id: i64| names.get(&id).cloned().unwrap_or_default();

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "employee",
                "year",
                "month",
                "worked_days",
                "overtime_days",
                "days_in_month",
                "daily_salary",
                "gross_salary",
                "sgk_employee",
                "unemployment",
                "income_tax",
                "stamp_tax",
                "total_deductions",
                "net_salary",
                "approved",
                "approved_at",
                "approved_by",
            ])?;
            for p in &payrolls {
                wtr.write_record([
                    name_of(p.employee_id),
                    p.year.to_string(),
                    p.month.to_string(),
                    p.worked_days.to_string(),
                    p.overtime_days.to_string(),
                    p.days_in_month.to_string(),
                    p.daily_salary.to_string(),
                    p.gross_salary.to_string(),
                    p.sgk_employee.to_string(),
                    p.unemployment.to_string(),
                    p.income_tax.to_string(),
                    p.stamp_tax.to_string(),
                    p.total_deductions.to_string(),
                    p.net_salary.to_string(),
                    p.approved.to_string(),
                    p.approved_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    p.approved_by.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for p in &payrolls {
                let mut v = serde_json::to_value(p)?;
                v["employee"] = json!(name_of(p.employee_id));
                items.push(v);
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(year, month, count = payrolls.len(), format = fmt, "payrolls exported");
    Ok(payrolls.len())
}
