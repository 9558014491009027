// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};

use crate::engine::{aggregate, days_in_month};
use crate::models::{DayEntry, EmployeeStatus};
use crate::store::{all_timesheets, list_employees, load_settings, payroll_computation_times};
use crate::utils::{fmt_period, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

/// Collects `(issue, detail)` pairs; empty means healthy.
pub fn diagnose(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    // 1) Settings
    match load_settings(conn) {
        Ok(settings) => {
            if let Err(e) = settings.validate() {
                issues.push(("invalid_settings".into(), e.to_string()));
            }
        }
        Err(e) => issues.push(("missing_settings".into(), format!("{:#}", e))),
    }

    // 2) Timesheets that would not compute
    let employees = list_employees(conn, false)?;
    let names: HashMap<i64, String> = employees.iter().map(|e| (e.id, e.name.clone())).collect();
    let who = |id: i64| names.get(&id).cloned().unwrap_or_else(|| format!("#{}", id));
    for (employee_id, year, month, raw) in all_timesheets(conn)? {
        let label = format!("{} {}", who(employee_id), fmt_period(year, month));
        let days: BTreeMap<u32, DayEntry> = match serde_json::from_str(&raw) {
            Ok(d) => d,
            Err(e) => {
                issues.push(("unreadable_timesheet".into(), format!("{}: {}", label, e)));
                continue;
            }
        };
        let checked = days_in_month(year, month).and_then(|dim| aggregate(&days, dim));
        if let Err(e) = checked {
            issues.push(("bad_timesheet".into(), format!("{}: {}", label, e)));
        }
    }

    // 3) Payrolls of inactive employees, and later months computed before earlier ones
    let times = payroll_computation_times(conn)?;
    for e in employees.iter().filter(|e| e.status == EmployeeStatus::Inactive) {
        let months: Vec<String> = times
            .iter()
            .filter(|(id, ..)| *id == e.id)
            .map(|(_, y, m, _)| fmt_period(*y, *m))
            .collect();
        if !months.is_empty() {
            issues.push((
                "inactive_with_payrolls".into(),
                format!("{}: {}", e.name, months.join(", ")),
            ));
        }
    }

    let mut by_year: BTreeMap<(i64, i32), Vec<(u32, chrono::DateTime<chrono::Utc>)>> =
        BTreeMap::new();
    for (id, y, m, at) in times {
        by_year.entry((id, y)).or_default().push((m, at));
    }
    for ((id, year), mut months) in by_year {
        months.sort_by_key(|(m, _)| *m);
        let mut newest_earlier: Option<(u32, chrono::DateTime<chrono::Utc>)> = None;
        for (m, at) in months {
            if let Some((em, eat)) = newest_earlier {
                if at < eat {
                    issues.push((
                        "stale_payroll".into(),
                        format!(
                            "{} {} was computed before {} changed",
                            who(id),
                            fmt_period(year, m),
                            fmt_period(year, em)
                        ),
                    ));
                }
            }
            if newest_earlier.is_none_or(|(_, eat)| at > eat) {
                newest_earlier = Some((m, at));
            }
        }
    }

    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
