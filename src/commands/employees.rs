// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::PayrollError;
use crate::models::EmployeeStatus;
use crate::store::list_employees;
use crate::utils::{fmt_money, id_for_employee, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let salary = positive_salary(sub.get_one::<String>("salary").unwrap())?;
            let dept = sub.get_one::<i64>("department").copied();
            conn.execute(
                "INSERT INTO employees(name, monthly_salary, department_id, status)
                 VALUES (?1, ?2, ?3, 'active')",
                params![name, salary.to_string(), dept],
            )?;
            println!("Added employee '{}' ({} / month)", name, fmt_money(&salary));
        }
        Some(("list", sub)) => {
            let employees = list_employees(conn, false)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &employees)? {
                let rows = employees
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.to_string(),
                            e.name.clone(),
                            fmt_money(&e.monthly_salary),
                            e.department_id.map(|d| d.to_string()).unwrap_or_default(),
                            e.status.as_str().to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Monthly Salary", "Department", "Status"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_employee(conn, name)?;
            conn.execute("DELETE FROM employees WHERE id=?1", params![id])?;
            println!("Removed employee '{}'", name.trim());
        }
        Some(("set-salary", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let salary = positive_salary(sub.get_one::<String>("salary").unwrap())?;
            let id = id_for_employee(conn, name)?;
            conn.execute(
                "UPDATE employees SET monthly_salary=?1 WHERE id=?2",
                params![salary.to_string(), id],
            )?;
            println!("Salary of '{}' set to {}", name.trim(), fmt_money(&salary));
        }
        Some(("set-status", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let status: EmployeeStatus = sub.get_one::<String>("status").unwrap().parse()?;
            let id = id_for_employee(conn, name)?;
            conn.execute(
                "UPDATE employees SET status=?1 WHERE id=?2",
                params![status.as_str(), id],
            )?;
            println!("Employee '{}' is now {}", name.trim(), status.as_str());
        }
        _ => {}
    }
    Ok(())
}

fn positive_salary(raw: &str) -> Result<Decimal> {
    let salary = parse_decimal(raw)?;
    if salary <= Decimal::ZERO {
        return Err(PayrollError::invalid(format!(
            "monthly salary must be positive (got {})",
            salary
        ))
        .into());
    }
    Ok(salary)
}
