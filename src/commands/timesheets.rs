// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{aggregate, days_in_month};
use crate::error::PayrollError;
use crate::models::{DayEntry, DayStatus, Timesheet};
use crate::store::{load_timesheet, save_timesheet};
use crate::utils::{id_for_employee, maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set_day(conn, sub)?,
        Some(("clear", sub)) => clear_day(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn check_day(year: i32, month: u32, day: u32) -> Result<()> {
    let dim = days_in_month(year, month)?;
    if day == 0 || day > dim {
        return Err(PayrollError::invalid(format!(
            "day {} is outside {}-{:02} (1..={})",
            day, year, month, dim
        ))
        .into());
    }
    Ok(())
}

fn set_day(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("employee").unwrap();
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let day = *sub.get_one::<u32>("day").unwrap();
    let status: DayStatus = sub.get_one::<String>("status").unwrap().parse()?;
    let hours = sub
        .get_one::<String>("hours")
        .map(|h| parse_decimal(h))
        .transpose()?;
    let weekend = sub.get_flag("weekend");
    let holiday = sub.get_flag("holiday");
    check_day(year, month, day)?;

    let entry = if status == DayStatus::Overtime {
        let hours = hours.unwrap_or(Decimal::ZERO);
        if hours < Decimal::ZERO {
            return Err(PayrollError::invalid(format!(
                "overtime hours must not be negative (got {})",
                hours
            ))
            .into());
        }
        DayEntry::overtime(hours, weekend, holiday)
    } else {
        if hours.is_some() || weekend || holiday {
            return Err(anyhow!(
                "--hours/--weekend/--holiday only apply to the overtime status"
            ));
        }
        DayEntry::Simple(status)
    };

    let employee_id = id_for_employee(conn, name)?;
    let mut ts = load_timesheet(conn, employee_id, year, month)?.unwrap_or(Timesheet {
        employee_id,
        year,
        month,
        days: Default::default(),
    });
    ts.days.insert(day, entry);
    save_timesheet(conn, &ts)?;
    tracing::info!(employee_id, year, month, day, %status, "timesheet day set");
    println!("{} {}-{:02}-{:02}: {}", name.trim(), year, month, day, status);
    Ok(())
}

fn clear_day(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("employee").unwrap();
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let day = *sub.get_one::<u32>("day").unwrap();
    let employee_id = id_for_employee(conn, name)?;
    let mut ts = load_timesheet(conn, employee_id, year, month)?;
    let removed = ts.as_mut().and_then(|t| t.days.remove(&day));
    match (ts, removed) {
        (Some(ts), Some(_)) => {
            save_timesheet(conn, &ts)?;
            println!("Cleared {}-{:02}-{:02} for {}", year, month, day, name.trim());
        }
        _ => println!(
            "Nothing recorded on {}-{:02}-{:02} for {}",
            year,
            month,
            day,
            name.trim()
        ),
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimesheetView {
    timesheet: Timesheet,
    days_in_month: u32,
    paid_days: u32,
    unpaid_days: u32,
    counts: crate::engine::DayCounts,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("employee").unwrap();
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let employee_id = id_for_employee(conn, name)?;
    let ts = load_timesheet(conn, employee_id, year, month)?.unwrap_or(Timesheet {
        employee_id,
        year,
        month,
        days: Default::default(),
    });
    let dim = days_in_month(year, month)?;
    let counts = aggregate(&ts.days, dim)?;
    let view = TimesheetView {
        paid_days: counts.paid_days(),
        unpaid_days: counts.unpaid_days(),
        days_in_month: dim,
        counts,
        timesheet: ts,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }

    let rows = view
        .timesheet
        .days
        .iter()
        .map(|(day, entry)| {
            let detail = match entry {
                DayEntry::Detailed {
                    status: DayStatus::Overtime,
                    hours,
                    is_weekend,
                    is_holiday,
                } => {
                    let kind = if *is_holiday {
                        "holiday"
                    } else if *is_weekend {
                        "weekend"
                    } else {
                        "weekday"
                    };
                    format!("{}h {}", hours.unwrap_or(Decimal::ZERO), kind)
                }
                _ => String::new(),
            };
            vec![day.to_string(), entry.status().to_string(), detail]
        })
        .collect();
    println!("{}", pretty_table(&["Day", "Status", "Overtime"], rows));

    let c = &view.counts;
    println!(
        "{}",
        pretty_table(
            &[
                "Worked",
                "Overtime days",
                "Paid leave",
                "Weekend",
                "Holiday",
                "Unpaid",
                "Sick",
                "Not worked",
            ],
            vec![vec![
                c.worked.to_string(),
                c.overtime_days.to_string(),
                c.paid_leave.to_string(),
                c.weekend.to_string(),
                c.public_holiday.to_string(),
                c.unpaid_leave.to_string(),
                c.sick_leave.to_string(),
                c.not_worked.to_string(),
            ]],
        )
    );
    println!(
        "Paid days: {} / {}   Overtime hours: {} weekday, {} weekend, {} holiday",
        view.paid_days,
        view.days_in_month,
        c.weekday_overtime_hours,
        c.weekend_overtime_hours,
        c.holiday_overtime_hours
    );
    Ok(())
}
