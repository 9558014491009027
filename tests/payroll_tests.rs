// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use payslip::commands::{employees, payroll, timesheets};
use payslip::engine::days_in_month;
use payslip::models::{DayEntry, DayStatus, Timesheet};
use payslip::{cli, db, store, utils};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::seed_default_settings(&conn).unwrap();
    conn
}

fn run_employee(conn: &Connection, args: &[&str]) {
    let mut argv = vec!["payslip", "employee"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    employees::handle(conn, sub).unwrap();
}

fn add_employee(conn: &Connection, name: &str, salary: &str) -> i64 {
    run_employee(conn, &["add", "--name", name, "--salary", salary]);
    utils::id_for_employee(conn, name).unwrap()
}

fn work_full_month(conn: &Connection, employee_id: i64, year: i32, month: u32) {
    let dim = days_in_month(year, month).unwrap();
    let days = (1..=dim)
        .map(|d| (d, DayEntry::Simple(DayStatus::Worked)))
        .collect();
    store::save_timesheet(
        conn,
        &Timesheet {
            employee_id,
            year,
            month,
            days,
        },
    )
    .unwrap();
}

#[test]
fn full_month_applies_deductions_and_exemption() {
    let mut conn = setup();
    let id = add_employee(&conn, "Ayse", "40000");
    work_full_month(&conn, id, 2025, 1);

    let saved = payroll::generate_month(&mut conn, 2025, 1, Some("Ayse")).unwrap();
    assert_eq!(saved.len(), 1);

    let p = store::load_payroll(&conn, id, 2025, 1).unwrap().unwrap();
    assert_eq!(p.worked_days, 31);
    assert_eq!(p.days_in_month, 31);
    assert_eq!(p.gross_salary, dec!(40000));
    assert_eq!(p.sgk_employee, dec!(5600));
    assert_eq!(p.unemployment, dec!(400));
    assert_eq!(p.income_tax, dec!(2549.68125));
    assert_eq!(p.stamp_tax, dec!(151.781025));
    assert_eq!(p.total_deductions, dec!(8701.462275));
    assert_eq!(p.net_salary, dec!(31298.537725));
    assert!(!p.approved);
}

#[test]
fn second_month_taxes_on_top_of_first() {
    let mut conn = setup();
    let id = add_employee(&conn, "Mehmet", "100000");
    work_full_month(&conn, id, 2025, 1);
    work_full_month(&conn, id, 2025, 2);

    payroll::generate_month(&mut conn, 2025, 1, None).unwrap();
    payroll::generate_month(&mut conn, 2025, 2, None).unwrap();

    let jan = store::load_payroll(&conn, id, 2025, 1).unwrap().unwrap();
    let feb = store::load_payroll(&conn, id, 2025, 2).unwrap().unwrap();
    // 85000 at 15% less the exemption
    assert_eq!(jan.income_tax, dec!(10199.68125));
    // 25000 at 15% plus 60000 at 20% less the exemption
    assert_eq!(feb.income_tax, dec!(13199.68125));
    assert_eq!(jan.stamp_tax, feb.stamp_tax);
    assert!(feb.net_salary < jan.net_salary);
}

#[test]
fn minimum_wage_pays_no_income_or_stamp_tax() {
    let mut conn = setup();
    let id = add_employee(&conn, "Zeynep", "20002.50");
    work_full_month(&conn, id, 2025, 3);

    payroll::generate_month(&mut conn, 2025, 3, None).unwrap();
    let p = store::load_payroll(&conn, id, 2025, 3).unwrap().unwrap();
    assert_eq!(p.income_tax, dec!(0));
    assert_eq!(p.stamp_tax, dec!(0));
    assert_eq!(p.net_salary, dec!(20002.50) * dec!(0.85));
}

#[test]
fn generate_via_cli_and_overtime_buckets() {
    let mut conn = setup();
    add_employee(&conn, "Can", "24000");

    // June 2025 has 30 days: daily 800, hourly 100
    for (day, extra) in [
        ("2", vec!["--status", "worked"]),
        ("3", vec!["--status", "overtime", "--hours", "2"]),
        ("7", vec!["--status", "overtime", "--hours", "4", "--weekend"]),
        ("8", vec!["--status", "overtime", "--hours", "3", "--weekend", "--holiday"]),
    ] {
        let mut argv = vec![
            "payslip", "timesheet", "set", "--employee", "Can", "--month", "2025-06", "--day", day,
        ];
        argv.extend(extra);
        let matches = cli::build_cli().get_matches_from(argv);
        let (_, sub) = matches.subcommand().unwrap();
        timesheets::handle(&conn, sub).unwrap();
    }

    let matches =
        cli::build_cli().get_matches_from(["payslip", "payroll", "generate", "--month", "2025-06"]);
    let (_, sub) = matches.subcommand().unwrap();
    payroll::handle(&mut conn, sub).unwrap();

    let id = utils::id_for_employee(&conn, "Can").unwrap();
    let p = store::load_payroll(&conn, id, 2025, 6).unwrap().unwrap();
    assert_eq!(p.worked_days, 4);
    assert_eq!(p.overtime_days, 3);
    // 4 * 800 base, 2h*1.5, 4h*2.0 and 3h*2.0 at 100 an hour
    assert_eq!(p.gross_salary, dec!(4900));
}

#[test]
fn bulk_run_skips_idle_and_inactive_employees() {
    let mut conn = setup();
    let busy = add_employee(&conn, "Busy", "30000");
    let idle = add_employee(&conn, "Idle", "30000");
    let gone = add_employee(&conn, "Gone", "30000");
    work_full_month(&conn, busy, 2025, 4);
    work_full_month(&conn, gone, 2025, 4);
    run_employee(&conn, &["set-status", "--name", "Gone", "--status", "inactive"]);

    let saved = payroll::generate_month(&mut conn, 2025, 4, None).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].employee_id, busy);
    assert!(store::load_payroll(&conn, idle, 2025, 4).unwrap().is_none());
    assert!(store::load_payroll(&conn, gone, 2025, 4).unwrap().is_none());

    // an explicit run still records a zero payroll
    payroll::generate_month(&mut conn, 2025, 4, Some("Idle")).unwrap();
    let p = store::load_payroll(&conn, idle, 2025, 4).unwrap().unwrap();
    assert_eq!(p.gross_salary, dec!(0));
    assert_eq!(p.net_salary, dec!(0));
}

#[test]
fn regeneration_keeps_approval() {
    let mut conn = setup();
    let id = add_employee(&conn, "Elif", "40000");
    work_full_month(&conn, id, 2025, 5);
    payroll::generate_month(&mut conn, 2025, 5, None).unwrap();

    let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let approved = payroll::approve(&conn, id, 2025, 5, "hr", at).unwrap();
    assert!(approved.approved);

    run_employee(&conn, &["set-salary", "--name", "Elif", "--salary", "50000"]);
    payroll::generate_month(&mut conn, 2025, 5, None).unwrap();

    let p = store::load_payroll(&conn, id, 2025, 5).unwrap().unwrap();
    assert_eq!(p.gross_salary, dec!(50000));
    assert!(p.approved);
    assert_eq!(p.approved_by.as_deref(), Some("hr"));
    assert_eq!(p.approved_at, Some(at));

    // approving twice keeps the first approver
    let later = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
    let again = payroll::approve(&conn, id, 2025, 5, "boss", later).unwrap();
    assert_eq!(again.approved_by.as_deref(), Some("hr"));

    let cleared = payroll::unapprove(&conn, id, 2025, 5).unwrap();
    assert!(!cleared.approved);
    let p = store::load_payroll(&conn, id, 2025, 5).unwrap().unwrap();
    assert!(!p.approved);
    assert!(p.approved_at.is_none());
    assert!(p.approved_by.is_none());
}

#[test]
fn approving_a_missing_payroll_fails() {
    let conn = setup();
    let id = add_employee(&conn, "Nobody", "30000");
    let at = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
    let err = payroll::approve(&conn, id, 2025, 1, "hr", at).unwrap_err();
    assert!(err.to_string().contains("generate it first"));
}

#[test]
fn generation_requires_settings() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let id = add_employee(&conn, "Early", "30000");
    work_full_month(&conn, id, 2025, 1);

    let err = payroll::generate_month(&mut conn, 2025, 1, None).unwrap_err();
    assert!(format!("{:#}", err).contains("payslip init"));
    assert!(store::load_payroll(&conn, id, 2025, 1).unwrap().is_none());
}

#[test]
fn unknown_employee_is_an_error() {
    let mut conn = setup();
    let err = payroll::generate_month(&mut conn, 2025, 1, Some("Ghost")).unwrap_err();
    assert!(err.to_string().contains("Ghost"));
}

#[test]
fn rm_deletes_the_payroll() {
    let mut conn = setup();
    let id = add_employee(&conn, "Temp", "30000");
    work_full_month(&conn, id, 2025, 2);
    payroll::generate_month(&mut conn, 2025, 2, None).unwrap();

    let matches = cli::build_cli().get_matches_from([
        "payslip", "payroll", "rm", "--employee", "Temp", "--month", "2025-02",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    payroll::handle(&mut conn, sub).unwrap();
    assert!(store::load_payroll(&conn, id, 2025, 2).unwrap().is_none());
}
