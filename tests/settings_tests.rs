// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use payslip::commands::settings;
use payslip::models::{Settings, TaxBracket};
use payslip::{cli, db, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::seed_default_settings(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["payslip", "settings"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    settings::handle(conn, sub)
}

#[test]
fn seeded_defaults_round_trip() {
    let conn = setup();
    assert_eq!(store::load_settings(&conn).unwrap(), Settings::default());
    // seeding again leaves existing values alone
    run(&conn, &["set", "--key", "minimum_wage", "--value", "22104.67"]).unwrap();
    assert_eq!(store::seed_default_settings(&conn).unwrap(), 0);
    assert_eq!(
        store::load_settings(&conn).unwrap().minimum_wage,
        dec!(22104.67)
    );
}

#[test]
fn rejects_invalid_values() {
    let conn = setup();
    assert!(run(&conn, &["set", "--key", "sgk_rate", "--value=-0.1"]).is_err());
    assert!(run(&conn, &["set", "--key", "daily_work_hours", "--value", "0"]).is_err());
    assert!(run(&conn, &["set", "--key", "sgk_rate", "--value", "0.995"]).is_err());
    assert!(run(&conn, &["set", "--key", "stamp_tax_rate", "--value", "abc"]).is_err());
    assert_eq!(store::load_settings(&conn).unwrap(), Settings::default());
}

#[test]
fn brackets_file_replaces_the_table() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("brackets.json");
    std::fs::write(
        &path,
        r#"[{"limit": "158000", "rate": "0.15"}, {"limit": 330000, "rate": 0.2}, {"limit": null, "rate": "0.4"}]"#,
    )
    .unwrap();
    let p = path.to_string_lossy().to_string();
    run(&conn, &["brackets", "--file", &p]).unwrap();

    let s = store::load_settings(&conn).unwrap();
    assert_eq!(
        s.tax_brackets,
        vec![
            TaxBracket {
                limit: Some(dec!(158000)),
                rate: dec!(0.15),
            },
            TaxBracket {
                limit: Some(dec!(330000)),
                rate: dec!(0.2),
            },
            TaxBracket {
                limit: None,
                rate: dec!(0.4),
            },
        ]
    );
}

#[test]
fn brackets_must_end_unbounded_and_increase() {
    let conn = setup();
    let dir = tempdir().unwrap();
    for (i, body) in [
        r#"[{"limit": "110000", "rate": "0.15"}]"#,
        r#"[{"limit": "230000", "rate": "0.15"}, {"limit": "110000", "rate": "0.2"}, {"limit": null, "rate": "0.4"}]"#,
        r#"[]"#,
        r#"not json"#,
    ]
    .iter()
    .enumerate()
    {
        let path = dir.path().join(format!("b{}.json", i));
        std::fs::write(&path, body).unwrap();
        let p = path.to_string_lossy().to_string();
        assert!(run(&conn, &["brackets", "--file", &p]).is_err(), "accepted {}", body);
    }
    assert_eq!(
        store::load_settings(&conn).unwrap().tax_brackets,
        Settings::default().tax_brackets
    );
}
