// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TaxBracket;
use crate::store::{apply_setting, load_settings, save_settings};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            let mut settings = load_settings(conn)?;
            apply_setting(&mut settings, key, value)?;
            save_settings(conn, &settings)
                .with_context(|| format!("Rejected {}={}", key, value.trim()))?;
            tracing::info!(key = %key, value = %value.trim(), "setting updated");
            println!("{} = {}", key, value.trim());
        }
        Some(("brackets", sub)) => {
            let path = sub.get_one::<String>("file").unwrap().trim();
            let raw = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
            let brackets: Vec<TaxBracket> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid tax brackets JSON in {}", path))?;
            let mut settings = load_settings(conn)?;
            settings.tax_brackets = brackets;
            save_settings(conn, &settings)
                .with_context(|| format!("Rejected brackets from {}", path))?;
            tracing::info!(path, count = settings.tax_brackets.len(), "tax brackets replaced");
            println!("Loaded {} tax brackets from {}", settings.tax_brackets.len(), path);
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = load_settings(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Minimum wage".into(), settings.minimum_wage.to_string()],
        vec!["SGK rate".into(), settings.sgk_rate.to_string()],
        vec!["Unemployment rate".into(), settings.unemployment_rate.to_string()],
        vec!["Stamp tax rate".into(), settings.stamp_tax_rate.to_string()],
        vec!["Daily work hours".into(), settings.daily_work_hours.to_string()],
        vec!["Overtime multiplier".into(), settings.overtime_multiplier.to_string()],
        vec!["Weekend multiplier".into(), settings.weekend_multiplier.to_string()],
        vec!["Holiday multiplier".into(), settings.holiday_multiplier.to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));

    let brackets = settings
        .tax_brackets
        .iter()
        .map(|b| {
            vec![
                b.limit.map(|l| l.to_string()).unwrap_or_else(|| "∞".into()),
                b.rate.to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Up to (yearly)", "Rate"], brackets));
    Ok(())
}
