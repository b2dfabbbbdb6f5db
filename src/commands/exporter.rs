// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::reports::analytics_for;
use crate::store;
use crate::utils::resolve_branch;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        Some(("analytics", sub)) => export_analytics(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let branch_id = resolve_branch(conn, sub)?;

    // Oldest first, the order a spreadsheet reader expects.
    let mut rows = store::fetch_transactions(conn, &branch_id)?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "type",
                "category",
                "amount",
                "description",
                "source",
                "is_personal",
                "branch",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.category.clone(),
                    t.amount.to_string(),
                    t.description.clone().unwrap_or_default(),
                    t.source.clone().unwrap_or_default(),
                    t.is_personal.to_string(),
                    t.branch_id.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "branch": t.branch_id,
                        "date": t.date,
                        "type": t.kind,
                        "category": t.category,
                        "amount": t.amount,
                        "description": t.description,
                        "source": t.source,
                        "is_personal": t.is_personal,
                        "entry_method": t.entry_method,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    tracing::info!(count = rows.len(), out = %out, "exported transactions");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

fn export_analytics(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap();
    let report = analytics_for(conn, sub)?;
    std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
    println!("Exported analytics for {} to {}", report.branch, out);
    Ok(())
}
