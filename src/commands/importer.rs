// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ingest::{LedgerRow, RawTransaction};
use crate::models::{EntryMethod, NewTransaction};
use crate::store;
use crate::utils::{get_current_branch, resolve_branch};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, Trim};
use rusqlite::Connection;
use std::collections::BTreeSet;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let summary = import_transactions(conn, sub)?;
            println!(
                "Imported {} transactions from {} ({} new branches)",
                summary.imported,
                sub.get_one::<String>("path").unwrap().trim(),
                summary.branches_created
            );
            Ok(())
        }
        Some(("ledger", sub)) => {
            let summary = import_ledger(conn, sub)?;
            println!(
                "Imported {} transactions from {} ({} rows)",
                summary.imported,
                sub.get_one::<String>("path").unwrap().trim(),
                summary.rows
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows: usize,
    pub imported: usize,
    pub branches_created: usize,
}

fn user_for_import(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<i64>> {
    match sub.get_one::<String>("user-email") {
        Some(email) => Ok(Some(store::ensure_user(conn, email.trim())?.id)),
        None => Ok(None),
    }
}

fn open_csv(sub: &clap::ArgMatches) -> Result<csv::Reader<std::fs::File>> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))
}

/// Imports `date,type,category,amount,description,source,is_personal[,branch]` rows.
///
/// Rows naming a branch go to that branch, which is created when missing; the
/// rest go to `--branch` or the selected branch. Either all rows land or none.
pub fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<ImportSummary> {
    let mut rdr = open_csv(sub)?;
    let user_id = user_for_import(conn, sub)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<RawTransaction>().enumerate() {
        let line = i + 2;
        let raw = result.with_context(|| format!("Malformed CSV row {}", line))?;
        rows.push((line, raw));
    }

    let needs_default = rows.iter().any(|(_, r)| r.branch_id().is_none());
    let default_branch = if needs_default {
        resolve_branch(conn, sub)?
    } else {
        get_current_branch(conn)?.unwrap_or_default()
    };

    let named: BTreeSet<String> = rows.iter().filter_map(|(_, r)| r.branch_id()).collect();

    let mut txns: Vec<NewTransaction> = Vec::with_capacity(rows.len());
    for (line, raw) in rows.iter().cloned() {
        let t = raw
            .normalize(&default_branch, user_id, EntryMethod::Bulk)
            .with_context(|| format!("Row {}", line))?;
        if t.amount.is_zero() {
            tracing::warn!(line, "amount missing or unparseable, imported as zero");
        }
        txns.push(t);
    }

    let tx = conn.transaction()?;
    let mut branches_created = 0;
    for id in &named {
        if store::ensure_branch(&tx, id, user_id)? {
            branches_created += 1;
        }
    }
    for t in &txns {
        store::insert_transaction(&tx, t)?;
    }
    tx.commit()?;

    tracing::info!(
        imported = txns.len(),
        branches = named.len(),
        "imported transactions"
    );
    Ok(ImportSummary {
        rows: rows.len(),
        imported: txns.len(),
        branches_created,
    })
}

/// Imports the wide ledger layout where each row carries income, expense and
/// personal columns for one day.
pub fn import_ledger(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<ImportSummary> {
    let branch_id = resolve_branch(conn, sub)?;
    let user_id = user_for_import(conn, sub)?;
    let mut rdr = open_csv(sub)?;

    let mut rows = 0;
    let mut txns = Vec::new();
    for (i, result) in rdr.deserialize::<LedgerRow>().enumerate() {
        let line = i + 2;
        let row = result.with_context(|| format!("Malformed CSV row {}", line))?;
        rows += 1;
        if row.date.as_deref().is_none_or(|d| d.trim().is_empty()) {
            tracing::warn!(line, "skipping ledger row without a date");
            continue;
        }
        let expanded = row
            .expand(&branch_id, user_id)
            .map_err(|e| anyhow!("Row {}: {}", line, e))?;
        txns.extend(expanded);
    }

    let imported = store::insert_many(conn, &txns)?;
    tracing::info!(rows, imported, branch = %branch_id, "imported ledger");
    Ok(ImportSummary {
        rows,
        imported,
        branches_created: 0,
    })
}
