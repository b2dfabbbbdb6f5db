// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ingest::{normalize_category, parse_amount};
use crate::models::{EntryMethod, NewTransaction, Transaction, TxnType};
use crate::store;
use crate::utils::{
    get_currency, json_flags, maybe_print_json, parse_date, pretty_table, resolve_branch,
};
use anyhow::{Context, Result, anyhow};
use regex::RegexBuilder;
use rust_decimal::Decimal;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let t = store::get_transaction(conn, id)?
                .ok_or_else(|| anyhow!("Transaction {} not found", id))?;
            store::delete_transaction(conn, id)?;
            println!(
                "Deleted transaction {}: {} {} {:.2} '{}' (branch: {})",
                id, t.date, t.kind, t.amount, t.category, t.branch_id
            );
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let branch_id = resolve_branch(conn, sub)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let kind = match sub.get_one::<String>("type").unwrap().as_str() {
        "income" => TxnType::Income,
        _ => TxnType::Expense,
    };
    let amount_raw = sub.get_one::<String>("amount").unwrap();
    let amount = parse_amount(amount_raw)?;
    if amount.is_sign_negative() {
        return Err(anyhow!("Amount must not be negative, got {}", amount_raw));
    }
    let is_personal = sub.get_flag("personal");
    if is_personal && kind == TxnType::Income {
        return Err(anyhow!("Only expenses can be marked personal"));
    }
    let user_id = match sub.get_one::<String>("user-email") {
        Some(email) => Some(
            store::get_user_by_email(conn, email.trim())?
                .with_context(|| format!("User '{}' not found", email))?
                .id,
        ),
        None => None,
    };
    let opt = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let txn = NewTransaction {
        branch_id: branch_id.clone(),
        user_id,
        date,
        kind,
        category: normalize_category(sub.get_one::<String>("category").map(String::as_str)),
        amount,
        description: opt("description"),
        source: opt("source"),
        is_personal,
        entry_method: if sub.get_flag("daily") {
            EntryMethod::DailyUpload
        } else {
            EntryMethod::Manual
        },
    };
    let id = store::insert_transaction(conn, &txn)?;
    println!(
        "Recorded {} {} on {} as '{}' (branch: {}, id {})",
        kind, amount, date, txn.category, branch_id, id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = get_currency(conn)?;
        let income: Decimal = data.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
        let expenses: Decimal = data.iter().filter(|t| t.is_expense()).map(|t| t.amount).sum();
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.category.clone(),
                    format!("{:.2}", t.amount),
                    t.description.clone().unwrap_or_default(),
                    t.source.clone().unwrap_or_default(),
                    if t.is_personal { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id",
                    "Date",
                    "Type",
                    "Category",
                    "Amount",
                    "Description",
                    "Source",
                    "Personal"
                ],
                rows,
            )
        );
        println!(
            "Income {} {:.2} | Expenses {} {:.2} | Net {} {:.2}",
            ccy,
            income,
            ccy,
            expenses,
            ccy,
            income - expenses
        );
    }
    Ok(())
}

/// Transactions of the resolved branch after applying the list filters, newest first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let branch_id = resolve_branch(conn, sub)?;
    let kind = sub.get_one::<String>("type").map(|s| s.as_str());
    let category = sub.get_one::<String>("category").map(|s| s.trim());
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let search = sub
        .get_one::<String>("search")
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|err| anyhow!("Invalid search pattern '{}': {}", p, err))
        })
        .transpose()?;
    let personal_only = sub.get_flag("personal");

    let mut data: Vec<Transaction> = store::fetch_transactions(conn, &branch_id)?
        .into_iter()
        .filter(|t| kind.is_none_or(|k| t.kind.as_str() == k))
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
        .filter(|t| from.is_none_or(|d| t.date >= d))
        .filter(|t| to.is_none_or(|d| t.date <= d))
        .filter(|t| !personal_only || t.is_personal)
        .filter(|t| {
            search.as_ref().is_none_or(|re| {
                re.is_match(&t.category)
                    || t.description.as_deref().is_some_and(|s| re.is_match(s))
                    || t.source.as_deref().is_some_and(|s| re.is_match(s))
            })
        })
        .collect();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
