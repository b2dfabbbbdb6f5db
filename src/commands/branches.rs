// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{self, NewBranch};
use crate::utils::{
    get_current_branch, json_flags, maybe_print_json, pretty_table, set_current_branch,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("use", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            let branch = store::get_branch(conn, id)?
                .with_context(|| format!("Branch '{}' not found", id))?;
            set_current_branch(conn, &branch.id)?;
            println!("Now working in branch '{}' ({})", branch.display_name, branch.id);
        }
        Some(("current", _)) => match get_current_branch(conn)? {
            Some(id) => println!("{}", id),
            None => println!("No branch selected"),
        },
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim().to_string();
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let display_name = sub
        .get_one::<String>("display-name")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| name.clone());
    let currency = sub.get_one::<String>("currency").unwrap().to_uppercase();
    let fiscal_year_start = *sub.get_one::<u32>("fiscal-year-start").unwrap_or(&1);
    let created_by = match sub.get_one::<String>("created-by") {
        Some(email) => Some(
            store::get_user_by_email(conn, email.trim())?
                .with_context(|| format!("User '{}' not found", email))?
                .id,
        ),
        None => None,
    };
    store::create_branch(
        conn,
        &NewBranch {
            id: id.clone(),
            name,
            display_name: display_name.clone(),
            currency: currency.clone(),
            fiscal_year_start,
            created_by,
        },
    )?;
    if get_current_branch(conn)?.is_none() {
        set_current_branch(conn, &id)?;
    }
    println!("Added branch '{}' ({}, {})", display_name, id, currency);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let branches = store::list_branches(conn)?;
    if !maybe_print_json(json_flag, jsonl_flag, &branches)? {
        let current = get_current_branch(conn)?;
        let rows = branches
            .into_iter()
            .map(|b| {
                let marker = if current.as_deref() == Some(b.id.as_str()) {
                    "*".to_string()
                } else {
                    String::new()
                };
                vec![
                    marker,
                    b.id,
                    b.display_name,
                    b.currency,
                    b.fiscal_year_start.to_string(),
                    b.created_at,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["", "Id", "Name", "Currency", "FY Start", "Created"],
                rows
            )
        );
    }
    Ok(())
}
