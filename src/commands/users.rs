// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{json_flags, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let email = sub.get_one::<String>("email").unwrap().trim();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let user = store::create_user(conn, email, name)?;
            println!("Added user '{}' ({}), id {}", user.display_name, user.email, user.id);
        }
        Some(("show", sub)) => {
            let email = sub.get_one::<String>("email").unwrap().trim();
            let user = store::get_user_by_email(conn, email)?
                .with_context(|| format!("User '{}' not found", email))?;
            let (json_flag, jsonl_flag) = json_flags(sub);
            if !maybe_print_json(json_flag, jsonl_flag, &user)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Email", "Name", "Created"],
                        vec![vec![
                            user.id.to_string(),
                            user.email,
                            user.display_name,
                            user.created_at,
                        ]],
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}
