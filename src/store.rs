// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite persistence for users, branches and transactions.

use crate::models::{Branch, EntryMethod, NewTransaction, Transaction, TxnType, User};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

const TXN_COLUMNS: &str = "id, branch_id, user_id, date, type, category, amount, description, source, is_personal, entry_method";

fn txn_from_row(r: &Row<'_>) -> Result<Transaction> {
    let kind: String = r.get(4)?;
    let amount: String = r.get(6)?;
    let id: i64 = r.get(0)?;
    let method: String = r.get(10)?;
    Ok(Transaction {
        id,
        branch_id: r.get(1)?,
        user_id: r.get(2)?,
        date: r.get(3)?,
        kind: TxnType::from_db(&kind)?,
        category: r.get(5)?,
        amount: amount
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' on transaction {}", amount, id))?,
        description: r.get(7)?,
        source: r.get(8)?,
        is_personal: r.get(9)?,
        entry_method: EntryMethod::from_db(&method),
    })
}

/// Loads every transaction of a branch, newest first.
pub fn fetch_transactions(conn: &Connection, branch_id: &str) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE branch_id=?1 ORDER BY date DESC, id DESC",
        TXN_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![branch_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(txn_from_row(r)?);
    }
    tracing::debug!(branch = branch_id, count = out.len(), "fetched transactions");
    Ok(out)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", TXN_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => Ok(Some(txn_from_row(r)?)),
        None => Ok(None),
    }
}

pub fn insert_transaction(conn: &Connection, t: &NewTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(branch_id, user_id, date, type, category, amount, description, source, is_personal, entry_method)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            t.branch_id,
            t.user_id,
            t.date.to_string(),
            t.kind.as_str(),
            t.category,
            t.amount.to_string(),
            t.description,
            t.source,
            t.is_personal,
            t.entry_method.as_str(),
        ],
    )
    .with_context(|| format!("Insert transaction for branch '{}'", t.branch_id))?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, branch = %t.branch_id, "inserted transaction");
    Ok(id)
}

/// Inserts all records atomically; nothing is written if any insert fails.
pub fn insert_many(conn: &mut Connection, txns: &[NewTransaction]) -> Result<usize> {
    let tx = conn.transaction()?;
    for t in txns {
        insert_transaction(&tx, t)?;
    }
    tx.commit()?;
    Ok(txns.len())
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Transaction {} not found", id));
    }
    tracing::info!(id, "deleted transaction");
    Ok(())
}

fn branch_from_row(r: &Row<'_>) -> rusqlite::Result<Branch> {
    Ok(Branch {
        id: r.get(0)?,
        name: r.get(1)?,
        display_name: r.get(2)?,
        currency: r.get(3)?,
        fiscal_year_start: r.get(4)?,
        is_active: r.get(5)?,
        created_by: r.get(6)?,
        created_at: r.get(7)?,
    })
}

const BRANCH_COLUMNS: &str =
    "id, name, display_name, currency, fiscal_year_start, is_active, created_by, created_at";

/// Active branches ordered by name.
pub fn list_branches(conn: &Connection) -> Result<Vec<Branch>> {
    let sql = format!(
        "SELECT {} FROM branches WHERE is_active=1 ORDER BY name",
        BRANCH_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], branch_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get_branch(conn: &Connection, id: &str) -> Result<Option<Branch>> {
    let sql = format!("SELECT {} FROM branches WHERE id=?1", BRANCH_COLUMNS);
    Ok(conn
        .query_row(&sql, params![id], branch_from_row)
        .optional()?)
}

#[derive(Debug, Clone)]
pub struct NewBranch {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub currency: String,
    pub fiscal_year_start: u32,
    pub created_by: Option<i64>,
}

impl NewBranch {
    /// A branch known only by its id, as created by bulk imports.
    pub fn bare(id: &str, created_by: Option<i64>) -> Self {
        NewBranch {
            id: id.to_string(),
            name: id.to_string(),
            display_name: id.to_string(),
            currency: "PHP".to_string(),
            fiscal_year_start: 1,
            created_by,
        }
    }
}

pub fn create_branch(conn: &Connection, b: &NewBranch) -> Result<()> {
    if !(1..=12).contains(&b.fiscal_year_start) {
        return Err(anyhow!(
            "Fiscal year start must be a month number 1-12, got {}",
            b.fiscal_year_start
        ));
    }
    conn.execute(
        "INSERT INTO branches(id, name, display_name, currency, fiscal_year_start, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            b.id,
            b.name,
            b.display_name,
            b.currency,
            b.fiscal_year_start,
            b.created_by
        ],
    )
    .with_context(|| format!("Create branch '{}'", b.id))?;
    tracing::info!(branch = %b.id, "created branch");
    Ok(())
}

/// Creates the branch if it does not exist yet. Returns true when it was created.
pub fn ensure_branch(conn: &Connection, id: &str, created_by: Option<i64>) -> Result<bool> {
    let b = NewBranch::bare(id, created_by);
    let n = conn.execute(
        "INSERT INTO branches(id, name, display_name, currency, fiscal_year_start, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO NOTHING",
        params![
            b.id,
            b.name,
            b.display_name,
            b.currency,
            b.fiscal_year_start,
            b.created_by
        ],
    )?;
    if n > 0 {
        tracing::info!(branch = id, "created branch on import");
    }
    Ok(n > 0)
}

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        email: r.get(1)?,
        display_name: r.get(2)?,
        created_at: r.get(3)?,
    })
}

pub fn create_user(conn: &Connection, email: &str, display_name: &str) -> Result<User> {
    conn.execute(
        "INSERT INTO users(email, display_name) VALUES (?1, ?2)",
        params![email, display_name],
    )
    .with_context(|| format!("Create user '{}'", email))?;
    get_user_by_email(conn, email)?.ok_or_else(|| anyhow!("User '{}' vanished after insert", email))
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, email, display_name, created_at FROM users WHERE email=?1",
            params![email],
            user_from_row,
        )
        .optional()?)
}

/// Looks the user up by email, creating a placeholder account when absent.
pub fn ensure_user(conn: &Connection, email: &str) -> Result<User> {
    if let Some(u) = get_user_by_email(conn, email)? {
        return Ok(u);
    }
    create_user(conn, email, "Imported User")
}
