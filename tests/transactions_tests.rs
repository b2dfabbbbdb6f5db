// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use branchflow::models::{EntryMethod, TxnType, UNCATEGORIZED};
use branchflow::{cli, commands::transactions, db, store, utils};
use rusqlite::{Connection, params};
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO branches(id,name,display_name) VALUES ('erjem','Erjem','Erjem Glass')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO branches(id,name,display_name) VALUES ('north','North','North Branch')",
        [],
    )
    .unwrap();
    utils::set_current_branch(&conn, "erjem").unwrap();
    let rows = [
        ("2025-01-01", "income", "Sales", "1000", "Window install", 0),
        ("2025-01-02", "expense", "Materials", "250.50", "Glass panes", 0),
        ("2025-01-03", "expense", "Food", "80", "Lunch", 1),
    ];
    for (d, k, c, a, desc, p) in rows {
        conn.execute(
            "INSERT INTO transactions(branch_id,date,type,category,amount,description,is_personal) VALUES ('erjem',?1,?2,?3,?4,?5,?6)",
            params![d, k, c, a, desc, p],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO transactions(branch_id,date,type,category,amount) VALUES ('north','2025-01-04','income','Sales','999')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) {
    let matches = cli::build_cli().get_matches_from(args);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m).unwrap();
    } else {
        panic!("no tx subcommand");
    }
}

fn list(conn: &Connection, args: &[&str]) -> Vec<branchflow::models::Transaction> {
    let mut full = vec!["branchflow", "tx", "list"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    transactions::query_rows(conn, list_m).unwrap()
}

#[test]
fn list_is_scoped_to_selected_branch_newest_first() {
    let conn = setup();
    let rows = list(&conn, &[]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].date.to_string(), "2025-01-03");
    assert!(rows.iter().all(|t| t.branch_id == "erjem"));

    let north = list(&conn, &["--branch", "north"]);
    assert_eq!(north.len(), 1);
    assert_eq!(north[0].amount, dec!(999));
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let rows = list(&conn, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date.to_string(), "2025-01-03");
}

#[test]
fn list_filters_combine() {
    let conn = setup();
    assert_eq!(list(&conn, &["--type", "expense"]).len(), 2);
    assert_eq!(list(&conn, &["--personal"]).len(), 1);
    assert_eq!(list(&conn, &["--category", "materials"]).len(), 1);
    assert_eq!(
        list(&conn, &["--from", "2025-01-02", "--to", "2025-01-02"]).len(),
        1
    );
}

#[test]
fn search_is_case_insensitive_regex() {
    let conn = setup();
    let rows = list(&conn, &["--search", "glass|LUNCH"]);
    assert_eq!(rows.len(), 2);
}

#[test]
fn invalid_search_pattern_is_an_error() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from(["branchflow", "tx", "list", "--search", "("]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    assert!(transactions::query_rows(&conn, list_m).is_err());
}

#[test]
fn add_normalises_and_stores() {
    let conn = setup();
    run(
        &conn,
        &[
            "branchflow", "tx", "add", "--date", "2025-02-01", "--type", "expense", "--amount",
            "1,200.75", "--source", "Hardware store", "--daily",
        ],
    );
    let t = &store::fetch_transactions(&conn, "erjem").unwrap()[0];
    assert_eq!(t.kind, TxnType::Expense);
    assert_eq!(t.amount, dec!(1200.75));
    assert_eq!(t.category, UNCATEGORIZED);
    assert_eq!(t.source.as_deref(), Some("Hardware store"));
    assert_eq!(t.entry_method, EntryMethod::DailyUpload);
    assert!(!t.is_personal);
}

#[test]
fn add_rejects_negative_amounts_and_personal_income() {
    let conn = setup();
    for args in [
        vec!["branchflow", "tx", "add", "--date", "2025-02-01", "--type", "expense", "--amount=-5"],
        vec!["branchflow", "tx", "add", "--date", "2025-02-01", "--type", "income", "--amount", "5", "--personal"],
    ] {
        let matches = cli::build_cli().get_matches_from(args);
        let (_, tx_m) = matches.subcommand().unwrap();
        assert!(transactions::handle(&conn, tx_m).is_err());
    }
    assert_eq!(store::fetch_transactions(&conn, "erjem").unwrap().len(), 3);
}

#[test]
fn add_without_any_branch_fails() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let matches = cli::build_cli().get_matches_from([
        "branchflow", "tx", "add", "--date", "2025-02-01", "--type", "income", "--amount", "5",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let err = transactions::handle(&conn, tx_m).unwrap_err();
    assert!(err.to_string().contains("No branch selected"));
}

#[test]
fn rm_deletes_and_reports_missing_ids() {
    let conn = setup();
    let id: i64 = conn
        .query_row("SELECT id FROM transactions WHERE description='Lunch'", [], |r| r.get(0))
        .unwrap();
    run(&conn, &["branchflow", "tx", "rm", "--id", &id.to_string()]);
    assert!(store::get_transaction(&conn, id).unwrap().is_none());
    assert_eq!(store::fetch_transactions(&conn, "erjem").unwrap().len(), 2);

    let matches =
        cli::build_cli().get_matches_from(["branchflow", "tx", "rm", "--id", &id.to_string()]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let err = transactions::handle(&conn, tx_m).unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(store::delete_transaction(&conn, id).is_err());
}
