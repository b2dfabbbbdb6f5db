// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use branchflow::models::{EntryMethod, TxnType};
use branchflow::{cli, commands::importer, db, store, utils};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO branches(id,name,display_name) VALUES ('erjem','Erjem','Erjem Glass')",
        [],
    )
    .unwrap();
    utils::set_current_branch(&conn, "erjem").unwrap();
    conn
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

fn import(conn: &mut Connection, kind: &str, extra: &[&str]) -> anyhow::Result<importer::ImportSummary> {
    let mut args = vec!["branchflow", "import", kind];
    args.extend_from_slice(extra);
    let matches = cli::build_cli().get_matches_from(args);
    let Some(("import", import_m)) = matches.subcommand() else {
        panic!("no import subcommand");
    };
    match import_m.subcommand() {
        Some(("transactions", sub)) => importer::import_transactions(conn, sub),
        Some(("ledger", sub)) => importer::import_ledger(conn, sub),
        _ => panic!("unknown import kind"),
    }
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,type,category,amount,description,source,is_personal\n2025-02-03,expense,Supplies,5.00,Tape,,false\n",
    );
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    let summary = import(&mut conn, "transactions", &["--path", &padded]).unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(store::fetch_transactions(&conn, "erjem").unwrap().len(), 1);
}

#[test]
fn rows_are_normalised_at_the_boundary() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,type,category,amount,description,source,is_personal\n\
         12/28/2024,Income,,\"1,500\",Door repair,Walk-in,\n\
         45654,,Fuel,abc,,,\n\
         2024-12-29T09:15:00+08:00,expense,Food,120,Dinner,,TRUE\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    import(&mut conn, "transactions", &["--path", &path]).unwrap();

    let mut txns = store::fetch_transactions(&conn, "erjem").unwrap();
    txns.sort_by_key(|t| t.id);
    assert_eq!(txns.len(), 3);

    assert_eq!(txns[0].kind, TxnType::Income);
    assert_eq!(txns[0].date.to_string(), "2024-12-28");
    assert_eq!(txns[0].amount, dec!(1500));
    assert_eq!(txns[0].category, "Uncategorized");
    assert_eq!(txns[0].entry_method, EntryMethod::Bulk);

    // Blank type means expense; unparseable amount becomes zero.
    assert_eq!(txns[1].kind, TxnType::Expense);
    assert_eq!(txns[1].date.to_string(), "2024-12-28");
    assert_eq!(txns[1].amount, Decimal::ZERO);

    assert!(txns[2].is_personal);
    assert_eq!(txns[2].date.to_string(), "2024-12-29");
}

#[test]
fn multi_branch_import_creates_branches() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,type,category,amount,description,source,is_personal,branch\n\
         2025-01-05,income,Sales,100,,,,north\n\
         2025-01-05,income,Sales,200,,,,south\n\
         2025-01-06,expense,Rent,50,,,,north\n\
         2025-01-06,expense,Rent,75,,,,\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    let summary = import(
        &mut conn,
        "transactions",
        &["--path", &path, "--user-email", "owner@example.com"],
    )
    .unwrap();
    assert_eq!(summary.imported, 4);
    assert_eq!(summary.branches_created, 2);

    assert_eq!(store::fetch_transactions(&conn, "north").unwrap().len(), 2);
    assert_eq!(store::fetch_transactions(&conn, "south").unwrap().len(), 1);
    assert_eq!(store::fetch_transactions(&conn, "erjem").unwrap().len(), 1);

    let owner = store::get_user_by_email(&conn, "owner@example.com")
        .unwrap()
        .unwrap();
    let north = store::get_branch(&conn, "north").unwrap().unwrap();
    assert_eq!(north.created_by, Some(owner.id));
    assert_eq!(north.currency, "PHP");
}

#[test]
fn bad_row_rolls_back_whole_import() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,type,category,amount,description,source,is_personal\n\
         2025-01-05,income,Sales,100,,,\n\
         not-a-date,income,Sales,100,,,\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    let err = import(&mut conn, "transactions", &["--path", &path]).unwrap_err();
    assert!(format!("{:#}", err).contains("Row 3"));
    assert!(store::fetch_transactions(&conn, "erjem").unwrap().is_empty());

    let file = csv_file(
        "date,type,category,amount,description,source,is_personal\n2025-01-05,refund,Sales,100,,,\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    assert!(import(&mut conn, "transactions", &["--path", &path]).is_err());
}

#[test]
fn ledger_sheet_expands_columns() {
    let mut conn = base_conn();
    let file = csv_file(
        "Date,Income details,Income Amount,Expenses details,Expenses Amount,Personal Details,Personal Expenses\n\
         2024-03-01,Shop front,5000,Glass,2000,Groceries,300\n\
         2024-03-02,,0,Cutting disc,150,,\n\
         ,,,,,,\n",
    );
    let path = file.path().to_str().unwrap().to_string();
    let summary = import(&mut conn, "ledger", &["--path", &path]).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.imported, 4);

    let txns = store::fetch_transactions(&conn, "erjem").unwrap();
    let personal: Vec<_> = txns.iter().filter(|t| t.is_personal).collect();
    assert_eq!(personal.len(), 1);
    assert_eq!(personal[0].category, "Personal");
    assert_eq!(personal[0].amount, dec!(300));
    let income: Decimal = txns.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    assert_eq!(income, dec!(5000));
}
