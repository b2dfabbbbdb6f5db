// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use branchflow::analytics::period::{filter, month_window};
use branchflow::analytics::{Period, Window};
use branchflow::models::{EntryMethod, Transaction, TxnType};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn on(id: i64, d: &str) -> Transaction {
    Transaction {
        id,
        branch_id: "main".into(),
        user_id: None,
        date: date(d),
        kind: TxnType::Income,
        category: "Sales".into(),
        amount: dec!(10),
        description: None,
        source: None,
        is_personal: false,
        entry_method: EntryMethod::Bulk,
    }
}

#[test]
fn rolling_windows_start_on_the_first() {
    let today = date("2024-05-17");
    assert_eq!(
        Period::ThreeMonths.window(today),
        Window {
            start: Some(date("2024-02-01")),
            end: Some(today)
        }
    );
    assert_eq!(Period::SixMonths.window(today).start, Some(date("2023-11-01")));
    assert_eq!(Period::OneYear.window(today).start, Some(date("2023-05-01")));
}

#[test]
fn rolling_window_crosses_year_end() {
    let w = Period::ThreeMonths.window(date("2024-01-31"));
    assert_eq!(w.start, Some(date("2023-10-01")));
}

#[test]
fn custom_range_is_inclusive() {
    let txns = vec![
        on(1, "2024-02-29"),
        on(2, "2024-03-01"),
        on(3, "2024-03-31"),
        on(4, "2024-04-01"),
    ];
    let p = Period::Custom {
        start: Some(date("2024-03-01")),
        end: Some(date("2024-03-31")),
    };
    let ids: Vec<i64> = filter(&txns, &p, date("2030-01-01"))
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn incomplete_custom_range_uses_six_months() {
    let today = date("2024-05-17");
    let p = Period::Custom {
        start: Some(date("2020-01-01")),
        end: None,
    };
    assert_eq!(p.window(today), Period::SixMonths.window(today));
}

#[test]
fn rolling_window_excludes_future_dates() {
    let txns = vec![on(1, "2024-05-17"), on(2, "2024-05-18")];
    let kept = filter(&txns, &Period::ThreeMonths, date("2024-05-17"));
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, 1);
}

#[test]
fn month_window_handles_leap_february() {
    let w = month_window(2024, 2);
    assert_eq!(w.start, Some(date("2024-02-01")));
    assert_eq!(w.end, Some(date("2024-02-29")));
    let w = month_window(2023, 12);
    assert_eq!(w.end, Some(date("2023-12-31")));
}

#[test]
fn parse_period_names() {
    assert_eq!(Period::parse("3months", None, None).unwrap(), Period::ThreeMonths);
    assert_eq!(Period::parse("1YEAR", None, None).unwrap(), Period::OneYear);
    assert_eq!(Period::parse("all", None, None).unwrap(), Period::All);
    assert_eq!(
        Period::parse("2024-07", None, None).unwrap(),
        Period::Month {
            year: 2024,
            month: 7
        }
    );
    let custom = Period::parse("custom", Some(date("2024-01-01")), None).unwrap();
    assert_eq!(
        custom,
        Period::Custom {
            start: Some(date("2024-01-01")),
            end: None
        }
    );
    assert!(Period::parse("fortnight", None, None).is_err());
    assert!(Period::parse("2024-13", None, None).is_err());
}

#[test]
fn all_keeps_everything() {
    let txns = vec![on(1, "1999-01-01"), on(2, "2099-01-01")];
    assert_eq!(filter(&txns, &Period::All, date("2024-01-01")).len(), 2);
}
