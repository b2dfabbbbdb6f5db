// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use anyhow::{Result, anyhow};
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// Date window a report is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Period {
    ThreeMonths,
    #[default]
    SixMonths,
    OneYear,
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Month {
        year: i32,
        month: u32,
    },
    All,
}

/// Inclusive date bounds; `None` means open-ended on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Window {
    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start.is_none_or(|s| d >= s) && self.end.is_none_or(|e| d <= e)
    }
}

impl Period {
    /// Accepts `3months`, `6months`, `1year`, `custom`, `all` or a `YYYY-MM` month.
    pub fn parse(s: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3months" => Ok(Period::ThreeMonths),
            "6months" => Ok(Period::SixMonths),
            "1year" => Ok(Period::OneYear),
            "custom" => Ok(Period::Custom { start, end }),
            "all" => Ok(Period::All),
            other => {
                let d = NaiveDate::parse_from_str(&format!("{}-01", other), "%Y-%m-%d").map_err(
                    |_| {
                        anyhow!(
                            "Invalid period '{}', expected 3months|6months|1year|custom|all|YYYY-MM",
                            s
                        )
                    },
                )?;
                Ok(Period::Month {
                    year: d.year(),
                    month: d.month(),
                })
            }
        }
    }

    /// Resolves the period against `today`.
    ///
    /// Rolling windows start on the first day of the month N months before the
    /// current one and run through `today`. A custom period missing either bound
    /// falls back to the six-month window.
    pub fn window(&self, today: NaiveDate) -> Window {
        match *self {
            Period::ThreeMonths => rolling(today, 3),
            Period::SixMonths => rolling(today, 6),
            Period::OneYear => rolling(today, 12),
            Period::Custom {
                start: Some(start),
                end: Some(end),
            } => Window {
                start: Some(start),
                end: Some(end),
            },
            Period::Custom { .. } => {
                tracing::debug!("custom period without both bounds, using six months");
                rolling(today, 6)
            }
            Period::Month { year, month } => month_window(year, month),
            Period::All => Window {
                start: None,
                end: None,
            },
        }
    }

    pub fn label(&self) -> String {
        match self {
            Period::ThreeMonths => "Last 3 months".into(),
            Period::SixMonths => "Last 6 months".into(),
            Period::OneYear => "Last 12 months".into(),
            Period::Custom {
                start: Some(s),
                end: Some(e),
            } => format!("{} to {}", s, e),
            Period::Custom { .. } => "Last 6 months".into(),
            Period::Month { year, month } => format!("{:04}-{:02}", year, month),
            Period::All => "All time".into(),
        }
    }
}

fn rolling(today: NaiveDate, months: u32) -> Window {
    let start = today
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months)));
    Window {
        start,
        end: Some(today),
    }
}

pub fn month_window(year: i32, month: u32) -> Window {
    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let end = start
        .and_then(|s| s.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt());
    Window { start, end }
}

/// Keeps transactions dated inside the window, preserving order.
pub fn filter_window(txns: &[Transaction], window: &Window) -> Vec<Transaction> {
    txns.iter()
        .filter(|t| window.contains(t.date))
        .cloned()
        .collect()
}

pub fn filter(txns: &[Transaction], period: &Period, today: NaiveDate) -> Vec<Transaction> {
    filter_window(txns, &period.window(today))
}
