// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::period::{Window, filter_window, month_window};
use super::rollup::percent_of;
use crate::models::Transaction;
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub label: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_profit: Decimal,
    pub personal_expenses: Decimal,
    pub business_expenses: Decimal,
    pub transaction_count: usize,
}

impl PeriodTotals {
    pub fn from_transactions(label: impl Into<String>, txns: &[Transaction]) -> Self {
        let mut out = PeriodTotals {
            label: label.into(),
            transaction_count: txns.len(),
            ..Default::default()
        };
        for t in txns {
            if t.is_income() {
                out.income = out.income.saturating_add(t.amount);
            } else {
                out.expenses = out.expenses.saturating_add(t.amount);
                if t.is_personal {
                    out.personal_expenses = out.personal_expenses.saturating_add(t.amount);
                }
            }
        }
        out.net_profit = out.income.saturating_sub(out.expenses);
        out.business_expenses = out.expenses.saturating_sub(out.personal_expenses);
        out
    }
}

/// Percent change used by the comparison cards.
///
/// Growth from zero is reported as 100% when the new value is positive. A change
/// too large to represent is reported as zero.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    current
        .checked_sub(previous)
        .and_then(|d| d.checked_div(previous))
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub income_change: Decimal,
    pub expenses_change: Decimal,
    pub net_profit_change: Decimal,
}

impl Comparison {
    pub fn new(current: PeriodTotals, previous: PeriodTotals) -> Self {
        Comparison {
            income_change: percent_change(current.income, previous.income),
            expenses_change: percent_change(current.expenses, previous.expenses),
            net_profit_change: percent_change(current.net_profit, previous.net_profit),
            current,
            previous,
        }
    }
}

fn totals_in(txns: &[Transaction], label: String, window: &Window) -> PeriodTotals {
    PeriodTotals::from_transactions(label, &filter_window(txns, window))
}

/// Two calendar months side by side; `a` is treated as the current month.
pub fn compare_months(txns: &[Transaction], a: (i32, u32), b: (i32, u32)) -> Comparison {
    let label = |(y, m): (i32, u32)| format!("{:04}-{:02}", y, m);
    Comparison::new(
        totals_in(txns, label(a), &month_window(a.0, a.1)),
        totals_in(txns, label(b), &month_window(b.0, b.1)),
    )
}

pub fn year_window(year: i32) -> Window {
    Window {
        start: NaiveDate::from_ymd_opt(year, 1, 1),
        end: NaiveDate::from_ymd_opt(year, 12, 31),
    }
}

/// Fiscal year `year` starting in `start_month`; a January start is the calendar year.
pub fn fiscal_year_window(year: i32, start_month: u32) -> Window {
    let start = NaiveDate::from_ymd_opt(year, start_month.clamp(1, 12), 1);
    let end = start
        .and_then(|s| s.checked_add_months(Months::new(12)))
        .and_then(|d| d.pred_opt());
    Window { start, end }
}

pub fn compare_years(txns: &[Transaction], current: i32, previous: i32) -> Comparison {
    compare_fiscal_years(txns, current, previous, 1)
}

pub fn compare_fiscal_years(
    txns: &[Transaction],
    current: i32,
    previous: i32,
    start_month: u32,
) -> Comparison {
    let window = |y: i32| {
        if start_month <= 1 {
            year_window(y)
        } else {
            fiscal_year_window(y, start_month)
        }
    };
    Comparison::new(
        totals_in(txns, current.to_string(), &window(current)),
        totals_in(txns, previous.to_string(), &window(previous)),
    )
}

/// Month containing `today` against the month before it.
pub fn current_vs_previous_month(txns: &[Transaction], today: NaiveDate) -> Comparison {
    let prev = today
        .with_day(1)
        .and_then(|d| d.checked_sub_months(Months::new(1)))
        .unwrap_or(today);
    compare_months(
        txns,
        (today.year(), today.month()),
        (prev.year(), prev.month()),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalSummary {
    pub month: String,
    pub total_personal: Decimal,
    pub total_income: Decimal,
    /// Personal draws as a percentage of income.
    pub personal_ratio: Decimal,
    pub breakdown: Vec<(String, Decimal)>,
    pub transactions: Vec<Transaction>,
}

pub fn personal_summary(txns: &[Transaction], year: i32, month: u32) -> PersonalSummary {
    let in_month = filter_window(txns, &month_window(year, month));
    let total_income = in_month
        .iter()
        .filter(|t| t.is_income())
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount));
    let personal: Vec<Transaction> = in_month
        .into_iter()
        .filter(|t| t.is_expense() && t.is_personal)
        .collect();
    let total_personal = personal
        .iter()
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount));

    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    for t in &personal {
        let slot = by_category.entry(t.category.as_str()).or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(t.amount);
    }
    let mut breakdown: Vec<(String, Decimal)> = by_category
        .into_iter()
        .map(|(c, a)| (c.to_string(), a))
        .collect();
    breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    PersonalSummary {
        month: format!("{:04}-{:02}", year, month),
        personal_ratio: percent_of(total_personal, total_income),
        total_personal,
        total_income,
        breakdown,
        transactions: personal,
    }
}
