// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, TxnType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetric {
    /// Zero-padded `YYYY-MM`.
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub gross_profit: Decimal,
    pub gross_margin: Decimal,
}

pub fn month_key(t: &Transaction) -> String {
    t.date.format("%Y-%m").to_string()
}

/// `part / whole * 100`, or zero when `whole` is zero or the result overflows.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Groups transactions by month and returns them oldest first.
pub fn monthly_rollup(txns: &[Transaction]) -> Vec<MonthlyMetric> {
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in txns {
        let entry = map
            .entry(month_key(t))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.kind {
            TxnType::Income => entry.0 = entry.0.saturating_add(t.amount),
            TxnType::Expense => entry.1 = entry.1.saturating_add(t.amount),
        }
    }
    map.into_iter()
        .map(|(month, (income, expenses))| {
            let gross_profit = income.saturating_sub(expenses);
            MonthlyMetric {
                month,
                income,
                expenses,
                gross_profit,
                gross_margin: percent_of(gross_profit, income),
            }
        })
        .collect()
}
