// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::period::{self, Period};
use super::rollup::{MonthlyMetric, month_key, monthly_rollup, percent_of};
use super::scoring::{ExpansionReadiness, ProfitFirst, expansion_readiness, profit_first};
use crate::models::Transaction;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
    /// Share of total expenses, in percent.
    pub share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub category: String,
    pub first_half: Decimal,
    pub second_half: Decimal,
    pub change: Decimal,
}

/// Everything the analytics views show for one branch and window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub income: Decimal,
    pub expenses: Decimal,
    pub gross_profit: Decimal,
    pub gross_margin: Decimal,
    pub revenue_growth: Decimal,
    pub monthly_metrics: Vec<MonthlyMetric>,
    pub top_categories: Vec<CategoryTotal>,
    pub personal_expenses: Decimal,
    pub business_expenses: Decimal,
    pub profit_consistency: Decimal,
    pub cash_runway_months: Decimal,
    pub lowest_margin: Decimal,
    pub avg_revenue_growth: Decimal,
    pub break_even_revenue: Decimal,
    pub best_month: Option<MonthlyMetric>,
    pub worst_month: Option<MonthlyMetric>,
    pub category_trends: Vec<CategoryTrend>,
    pub avg_transaction_size: Decimal,
    pub transaction_count: usize,
    pub expansion: ExpansionReadiness,
    pub profit_first: ProfitFirst,
}

/// Filters `txns` to `period` and aggregates the result.
pub fn analyze(txns: &[Transaction], period: &Period, today: NaiveDate) -> Analytics {
    aggregate(&period::filter(txns, period, today))
}

// Zero when the denominator is zero or the quotient overflows.
fn ratio(num: Decimal, den: Decimal) -> Decimal {
    num.checked_div(den).unwrap_or(Decimal::ZERO)
}

// None when there is no previous value to grow from; overflow reads as no change.
fn growth(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    Some(
        current
            .checked_sub(previous)
            .and_then(|d| d.checked_div(previous))
            .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO),
    )
}

/// Reduces an already-filtered transaction set to the analytics summary.
pub fn aggregate(txns: &[Transaction]) -> Analytics {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    let mut personal_expenses = Decimal::ZERO;
    let mut income_count = 0usize;
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    for t in txns {
        if t.is_income() {
            income = income.saturating_add(t.amount);
            income_count += 1;
        } else {
            expenses = expenses.saturating_add(t.amount);
            let slot = by_category.entry(t.category.as_str()).or_insert(Decimal::ZERO);
            *slot = slot.saturating_add(t.amount);
            if t.is_personal {
                personal_expenses = personal_expenses.saturating_add(t.amount);
            }
        }
    }
    let gross_profit = income.saturating_sub(expenses);
    let gross_margin = percent_of(gross_profit, income);
    let business_expenses = expenses.saturating_sub(personal_expenses);

    let monthly_metrics = monthly_rollup(txns);
    let months = Decimal::from(monthly_metrics.len());

    let revenue_growth = match monthly_metrics.as_slice() {
        [.., prev, last] => growth(last.income, prev.income).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    let top_categories = top_categories(by_category, expenses);

    let profitable = monthly_metrics
        .iter()
        .filter(|m| m.gross_profit > Decimal::ZERO)
        .count();
    let profit_consistency = percent_of(Decimal::from(profitable), months);

    let avg_monthly_expenses = ratio(expenses, months);
    let cash_runway_months = ratio(gross_profit, avg_monthly_expenses);

    let lowest_margin = monthly_metrics
        .iter()
        .map(|m| m.gross_margin)
        .min()
        .unwrap_or(Decimal::ZERO);

    let changes: Vec<Decimal> = monthly_metrics
        .windows(2)
        .filter_map(|w| growth(w[1].income, w[0].income))
        .collect();
    let total_change = changes
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(*c));
    let avg_revenue_growth = ratio(total_change, Decimal::from(changes.len()));

    let break_even_revenue = break_even(ratio(income, months), ratio(business_expenses, months));

    let best_month = extreme_month(&monthly_metrics, |a, b| a > b);
    let worst_month = extreme_month(&monthly_metrics, |a, b| a < b);

    let category_trends = category_trends(txns, &monthly_metrics, &top_categories);

    let avg_transaction_size = ratio(income, Decimal::from(income_count));

    let expansion = expansion_readiness(
        profit_consistency,
        gross_margin,
        avg_revenue_growth,
        lowest_margin,
    );
    let profit_first = profit_first(income, gross_profit, personal_expenses, business_expenses);

    Analytics {
        income,
        expenses,
        gross_profit,
        gross_margin,
        revenue_growth,
        monthly_metrics,
        top_categories,
        personal_expenses,
        business_expenses,
        profit_consistency,
        cash_runway_months,
        lowest_margin,
        avg_revenue_growth,
        break_even_revenue,
        best_month,
        worst_month,
        category_trends,
        avg_transaction_size,
        transaction_count: txns.len(),
        expansion,
        profit_first,
    }
}

fn top_categories(by_category: HashMap<&str, Decimal>, expenses: Decimal) -> Vec<CategoryTotal> {
    let mut items: Vec<(&str, Decimal)> = by_category.into_iter().collect();
    // Name as tie-breaker keeps the order independent of hash iteration.
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items
        .into_iter()
        .take(TOP_CATEGORIES)
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
            share: percent_of(amount, expenses),
        })
        .collect()
}

/// Monthly revenue at which the contribution margin covers average monthly costs.
pub fn break_even(avg_monthly_revenue: Decimal, avg_monthly_cogs: Decimal) -> Decimal {
    let contribution = avg_monthly_revenue
        .checked_sub(avg_monthly_cogs)
        .and_then(|m| m.checked_div(avg_monthly_revenue));
    match contribution {
        Some(c) if c > Decimal::ZERO => ratio(avg_monthly_cogs, c),
        _ => Decimal::ZERO,
    }
}

// First month wins ties.
fn extreme_month(
    metrics: &[MonthlyMetric],
    better: impl Fn(Decimal, Decimal) -> bool,
) -> Option<MonthlyMetric> {
    let mut best: Option<&MonthlyMetric> = None;
    for m in metrics {
        match best {
            Some(b) if !better(m.gross_profit, b.gross_profit) => {}
            _ => best = Some(m),
        }
    }
    best.cloned()
}

fn category_trends(
    txns: &[Transaction],
    metrics: &[MonthlyMetric],
    top: &[CategoryTotal],
) -> Vec<CategoryTrend> {
    let mid = metrics.len() / 2;
    let second_half_start = metrics.get(mid).map(|m| m.month.as_str());
    let mut halves: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        if !top.iter().any(|c| c.category == t.category) {
            continue;
        }
        let entry = halves
            .entry(t.category.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        let key = month_key(t);
        if second_half_start.is_some_and(|start| key.as_str() >= start) {
            entry.1 = entry.1.saturating_add(t.amount);
        } else {
            entry.0 = entry.0.saturating_add(t.amount);
        }
    }
    top.iter()
        .map(|c| {
            let (first_half, second_half) = halves
                .get(c.category.as_str())
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            CategoryTrend {
                category: c.category.clone(),
                first_half,
                second_half,
                change: growth(second_half, first_half).unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}
