// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::compare::{
    self, Comparison, PersonalSummary, compare_fiscal_years, current_vs_previous_month,
};
use crate::analytics::{Analytics, Period, Window, analyze};
use crate::store;
use crate::utils::{
    as_of, fmt_change, fmt_money, fmt_pct, get_currency, json_flags, maybe_print_json,
    parse_date, parse_month, pretty_table, resolve_branch,
};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("analytics", sub)) => analytics(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("yearly", sub)) => yearly(conn, sub)?,
        Some(("personal", sub)) => personal(conn, sub)?,
        Some(("dashboard", sub)) => dashboard(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    pub branch: String,
    pub currency: String,
    pub period: String,
    pub window: Window,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub analytics: Analytics,
}

fn period_from(sub: &clap::ArgMatches) -> Result<Period> {
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let raw = sub
        .get_one::<String>("period")
        .map(String::as_str)
        .unwrap_or("6months");
    // --from/--to on their own imply a custom range.
    if sub.value_source("period") != Some(clap::parser::ValueSource::CommandLine)
        && (from.is_some() || to.is_some())
    {
        return Ok(Period::Custom {
            start: from,
            end: to,
        });
    }
    Period::parse(raw, from, to)
}

/// Fetches the branch's transactions and runs the analytics engine over the chosen period.
pub fn analytics_for(conn: &Connection, sub: &clap::ArgMatches) -> Result<AnalyticsReport> {
    let branch = resolve_branch(conn, sub)?;
    let period = period_from(sub)?;
    let today = as_of(sub)?;
    let txns = store::fetch_transactions(conn, &branch)?;
    let window = period.window(today);
    tracing::info!(branch = %branch, period = %period.label(), ?window, "computing analytics");
    Ok(AnalyticsReport {
        currency: branch_currency(conn, &branch)?,
        period: period.label(),
        window,
        as_of: today,
        analytics: analyze(&txns, &period, today),
        branch,
    })
}

fn branch_currency(conn: &Connection, branch: &str) -> Result<String> {
    match store::get_branch(conn, branch)? {
        Some(b) if !b.currency.is_empty() => Ok(b.currency),
        _ => get_currency(conn),
    }
}

fn analytics(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let report = analytics_for(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }
    let a = &report.analytics;
    let ccy = report.currency.as_str();
    println!("{} | {} (as of {})", report.branch, report.period, report.as_of);
    if a.transaction_count == 0 {
        println!("No transactions in this period.");
        return Ok(());
    }

    let summary = vec![
        vec!["Revenue".into(), fmt_money(&a.income, ccy), fmt_change(&a.revenue_growth)],
        vec!["Expenses".into(), fmt_money(&a.expenses, ccy), String::new()],
        vec!["Gross profit".into(), fmt_money(&a.gross_profit, ccy), String::new()],
        vec!["Gross margin".into(), fmt_pct(&a.gross_margin), String::new()],
        vec!["Business expenses".into(), fmt_money(&a.business_expenses, ccy), String::new()],
        vec!["Personal draws".into(), fmt_money(&a.personal_expenses, ccy), String::new()],
        vec!["Profit consistency".into(), fmt_pct(&a.profit_consistency), String::new()],
        vec!["Cash runway".into(), format!("{:.1} months", a.cash_runway_months), String::new()],
        vec!["Lowest margin".into(), fmt_pct(&a.lowest_margin), String::new()],
        vec!["Avg revenue growth".into(), fmt_change(&a.avg_revenue_growth), String::new()],
        vec!["Break-even revenue".into(), fmt_money(&a.break_even_revenue, ccy), String::new()],
        vec!["Avg income transaction".into(), fmt_money(&a.avg_transaction_size, ccy), String::new()],
        vec!["Transactions".into(), a.transaction_count.to_string(), String::new()],
    ];
    println!("{}", pretty_table(&["Metric", "Value", "Change"], summary));

    let months = a
        .monthly_metrics
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                format!("{:.2}", m.income),
                format!("{:.2}", m.expenses),
                format!("{:.2}", m.gross_profit),
                fmt_pct(&m.gross_margin),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expenses", "Gross Profit", "Margin"], months)
    );
    if let (Some(best), Some(worst)) = (&a.best_month, &a.worst_month) {
        println!(
            "Best month {} ({:.2}), worst month {} ({:.2})",
            best.month, best.gross_profit, worst.month, worst.gross_profit
        );
    }

    let cats = a
        .top_categories
        .iter()
        .zip(&a.category_trends)
        .map(|(c, tr)| {
            vec![
                c.category.clone(),
                format!("{:.2}", c.amount),
                fmt_pct(&c.share),
                fmt_change(&tr.change),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Top Expense Category", "Spent", "Share", "Trend"], cats)
    );

    let e = &a.expansion;
    let factors = e
        .factors
        .iter()
        .map(|f| {
            vec![
                f.name.to_string(),
                fmt_pct(&f.value),
                format!("{}/{}", f.score, f.max),
                f.status.as_str().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Expansion Factor", "Value", "Points", "Status"], factors)
    );
    println!(
        "Expansion readiness: {}/100, grade {} ({})",
        e.score,
        e.grade.letter(),
        e.verdict
    );

    let pf = a
        .profit_first
        .allocations
        .iter()
        .map(|al| {
            vec![
                al.bucket.to_string(),
                fmt_pct(&al.target),
                fmt_pct(&al.actual),
                fmt_change(&al.gap),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Profit First", "Target", "Actual", "Gap"], pf)
    );
    Ok(())
}

fn print_comparison(c: &Comparison, ccy: &str) {
    let row = |name: &str, cur: &Decimal, prev: &Decimal, change: Option<&Decimal>| {
        vec![
            name.to_string(),
            fmt_money(cur, ccy),
            fmt_money(prev, ccy),
            change.map(fmt_change).unwrap_or_default(),
        ]
    };
    let rows = vec![
        row("Income", &c.current.income, &c.previous.income, Some(&c.income_change)),
        row("Expenses", &c.current.expenses, &c.previous.expenses, Some(&c.expenses_change)),
        row(
            "Net profit",
            &c.current.net_profit,
            &c.previous.net_profit,
            Some(&c.net_profit_change),
        ),
        row(
            "Personal draws",
            &c.current.personal_expenses,
            &c.previous.personal_expenses,
            None,
        ),
    ];
    println!(
        "{}",
        pretty_table(
            &["", c.current.label.as_str(), c.previous.label.as_str(), "Change"],
            rows
        )
    );
}

pub fn monthly_comparison(conn: &Connection, sub: &clap::ArgMatches) -> Result<Comparison> {
    let branch = resolve_branch(conn, sub)?;
    let a = parse_month(sub.get_one::<String>("month").unwrap())?;
    let b = parse_month(sub.get_one::<String>("against").unwrap())?;
    let txns = store::fetch_transactions(conn, &branch)?;
    Ok(compare::compare_months(&txns, a, b))
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let c = monthly_comparison(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &c)? {
        let branch = resolve_branch(conn, sub)?;
        print_comparison(&c, &branch_currency(conn, &branch)?);
    }
    Ok(())
}

pub fn yearly_comparison(conn: &Connection, sub: &clap::ArgMatches) -> Result<Comparison> {
    let branch_id = resolve_branch(conn, sub)?;
    let branch = store::get_branch(conn, &branch_id)?
        .with_context(|| format!("Branch '{}' not found", branch_id))?;
    let year = *sub.get_one::<i32>("year").unwrap();
    let against = *sub.get_one::<i32>("against").unwrap();
    let txns = store::fetch_transactions(conn, &branch_id)?;
    Ok(compare_fiscal_years(&txns, year, against, branch.fiscal_year_start))
}

fn yearly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let c = yearly_comparison(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &c)? {
        let branch = resolve_branch(conn, sub)?;
        print_comparison(&c, &branch_currency(conn, &branch)?);
    }
    Ok(())
}

pub fn personal_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<PersonalSummary> {
    let branch = resolve_branch(conn, sub)?;
    let (y, m) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let txns = store::fetch_transactions(conn, &branch)?;
    Ok(compare::personal_summary(&txns, y, m))
}

fn personal(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let p = personal_report(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &p)? {
        return Ok(());
    }
    let branch = resolve_branch(conn, sub)?;
    let ccy = branch_currency(conn, &branch)?;
    println!(
        "{}: personal {} of income {} ({})",
        p.month,
        fmt_money(&p.total_personal, &ccy),
        fmt_money(&p.total_income, &ccy),
        fmt_pct(&p.personal_ratio)
    );
    if p.transactions.is_empty() {
        println!("No personal transactions found for this period.");
        return Ok(());
    }
    let breakdown = p
        .breakdown
        .iter()
        .map(|(c, a)| vec![c.clone(), format!("{:.2}", a)])
        .collect();
    println!("{}", pretty_table(&["Category", "Amount"], breakdown));
    let rows = p
        .transactions
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.description.clone().unwrap_or_default(),
                t.category.clone(),
                format!("{:.2}", t.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Description", "Category", "Amount"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub branch: String,
    pub as_of: NaiveDate,
    pub month: Comparison,
    pub year: Comparison,
}

pub fn dashboard_for(conn: &Connection, sub: &clap::ArgMatches) -> Result<Dashboard> {
    let branch_id = resolve_branch(conn, sub)?;
    let branch = store::get_branch(conn, &branch_id)?
        .with_context(|| format!("Branch '{}' not found", branch_id))?;
    let today = as_of(sub)?;
    let txns = store::fetch_transactions(conn, &branch_id)?;
    // A fiscal year is named after the calendar year it starts in.
    let fy = if today.month() >= branch.fiscal_year_start {
        today.year()
    } else {
        today.year() - 1
    };
    Ok(Dashboard {
        month: current_vs_previous_month(&txns, today),
        year: compare_fiscal_years(&txns, fy, fy - 1, branch.fiscal_year_start),
        as_of: today,
        branch: branch_id,
    })
}

fn dashboard(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let d = dashboard_for(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &d)? {
        let ccy = branch_currency(conn, &d.branch)?;
        println!("{} (as of {})", d.branch, d.as_of);
        print_comparison(&d.month, &ccy);
        print_comparison(&d.year, &ccy);
    }
    Ok(())
}
