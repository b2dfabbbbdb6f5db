// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Conversion of loosely-typed input rows into [`NewTransaction`] values.
//!
//! Spreadsheet exports hand us dates as ISO strings, US-style strings or Excel
//! serial day numbers, amounts with thousands separators, and categories that
//! may be blank. Everything is normalised here so that storage and analytics
//! only ever see one shape.

use crate::models::{EntryMethod, NewTransaction, TxnType, UNCATEGORIZED};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("invalid date '{0}', expected YYYY-MM-DD, MM/DD/YYYY or an Excel serial number")]
    InvalidDate(String),
    #[error("invalid transaction type '{0}', expected income or expense")]
    InvalidType(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

// Day zero of the 1900 date system, shifted to absorb the phantom 1900-02-29.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Parses any date representation we accept at import time into a business date.
pub fn parse_txn_date(raw: &str) -> Result<NaiveDate, IngestError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(IngestError::MissingField("date"));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Ok(d);
    }
    if let Ok(serial) = s.parse::<f64>() {
        return excel_serial_to_date(serial).ok_or_else(|| IngestError::InvalidDate(s.into()));
    }
    Err(IngestError::InvalidDate(s.into()))
}

/// Excel stores dates as days since 1899-12-30; the fractional part is the time of day.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Malformed or negative amounts become zero rather than rejecting the row.
pub fn parse_amount_lenient(raw: &str) -> Decimal {
    parse_amount(raw)
        .ok()
        .filter(|d| !d.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

/// Decimal places every stored amount is rounded to.
pub const AMOUNT_SCALE: u32 = 2;

/// Strict amount parsing used for manual entry. The result is rounded half away
/// from zero to [`AMOUNT_SCALE`] places.
pub fn parse_amount(raw: &str) -> Result<Decimal, IngestError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(IngestError::InvalidAmount(raw.trim().into()));
    }
    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(|d| d.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .map_err(|_| IngestError::InvalidAmount(raw.trim().into()))
}

/// Empty input counts as an expense, matching bulk spreadsheet uploads.
pub fn parse_txn_type(raw: &str) -> Result<TxnType, IngestError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "expense" | "expenses" => Ok(TxnType::Expense),
        "income" => Ok(TxnType::Income),
        _ => Err(IngestError::InvalidType(raw.trim().into())),
    }
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// One row of a transactions CSV, exactly as it appears in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransaction {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub is_personal: Option<String>,
    pub branch: Option<String>,
}

impl RawTransaction {
    /// Returns the branch named on the row, if any.
    pub fn branch_id(&self) -> Option<String> {
        non_empty(self.branch.clone())
    }

    pub fn normalize(
        self,
        default_branch: &str,
        user_id: Option<i64>,
        entry_method: EntryMethod,
    ) -> Result<NewTransaction, IngestError> {
        let branch_id = self
            .branch_id()
            .unwrap_or_else(|| default_branch.to_string());
        let date = parse_txn_date(self.date.as_deref().unwrap_or(""))?;
        let kind = parse_txn_type(self.kind.as_deref().unwrap_or(""))?;
        let amount = parse_amount_lenient(self.amount.as_deref().unwrap_or(""));
        Ok(NewTransaction {
            branch_id,
            user_id,
            date,
            kind,
            category: normalize_category(self.category.as_deref()),
            amount,
            description: non_empty(self.description),
            source: non_empty(self.source),
            is_personal: self.is_personal.as_deref().map(parse_flag).unwrap_or(false),
            entry_method,
        })
    }
}

/// One row of the wide daily-ledger workbook export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Date", alias = "date")]
    pub date: Option<String>,
    #[serde(rename = "Income details", default)]
    pub income_details: Option<String>,
    #[serde(rename = "Income Amount", default)]
    pub income_amount: Option<String>,
    #[serde(rename = "Expenses details", default)]
    pub expense_details: Option<String>,
    #[serde(rename = "Expenses Amount", default)]
    pub expense_amount: Option<String>,
    #[serde(rename = "Personal Details", default)]
    pub personal_details: Option<String>,
    #[serde(rename = "Personal Expenses", default)]
    pub personal_amount: Option<String>,
}

impl LedgerRow {
    /// Splits the row into at most three transactions, skipping zero amounts.
    pub fn expand(
        self,
        branch_id: &str,
        user_id: Option<i64>,
    ) -> Result<Vec<NewTransaction>, IngestError> {
        let date = parse_txn_date(self.date.as_deref().unwrap_or(""))?;
        let columns = [
            (TxnType::Income, "Income", false, self.income_amount, self.income_details),
            (TxnType::Expense, "Expense", false, self.expense_amount, self.expense_details),
            (TxnType::Expense, "Personal", true, self.personal_amount, self.personal_details),
        ];
        let mut out = Vec::new();
        for (kind, category, is_personal, amount, details) in columns {
            let amount = parse_amount_lenient(amount.as_deref().unwrap_or(""));
            if amount.is_zero() {
                continue;
            }
            let details = non_empty(details);
            out.push(NewTransaction {
                branch_id: branch_id.to_string(),
                user_id,
                date,
                kind,
                category: category.to_string(),
                amount,
                description: details.clone(),
                source: details,
                is_personal,
                entry_method: EntryMethod::Bulk,
            });
        }
        Ok(out)
    }
}
