// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned when a record arrives without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub currency: String,
    pub fiscal_year_start: u32,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Income => "income",
            TxnType::Expense => "expense",
        }
    }

    pub fn from_db(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(TxnType::Income),
            "expense" => Ok(TxnType::Expense),
            other => Err(anyhow!("Unknown transaction type '{}' in database", other)),
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryMethod {
    Bulk,
    Manual,
    DailyUpload,
}

impl EntryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMethod::Bulk => "bulk",
            EntryMethod::Manual => "manual",
            EntryMethod::DailyUpload => "daily-upload",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "bulk" => EntryMethod::Bulk,
            "daily-upload" => EntryMethod::DailyUpload,
            _ => EntryMethod::Manual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub branch_id: String,
    pub user_id: Option<i64>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TxnType,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub source: Option<String>,
    pub is_personal: bool,
    pub entry_method: EntryMethod,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxnType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnType::Expense
    }
}

/// A normalised record that has passed the ingestion boundary but has no id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub branch_id: String,
    pub user_id: Option<i64>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TxnType,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub source: Option<String>,
    pub is_personal: bool,
    pub entry_method: EntryMethod,
}
