// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expansion-readiness grading and Profit-First allocation targets.

use super::rollup::percent_of;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

pub const FACTOR_MAX: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Good,
    Okay,
    Poor,
}

impl FactorStatus {
    pub fn points(&self) -> u32 {
        match self {
            FactorStatus::Good => 25,
            FactorStatus::Okay => 15,
            FactorStatus::Poor => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorStatus::Good => "good",
            FactorStatus::Okay => "okay",
            FactorStatus::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionFactor {
    pub name: &'static str,
    pub value: Decimal,
    pub score: u32,
    pub max: u32,
    pub status: FactorStatus,
}

/// Grades `value` against the `good` and `okay` lower bounds (both inclusive).
pub fn classify(name: &'static str, value: Decimal, good: Decimal, okay: Decimal) -> ExpansionFactor {
    let status = if value >= good {
        FactorStatus::Good
    } else if value >= okay {
        FactorStatus::Okay
    } else {
        FactorStatus::Poor
    };
    ExpansionFactor {
        name,
        value,
        score: status.points(),
        max: FACTOR_MAX,
        status,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => Grade::A,
            70..=84 => Grade::B,
            55..=69 => Grade::C,
            40..=54 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            Grade::A => "Ready",
            Grade::B | Grade::C => "Almost Ready",
            Grade::D | Grade::F => "Not Yet",
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionReadiness {
    pub score: u32,
    pub grade: Grade,
    pub verdict: &'static str,
    pub factors: Vec<ExpansionFactor>,
}

/// Inputs are percentages; every factor contributes between 5 and 25 points.
pub fn expansion_readiness(
    profit_consistency: Decimal,
    gross_margin: Decimal,
    avg_revenue_growth: Decimal,
    lowest_margin: Decimal,
) -> ExpansionReadiness {
    let factors = vec![
        classify("Profit consistency", profit_consistency, dec!(80), dec!(60)),
        classify("Gross margin", gross_margin, dec!(50), dec!(30)),
        classify("Revenue growth", avg_revenue_growth, dec!(5), dec!(0)),
        classify("Margin stability", lowest_margin, dec!(30), dec!(10)),
    ];
    let score: u32 = factors.iter().map(|f| f.score).sum();
    let grade = Grade::from_score(score);
    ExpansionReadiness {
        score,
        grade,
        verdict: grade.verdict(),
        factors,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub bucket: &'static str,
    pub target: Decimal,
    pub actual: Decimal,
    pub gap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitFirst {
    pub allocations: Vec<Allocation>,
}

/// Actual shares of income against the fixed Profit-First targets.
///
/// Profit is gross profit, owner pay is personal draws and opex is business
/// expenses. Tax reserves are not tracked, so their actual share is always zero.
pub fn profit_first(
    income: Decimal,
    gross_profit: Decimal,
    personal_expenses: Decimal,
    business_expenses: Decimal,
) -> ProfitFirst {
    let rows = [
        ("Profit", dec!(10), percent_of(gross_profit, income)),
        ("Owner Pay", dec!(40), percent_of(personal_expenses, income)),
        ("Operating Expenses", dec!(40), percent_of(business_expenses, income)),
        ("Tax", dec!(15), Decimal::ZERO),
    ];
    ProfitFirst {
        allocations: rows
            .into_iter()
            .map(|(bucket, target, actual)| Allocation {
                bucket,
                target,
                actual,
                gap: actual.saturating_sub(target),
            })
            .collect(),
    }
}
