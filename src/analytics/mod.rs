// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure reporting over a branch's transactions. Nothing in here touches the
//! database or the clock; callers pass the transactions and "today" in.

pub mod compare;
pub mod metrics;
pub mod period;
pub mod rollup;
pub mod scoring;

pub use compare::{Comparison, PeriodTotals, PersonalSummary, percent_change};
pub use metrics::{Analytics, CategoryTotal, CategoryTrend, aggregate, analyze};
pub use period::{Period, Window};
pub use rollup::{MonthlyMetric, monthly_rollup};
pub use scoring::{ExpansionFactor, ExpansionReadiness, FactorStatus, Grade, ProfitFirst};
