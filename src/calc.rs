// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily payroll arithmetic.
//!
//! Every figure shown to a user, whether a live preview or a saved record,
//! goes through [`daily_result`]. Nothing here touches the database and
//! nothing here can fail: bad input degrades to zero.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::models::{
    ContractSummary, ContractTerms, DailyPerformance, DerivedDailyResult, RawPerformance,
};

/// Largest amount a single field may hold. Form input above it is treated as
/// a typo and read as zero; configured terms above it are rejected.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Longest contract a template may describe.
pub const MAX_CONTRACT_DAYS: u32 = 3660;

/// Whole minutes past the cutoff, rounded to the nearest minute. Both times
/// are taken on the same day, so an arrival before the cutoff is never late.
pub fn minutes_late(arrival: Option<NaiveTime>, cutoff: NaiveTime) -> i64 {
    let Some(arrival) = arrival else {
        return 0;
    };
    let secs = arrival.signed_duration_since(cutoff).num_seconds();
    if secs <= 0 {
        return 0;
    }
    (secs + 30) / 60
}

pub fn lateness_penalty(arrival: Option<NaiveTime>, terms: &ContractTerms) -> Decimal {
    match minutes_late(arrival, terms.late_cutoff) {
        0 => Decimal::ZERO,
        1 => terms.first_minute_penalty,
        m => terms.first_minute_penalty.saturating_add(
            Decimal::from(m - 1).saturating_mul(terms.additional_minute_penalty),
        ),
    }
}

/// Base salary per day over the originally contracted length.
pub fn prorated_base(terms: &ContractTerms) -> Decimal {
    if terms.contract_days == 0 {
        return Decimal::ZERO;
    }
    terms.base_salary / Decimal::from(terms.contract_days)
}

pub fn commission_paid(drinks_sold: u32, terms: &ContractTerms) -> Decimal {
    Decimal::from(drinks_sold).saturating_mul(terms.drink_commission_staff)
}

pub fn daily_result(day: &DailyPerformance, terms: &ContractTerms) -> DerivedDailyResult {
    let lateness_penalty = lateness_penalty(day.arrival_time, terms);
    let commission_paid = commission_paid(day.drinks_sold, terms);
    let prorated_base = prorated_base(terms);
    // Saturating so records built outside `normalize` cannot overflow.
    let daily_salary = prorated_base
        .saturating_add(day.bonus)
        .saturating_sub(day.malus)
        .saturating_sub(lateness_penalty);
    let bar_revenue = Decimal::from(day.drinks_sold)
        .saturating_mul(terms.drink_revenue_bar)
        .saturating_add(day.special_commissions);
    DerivedDailyResult {
        lateness_penalty,
        commission_paid,
        prorated_base,
        daily_salary,
        daily_profit: bar_revenue.saturating_sub(daily_salary),
    }
}

pub fn summarize<'a, I>(days: I, terms: &ContractTerms) -> ContractSummary
where
    I: IntoIterator<Item = &'a DailyPerformance>,
{
    let mut summary = ContractSummary::default();
    for day in days {
        let r = daily_result(day, terms);
        summary.days_worked += 1;
        summary.total_drinks += u64::from(day.drinks_sold);
        summary.total_special_commissions = summary
            .total_special_commissions
            .saturating_add(day.special_commissions);
        summary.total_commission = summary.total_commission.saturating_add(r.commission_paid);
        summary.total_salary = summary.total_salary.saturating_add(r.daily_salary);
        summary.total_profit = summary.total_profit.saturating_add(r.daily_profit);
    }
    debug!(
        days_worked = summary.days_worked,
        total_salary = %summary.total_salary,
        total_profit = %summary.total_profit,
        "summarized contract"
    );
    summary
}

/// Live figures for an in-progress edit. Uses the same path as a saved record.
pub fn preview(raw: &RawPerformance, terms: &ContractTerms) -> DerivedDailyResult {
    daily_result(&raw.normalize(), terms)
}

impl RawPerformance {
    /// Coerce form input into a daily record. Unparseable, negative or
    /// oversized numbers become zero and unparseable times become absent.
    pub fn normalize(&self) -> DailyPerformance {
        DailyPerformance {
            arrival_time: lenient_time(self.arrival_time.as_deref()),
            departure_time: lenient_time(self.departure_time.as_deref()),
            drinks_sold: lenient_count(self.drinks_sold.as_deref()),
            special_commissions: lenient_amount(self.special_commissions.as_deref()),
            bonus: lenient_amount(self.bonus.as_deref()),
            malus: lenient_amount(self.malus.as_deref()),
        }
    }
}

fn lenient_time(raw: Option<&str>) -> Option<NaiveTime> {
    raw.and_then(|s| crate::utils::parse_time(s).ok())
}

fn lenient_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
        .filter(|d| d.is_sign_positive() && *d <= Decimal::from(MAX_AMOUNT))
        .unwrap_or(Decimal::ZERO)
}

fn lenient_count(raw: Option<&str>) -> u32 {
    let Some(s) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(n) = s.parse::<u32>() {
        return n;
    }
    s.parse::<Decimal>()
        .ok()
        .filter(|d| d.is_sign_positive())
        .and_then(|d| d.trunc().to_u32())
        .unwrap_or(0)
}
