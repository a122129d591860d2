// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of an assignment. `Ended` and `Archived` are terminal for
/// reporting; only `Archived` freezes the daily records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Ongoing,
    #[serde(alias = "completed")]
    Ended,
    Archived,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Ongoing => "ongoing",
            ContractStatus::Ended => "ended",
            ContractStatus::Archived => "archived",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::Ended | ContractStatus::Archived)
    }

    pub fn accepts_records(&self) -> bool {
        !matches!(self, ContractStatus::Archived)
    }

    pub fn can_transition_to(&self, target: ContractStatus) -> bool {
        matches!(
            (self, target),
            (ContractStatus::Ongoing, ContractStatus::Ended)
                | (ContractStatus::Ongoing, ContractStatus::Archived)
                | (ContractStatus::Ended, ContractStatus::Archived)
        )
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ongoing" => Ok(ContractStatus::Ongoing),
            "ended" | "completed" => Ok(ContractStatus::Ended),
            "archived" => Ok(ContractStatus::Archived),
            other => Err(anyhow::anyhow!(
                "Invalid status '{}', expected ongoing|ended|archived",
                other
            )),
        }
    }
}

/// Terms the calculator works from. `contract_days` is the length the
/// contract was signed for and never shrinks when the contract ends early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub contract_days: u32,
    pub base_salary: Decimal,
    #[serde(with = "hhmm")]
    pub late_cutoff: NaiveTime,
    pub first_minute_penalty: Decimal,
    pub additional_minute_penalty: Decimal,
    pub drink_commission_staff: Decimal,
    pub drink_revenue_bar: Decimal,
}

/// Mutable fields of one day's performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyPerformance {
    #[serde(with = "hhmm_opt")]
    pub arrival_time: Option<NaiveTime>,
    #[serde(with = "hhmm_opt")]
    pub departure_time: Option<NaiveTime>,
    pub drinks_sold: u32,
    pub special_commissions: Decimal,
    pub bonus: Decimal,
    pub malus: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub id: i64,
    pub assignment_id: i64,
    pub record_date: NaiveDate,
    #[serde(flatten)]
    pub performance: DailyPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedDailyResult {
    pub lateness_penalty: Decimal,
    pub commission_paid: Decimal,
    pub prorated_base: Decimal,
    pub daily_salary: Decimal,
    pub daily_profit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub days_worked: u32,
    pub total_drinks: u64,
    pub total_special_commissions: Decimal,
    pub total_commission: Decimal,
    pub total_salary: Decimal,
    pub total_profit: Decimal,
}

/// Untrusted form input for a daily record; see `normalize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPerformance {
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub drinks_sold: Option<String>,
    pub special_commissions: Option<String>,
    pub bonus: Option<String>,
    pub malus: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractTemplate {
    pub id: i64,
    pub name: String,
    pub days: u32,
    #[serde(with = "hhmm")]
    pub late_cutoff: NaiveTime,
    pub first_minute_penalty: Decimal,
    pub additional_minute_penalty: Decimal,
    pub drink_commission_staff: Decimal,
    pub drink_revenue_bar: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub nickname: String,
    pub status: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub staff: String,
    pub venue: String,
    pub role: String,
    pub template: String,
    pub manager: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
    pub terms: ContractTerms,
}

impl Assignment {
    /// Days between start and (possibly shortened) end, inclusive.
    pub fn current_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        crate::utils::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw {
            Some(r) if !r.trim().is_empty() => crate::utils::parse_time(&r)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
