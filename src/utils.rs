// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::PayrollError;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts `HH:MM` and `HH:MM:SS`, 24-hour.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("Invalid time '{}', expected HH:MM", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// A configured amount such as a salary or a per-drink rate: non-negative and
/// no larger than [`crate::calc::MAX_AMOUNT`].
pub fn parse_amount(s: &str, what: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(anyhow!("{} must not be negative", what));
    }
    if d > Decimal::from(crate::calc::MAX_AMOUNT) {
        return Err(anyhow!(
            "{} must not exceed {}",
            what,
            crate::calc::MAX_AMOUNT
        ));
    }
    Ok(d)
}

/// Stored amounts are TEXT; a bad value is data corruption, not user input.
pub fn stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, s))
}

pub fn fmt_time(t: Option<NaiveTime>) -> String {
    t.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
}

/// Whole currency units, the way amounts are shown everywhere.
pub fn fmt_amount(d: &Decimal) -> String {
    format!("{:.0}", d.round_dp(0))
}

/// Profit with an explicit sign marker.
pub fn fmt_signed(d: &Decimal) -> String {
    let rounded = d.round_dp(0);
    if rounded.is_zero() {
        "0".to_string()
    } else if rounded.is_sign_positive() {
        format!("+{:.0}", rounded)
    } else {
        format!("{:.0}", rounded)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_staff(conn: &Connection, nickname: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM staff WHERE nickname=?1",
            params![nickname],
            |r| r.get(0),
        )
        .optional()?;
    id.ok_or_else(|| PayrollError::UnknownStaff(nickname.to_string()).into())
}

pub fn id_for_venue(conn: &Connection, name: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row("SELECT id FROM venues WHERE name=?1", params![name], |r| {
            r.get(0)
        })
        .optional()?;
    id.ok_or_else(|| PayrollError::UnknownVenue(name.to_string()).into())
}

/// Reads a positive integer id argument, tolerating surrounding whitespace.
pub fn arg_id(sub: &clap::ArgMatches, name: &str) -> Result<i64> {
    let raw = sub
        .get_one::<String>(name)
        .with_context(|| format!("Missing --{}", name))?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
