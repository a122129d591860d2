// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::utils::{parse_amount, parse_decimal, parse_time};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "PAYDESK_LOG";

/// Known settings and their built-in values.
pub const KNOWN_SETTINGS: &[(&str, &str)] = &[
    ("default_late_cutoff", "19:30"),
    ("default_first_minute_penalty", "0"),
    ("default_additional_minute_penalty", "5"),
    ("default_drink_commission_staff", "100"),
    ("default_drink_revenue_bar", "220"),
];

/// Terms a new contract template starts from when the caller leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefaults {
    pub late_cutoff: NaiveTime,
    pub first_minute_penalty: Decimal,
    pub additional_minute_penalty: Decimal,
    pub drink_commission_staff: Decimal,
    pub drink_revenue_bar: Decimal,
}

impl TemplateDefaults {
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            late_cutoff: parse_time(&get_setting(conn, "default_late_cutoff")?)?,
            first_minute_penalty: parse_decimal(&get_setting(
                conn,
                "default_first_minute_penalty",
            )?)?,
            additional_minute_penalty: parse_decimal(&get_setting(
                conn,
                "default_additional_minute_penalty",
            )?)?,
            drink_commission_staff: parse_decimal(&get_setting(
                conn,
                "default_drink_commission_staff",
            )?)?,
            drink_revenue_bar: parse_decimal(&get_setting(conn, "default_drink_revenue_bar")?)?,
        })
    }
}

fn builtin(key: &str) -> Option<&'static str> {
    KNOWN_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<String> {
    let default = builtin(key).ok_or_else(|| anyhow!("Unknown setting '{}'", key))?;
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| default.to_string()))
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if builtin(key).is_none() {
        return Err(anyhow!("Unknown setting '{}'", key));
    }
    let value = value.trim();
    if key == "default_late_cutoff" {
        parse_time(value)?;
    } else {
        parse_amount(value, &format!("Setting '{}'", key))?;
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_settings(conn: &Connection) -> Result<Vec<(String, String)>> {
    KNOWN_SETTINGS
        .iter()
        .map(|(k, _)| Ok((k.to_string(), get_setting(conn, k)?)))
        .collect()
}
