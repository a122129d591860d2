// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{self, PayrollFilter, PayrollRow};
use crate::utils::{fmt_amount, fmt_signed, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("payroll", sub)) => payroll(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Reads the shared payroll filter flags; blank values are ignored.
pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<PayrollFilter> {
    let text = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    Ok(PayrollFilter {
        status: text("status").map(|s| s.parse()).transpose()?,
        template: text("template"),
        venue: text("venue"),
        nickname: text("nickname"),
        manager: text("manager"),
        from: text("from").map(|s| parse_date(&s)).transpose()?,
        to: text("to").map(|s| parse_date(&s)).transpose()?,
    })
}

fn payroll(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = filter_from_args(sub)?;
    let rows = store::payroll_rows(conn, &filter)?;
    let totals = store::payroll_totals(&rows);

    let out = json!({ "assignments": rows, "totals": totals });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Staff", "Venue", "Template", "Period", "Days", "Drinks", "Special",
                    "Salary", "Commission", "Profit", "Status"
                ],
                rows.iter().map(table_row).collect()
            )
        );
        println!(
            "Total profit: {}   Total salary: {}   Days worked: {}",
            fmt_signed(&totals.total_profit),
            fmt_amount(&totals.total_salary),
            totals.total_days_worked
        );
    }
    Ok(())
}

fn table_row(r: &PayrollRow) -> Vec<String> {
    let a = &r.assignment;
    let s = &r.summary;
    vec![
        a.id.to_string(),
        a.staff.clone(),
        a.venue.clone(),
        a.template.clone(),
        format!("{} to {}", a.start_date, a.end_date),
        format!("{}/{}", s.days_worked, a.terms.contract_days),
        s.total_drinks.to_string(),
        fmt_amount(&s.total_special_commissions),
        fmt_amount(&s.total_salary),
        fmt_amount(&s.total_commission),
        fmt_signed(&s.total_profit),
        a.status.to_string(),
    ]
}
