// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{arg_id, fmt_amount, fmt_signed, maybe_print_json, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde_json::{json, Value};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("recalc", sub)) => {
            if sub.get_flag("all") {
                let n = store::recalculate_all(conn)?;
                println!("Recalculated {} contracts", n);
            } else if sub.contains_id("id") {
                let id = arg_id(sub, "id")?;
                let s = store::recalculate(conn, id)?;
                println!(
                    "Recalculated assignment {}: {} days, salary {}, profit {}",
                    id,
                    s.days_worked,
                    fmt_amount(&s.total_salary),
                    fmt_signed(&s.total_profit)
                );
            } else {
                return Err(anyhow!("Pass --id ID or --all"));
            }
        }
        _ => {}
    }
    Ok(())
}

/// JSON form of `summary show`. Totals are left out until the contract is final.
pub fn json_view(view: &store::SummaryView) -> Result<Value> {
    if !view.is_final() {
        return Ok(json!({
            "assignment_id": view.assignment_id,
            "status": view.status,
            "contract_days": view.contract_days,
            "days_recorded": view.summary.days_worked,
            "is_final": false,
        }));
    }
    let mut v = serde_json::to_value(view)?;
    v["is_final"] = Value::Bool(true);
    Ok(v)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let view = store::contract_summary(conn, id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &json_view(&view)?)? {
        return Ok(());
    }
    if !view.is_final() {
        println!(
            "Assignment {} is {}: {} of {} contracted days recorded. The summary is available once it has ended.",
            id, view.status, view.summary.days_worked, view.contract_days
        );
        return Ok(());
    }
    let s = &view.summary;
    let rows = vec![
        vec!["Status".into(), view.status.to_string()],
        vec![
            "Days worked".into(),
            format!("{} of {}", s.days_worked, view.contract_days),
        ],
        vec!["Drinks".into(), s.total_drinks.to_string()],
        vec![
            "Special commissions".into(),
            fmt_amount(&s.total_special_commissions),
        ],
        vec!["Commission paid".into(), fmt_amount(&s.total_commission)],
        vec!["Salary paid".into(), fmt_amount(&s.total_salary)],
        vec!["Profit".into(), fmt_signed(&s.total_profit)],
    ];
    let title = id.to_string();
    println!("{}", pretty_table(&["Assignment", title.as_str()], rows));
    Ok(())
}
