// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{performance, reports};
use crate::store;
use crate::utils::{arg_id, fmt_time};
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("payroll", sub)) => export_payroll(conn, sub),
        Some(("records", sub)) => export_records(conn, sub),
        _ => Ok(()),
    }
}

fn format_arg(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    match fmt.as_str() {
        "csv" | "json" => Ok(fmt),
        _ => Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
}

fn export_payroll(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_arg(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    let filter = reports::filter_from_args(sub)?;
    let rows = store::payroll_rows(conn, &filter)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "staff",
                "venue",
                "role",
                "template",
                "manager",
                "start_date",
                "end_date",
                "status",
                "contract_days",
                "days_worked",
                "total_drinks",
                "total_special_commissions",
                "total_commission",
                "total_salary",
                "total_profit",
            ])?;
            for r in &rows {
                let a = &r.assignment;
                let s = &r.summary;
                wtr.write_record([
                    a.id.to_string(),
                    a.staff.clone(),
                    a.venue.clone(),
                    a.role.clone(),
                    a.template.clone(),
                    a.manager.clone().unwrap_or_default(),
                    a.start_date.to_string(),
                    a.end_date.to_string(),
                    a.status.to_string(),
                    a.terms.contract_days.to_string(),
                    s.days_worked.to_string(),
                    s.total_drinks.to_string(),
                    s.total_special_commissions.to_string(),
                    s.total_commission.to_string(),
                    s.total_salary.to_string(),
                    s.total_profit.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let totals = store::payroll_totals(&rows);
            let doc = json!({ "assignments": rows, "totals": totals });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    println!("Exported {} assignments to {}", rows.len(), out);
    Ok(())
}

fn export_records(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_arg(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    let id = arg_id(sub, "id")?;
    let rows = performance::query_rows(conn, id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "record_date",
                "arrival_time",
                "departure_time",
                "drinks_sold",
                "special_commissions",
                "bonus",
                "malus",
                "lateness_penalty",
                "commission_paid",
                "prorated_base",
                "daily_salary",
                "daily_profit",
            ])?;
            for row in &rows {
                let p = &row.record.performance;
                let r = &row.result;
                wtr.write_record([
                    row.record.record_date.to_string(),
                    fmt_time(p.arrival_time),
                    fmt_time(p.departure_time),
                    p.drinks_sold.to_string(),
                    p.special_commissions.to_string(),
                    p.bonus.to_string(),
                    p.malus.to_string(),
                    r.lateness_penalty.to_string(),
                    r.commission_paid.to_string(),
                    r.prorated_base.to_string(),
                    r.daily_salary.to_string(),
                    r.daily_profit.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
    }
    println!("Exported {} records to {}", rows.len(), out);
    Ok(())
}
