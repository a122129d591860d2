// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::MAX_CONTRACT_DAYS;
use crate::config::TemplateDefaults;
use crate::models::ContractTemplate;
use crate::utils::{maybe_print_json, parse_amount, parse_time, pretty_table, stored_decimal};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => {
            let templates = list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &templates)? {
                let rows = templates
                    .into_iter()
                    .map(|t| {
                        vec![
                            t.name,
                            t.days.to_string(),
                            t.late_cutoff.format("%H:%M").to_string(),
                            t.first_minute_penalty.to_string(),
                            t.additional_minute_penalty.to_string(),
                            t.drink_commission_staff.to_string(),
                            t.drink_revenue_bar.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &[
                            "Name",
                            "Days",
                            "Cutoff",
                            "1st min",
                            "Per min",
                            "Staff/drink",
                            "Bar/drink"
                        ],
                        rows
                    )
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute(
                "DELETE FROM contract_templates WHERE name=?1",
                params![name],
            )?;
            if n == 0 {
                return Err(anyhow!("Contract template '{}' not found", name));
            }
            println!("Removed template '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn amount_or(sub: &clap::ArgMatches, name: &str, default: Decimal) -> Result<Decimal> {
    let Some(raw) = sub.get_one::<String>(name) else {
        return Ok(default);
    };
    parse_amount(raw, &format!("--{}", name.replace('_', "-")))
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let days_raw = sub.get_one::<String>("days").unwrap();
    let days: u32 = days_raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid days '{}'", days_raw))?;
    if days == 0 {
        return Err(anyhow!("A contract must last at least one day"));
    }
    if days > MAX_CONTRACT_DAYS {
        return Err(anyhow!(
            "A contract cannot last more than {} days",
            MAX_CONTRACT_DAYS
        ));
    }
    let defaults = TemplateDefaults::load(conn)?;
    let cutoff = match sub.get_one::<String>("cutoff") {
        Some(raw) => parse_time(raw)?,
        None => defaults.late_cutoff,
    };
    let first = amount_or(sub, "first_penalty", defaults.first_minute_penalty)?;
    let additional = amount_or(sub, "additional_penalty", defaults.additional_minute_penalty)?;
    let commission = amount_or(sub, "commission", defaults.drink_commission_staff)?;
    let revenue = amount_or(sub, "drink_revenue", defaults.drink_revenue_bar)?;

    conn.execute(
        "INSERT INTO contract_templates(name, days, late_cutoff, first_minute_penalty,
             additional_minute_penalty, drink_commission_staff, drink_revenue_bar)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            name,
            days,
            cutoff.format("%H:%M").to_string(),
            first.to_string(),
            additional.to_string(),
            commission.to_string(),
            revenue.to_string(),
        ],
    )
    .with_context(|| format!("Could not add template '{}'", name))?;
    info!(name, days, "added contract template");
    println!(
        "Added template '{}' ({} days, late after {})",
        name,
        days,
        cutoff.format("%H:%M")
    );
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<ContractTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, days, late_cutoff, first_minute_penalty, additional_minute_penalty,
            drink_commission_staff, drink_revenue_bar
         FROM contract_templates ORDER BY days, name",
    )?;
    let mut cur = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = cur.next()? {
        let cutoff: String = r.get(3)?;
        let first: String = r.get(4)?;
        let additional: String = r.get(5)?;
        let commission: String = r.get(6)?;
        let revenue: String = r.get(7)?;
        data.push(ContractTemplate {
            id: r.get(0)?,
            name: r.get(1)?,
            days: r.get(2)?,
            late_cutoff: parse_time(&cutoff)?,
            first_minute_penalty: stored_decimal(&first, "first minute penalty")?,
            additional_minute_penalty: stored_decimal(&additional, "additional minute penalty")?,
            drink_commission_staff: stored_decimal(&commission, "drink commission")?,
            drink_revenue_bar: stored_decimal(&revenue, "drink revenue")?,
        });
    }
    Ok(data)
}
