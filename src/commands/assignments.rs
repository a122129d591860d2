// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::ContractStatus;
use crate::store::{self, NewAssignment, PayrollFilter};
use crate::utils::{arg_id, fmt_amount, maybe_print_json, parse_amount, parse_date, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => create(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("end", sub)) => {
            let id = arg_id(sub, "id")?;
            let on = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?,
                None => chrono::Local::now().date_naive(),
            };
            let a = store::end_early(conn, id, on)?;
            println!(
                "Ended assignment {} on {} ({} of {} contracted days)",
                a.id,
                a.end_date,
                a.current_days(),
                a.terms.contract_days
            );
        }
        Some(("finalize", sub)) => {
            let id = arg_id(sub, "id")?;
            let target: ContractStatus = sub.get_one::<String>("status").unwrap().parse()?;
            if target == ContractStatus::Ongoing {
                return Err(anyhow!("Final status must be ended or archived"));
            }
            let a = store::finalize(conn, id, target)?;
            println!("Assignment {} is now {}", a.id, a.status);
        }
        Some(("rm", sub)) => {
            let id = arg_id(sub, "id")?;
            store::delete_assignment(conn, id)?;
            println!("Removed assignment {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn create(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let salary = parse_amount(sub.get_one::<String>("salary").unwrap(), "Base salary")?;
    let a = store::create_assignment(
        conn,
        NewAssignment {
            staff: sub.get_one::<String>("staff").unwrap().trim(),
            venue: sub.get_one::<String>("venue").unwrap().trim(),
            role: sub.get_one::<String>("role").unwrap().trim(),
            template: sub.get_one::<String>("template").unwrap().trim(),
            manager: sub
                .get_one::<String>("manager")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty()),
            start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
            base_salary: salary,
        },
    )?;
    println!(
        "Created assignment {}: {} at {} from {} to {} (base {})",
        a.id,
        a.staff,
        a.venue,
        a.start_date,
        a.end_date,
        fmt_amount(&a.terms.base_salary)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = PayrollFilter {
        status: sub
            .get_one::<String>("status")
            .map(|s| s.parse())
            .transpose()?,
        ..Default::default()
    };
    let rows = store::payroll_rows(conn, &filter)?;
    let assignments: Vec<_> = rows.iter().map(|r| &r.assignment).collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &assignments)? {
        let data = rows
            .iter()
            .map(|r| {
                let a = &r.assignment;
                vec![
                    a.id.to_string(),
                    a.staff.clone(),
                    a.venue.clone(),
                    a.role.clone(),
                    a.template.clone(),
                    a.start_date.to_string(),
                    a.end_date.to_string(),
                    format!("{}/{}", r.summary.days_worked, r.current_days),
                    a.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Staff", "Venue", "Role", "Template", "Start", "End", "Recorded",
                    "Status"
                ],
                data
            )
        );
    }
    Ok(())
}
