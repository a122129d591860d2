// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc;
use crate::models::{DerivedDailyResult, PerformanceRecord, RawPerformance};
use crate::store;
use crate::utils::{arg_id, fmt_amount, fmt_signed, fmt_time, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(conn, sub)?,
        Some(("preview", sub)) => preview(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Form fields as typed; validation happens in `RawPerformance::normalize`.
pub fn raw_from_args(sub: &clap::ArgMatches) -> RawPerformance {
    let field = |name: &str| sub.get_one::<String>(name).cloned();
    RawPerformance {
        arrival_time: field("arrival"),
        departure_time: field("departure"),
        drinks_sold: field("drinks"),
        special_commissions: field("special"),
        bonus: field("bonus"),
        malus: field("malus"),
    }
}

#[derive(Serialize)]
pub struct RecordRow {
    #[serde(flatten)]
    pub record: PerformanceRecord,
    #[serde(flatten)]
    pub result: DerivedDailyResult,
}

fn result_cells(r: &DerivedDailyResult) -> Vec<String> {
    vec![
        fmt_amount(&r.lateness_penalty),
        fmt_amount(&r.commission_paid),
        fmt_amount(&r.prorated_base),
        fmt_amount(&r.daily_salary),
        fmt_signed(&r.daily_profit),
    ]
}

const RESULT_HEADERS: [&str; 5] = ["Late penalty", "Commission", "Base", "Salary", "Profit"];

fn record(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let day = raw_from_args(sub).normalize();
    let (_, result) = store::upsert_record(conn, id, date, &day)?;
    println!(
        "Saved {} for assignment {}: salary {}, commission {}, profit {}",
        date,
        id,
        fmt_amount(&result.daily_salary),
        fmt_amount(&result.commission_paid),
        fmt_signed(&result.daily_profit)
    );
    Ok(())
}

fn preview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let terms = store::fetch_terms(conn, id)?;
    let result = calc::preview(&raw_from_args(sub), &terms);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &result)? {
        println!("{}", pretty_table(&RESULT_HEADERS, vec![result_cells(&result)]));
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let Some(record) = store::get_record(conn, id, date)? else {
        println!("No record for assignment {} on {}", id, date);
        return Ok(());
    };
    let terms = store::fetch_terms(conn, id)?;
    let row = RecordRow {
        result: calc::daily_result(&record.performance, &terms),
        record,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &row)? {
        println!("{}", table(vec![row]));
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, assignment_id: i64) -> Result<Vec<RecordRow>> {
    let terms = store::fetch_terms(conn, assignment_id)?;
    let (records, _) = store::list_records(conn, assignment_id)?;
    Ok(records
        .into_iter()
        .map(|record| RecordRow {
            result: calc::daily_result(&record.performance, &terms),
            record,
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let rows = query_rows(conn, id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        println!("{}", table(rows));
    }
    Ok(())
}

fn table(rows: Vec<RecordRow>) -> comfy_table::Table {
    let mut headers = vec!["Date", "Arrival", "Departure", "Drinks", "Special", "Bonus", "Malus"];
    headers.extend(RESULT_HEADERS);
    let data = rows
        .iter()
        .map(|row| {
            let p = &row.record.performance;
            let mut cells = vec![
                row.record.record_date.to_string(),
                fmt_time(p.arrival_time),
                fmt_time(p.departure_time),
                p.drinks_sold.to_string(),
                fmt_amount(&p.special_commissions),
                fmt_amount(&p.bonus),
                fmt_amount(&p.malus),
            ];
            cells.extend(result_cells(&row.result));
            cells
        })
        .collect();
    pretty_table(&headers, data)
}
