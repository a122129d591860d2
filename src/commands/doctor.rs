// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = issues(conn, chrono::Local::now().date_naive())?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn issues(conn: &Connection, today: NaiveDate) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Records left outside a contract shortened after they were entered
    let mut stmt = conn.prepare(
        "SELECT a.id, p.record_date FROM performance_records p
         JOIN assignments a ON p.assignment_id=a.id
         WHERE p.record_date < a.start_date OR p.record_date > a.end_date
         ORDER BY a.id, p.record_date",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let d: String = r.get(1)?;
        rows.push(vec![
            "record_outside_contract".into(),
            format!("assignment {} on {}", id, d),
        ]);
    }

    // 2) Departure logged without an arrival, so no lateness was charged
    let mut stmt2 = conn.prepare(
        "SELECT assignment_id, record_date FROM performance_records
         WHERE arrival_time IS NULL AND departure_time IS NOT NULL
         ORDER BY assignment_id, record_date",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let d: String = r.get(1)?;
        rows.push(vec![
            "missing_arrival".into(),
            format!("assignment {} on {}", id, d),
        ]);
    }

    // 3) Ongoing contracts past their end date, and stale cached totals
    let mut stmt3 = conn.prepare("SELECT id FROM assignments ORDER BY id")?;
    let ids = stmt3
        .query_map([], |r| r.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for id in ids {
        let a = store::fetch_assignment(conn, id)?;
        if a.status == crate::models::ContractStatus::Ongoing && a.end_date < today {
            rows.push(vec![
                "overdue_ongoing".into(),
                format!("assignment {} ended {}", id, a.end_date),
            ]);
        }
        let live = store::contract_summary(conn, id)?.summary;
        match store::cached_summary(conn, id)? {
            Some(cached) if cached == live => {}
            Some(_) => rows.push(vec!["stale_totals".into(), format!("assignment {}", id)]),
            None if live.days_worked > 0 => {
                rows.push(vec!["missing_totals".into(), format!("assignment {}", id)])
            }
            None => {}
        }
    }

    Ok(rows)
}
