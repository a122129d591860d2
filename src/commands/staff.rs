// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Staff;
use crate::utils::{id_for_staff, maybe_print_json, pretty_table};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

const STATUSES: &[&str] = &["Active", "Working", "Quiet", "Screening"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let nickname = sub.get_one::<String>("nickname").unwrap().trim();
            let status = sub.get_one::<String>("status").unwrap().trim();
            let status = STATUSES
                .iter()
                .find(|s| s.eq_ignore_ascii_case(status))
                .copied()
                .ok_or_else(|| anyhow!("Invalid status '{}', expected one of {:?}", status, STATUSES))?;
            let phone = sub.get_one::<String>("phone").map(|s| s.trim().to_string());
            let notes = sub.get_one::<String>("notes").map(|s| s.trim().to_string());
            conn.execute(
                "INSERT INTO staff(nickname, status, phone, notes) VALUES (?1, ?2, ?3, ?4)",
                params![nickname, status, phone, notes],
            )
            .with_context(|| format!("Could not add staff '{}'", nickname))?;
            println!("Added staff '{}' ({})", nickname, status);
        }
        Some(("list", sub)) => {
            let staff = list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &staff)? {
                let rows = staff
                    .into_iter()
                    .map(|s| {
                        vec![
                            s.nickname,
                            s.status,
                            s.phone.unwrap_or_default(),
                            s.notes.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Nickname", "Status", "Phone", "Notes"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let nickname = sub.get_one::<String>("nickname").unwrap().trim();
            let id = id_for_staff(conn, nickname)?;
            conn.execute("DELETE FROM staff WHERE id=?1", params![id])
                .with_context(|| format!("Staff '{}' still has assignments", nickname))?;
            println!("Removed staff '{}'", nickname);
        }
        _ => {}
    }
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<Staff>> {
    let mut stmt =
        conn.prepare("SELECT id, nickname, status, phone, notes FROM staff ORDER BY nickname")?;
    let rows = stmt.query_map([], |r| {
        Ok(Staff {
            id: r.get(0)?,
            nickname: r.get(1)?,
            status: r.get(2)?,
            phone: r.get(3)?,
            notes: r.get(4)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
