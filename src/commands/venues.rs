// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_venue, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            conn.execute("INSERT INTO venues(name) VALUES (?1)", params![name])
                .with_context(|| format!("Could not add venue '{}'", name))?;
            println!("Added venue '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT v.name, COUNT(a.id) FROM venues v
                 LEFT JOIN assignments a ON a.venue_id=v.id AND a.status='ongoing'
                 GROUP BY v.id ORDER BY v.name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (name, ongoing) = row?;
                data.push(vec![name, ongoing.to_string()]);
            }
            println!("{}", pretty_table(&["Venue", "Ongoing"], data));
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let id = id_for_venue(conn, name)?;
            conn.execute("DELETE FROM venues WHERE id=?1", params![id])
                .with_context(|| format!("Venue '{}' still has assignments", name))?;
            println!("Removed venue '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
