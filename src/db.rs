// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Paydesk", "paydesk"));

/// Environment variable that overrides the database location.
pub const DB_ENV: &str = "PAYDESK_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("paydesk.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS staff(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nickname TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'Active',
        phone TEXT,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS venues(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    -- Named contract types; assignments copy their terms at creation
    CREATE TABLE IF NOT EXISTS contract_templates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        days INTEGER NOT NULL CHECK(days >= 1),
        late_cutoff TEXT NOT NULL,
        first_minute_penalty TEXT NOT NULL DEFAULT '0',
        additional_minute_penalty TEXT NOT NULL DEFAULT '0',
        drink_commission_staff TEXT NOT NULL,
        drink_revenue_bar TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS assignments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        staff_id INTEGER NOT NULL,
        venue_id INTEGER NOT NULL,
        role TEXT NOT NULL DEFAULT 'Dancer',
        template TEXT NOT NULL,
        manager TEXT,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ongoing' CHECK(status IN ('ongoing','ended','archived')),
        contract_days INTEGER NOT NULL, -- original length, never shortened
        base_salary TEXT NOT NULL,
        late_cutoff TEXT NOT NULL,
        first_minute_penalty TEXT NOT NULL,
        additional_minute_penalty TEXT NOT NULL,
        drink_commission_staff TEXT NOT NULL,
        drink_revenue_bar TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(staff_id) REFERENCES staff(id),
        FOREIGN KEY(venue_id) REFERENCES venues(id)
    );
    CREATE INDEX IF NOT EXISTS idx_assignments_start ON assignments(start_date);

    CREATE TABLE IF NOT EXISTS performance_records(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        assignment_id INTEGER NOT NULL,
        record_date TEXT NOT NULL,
        arrival_time TEXT,
        departure_time TEXT,
        drinks_sold INTEGER NOT NULL DEFAULT 0,
        special_commissions TEXT NOT NULL DEFAULT '0',
        bonus TEXT NOT NULL DEFAULT '0',
        malus TEXT NOT NULL DEFAULT '0',
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(assignment_id, record_date),
        FOREIGN KEY(assignment_id) REFERENCES assignments(id) ON DELETE CASCADE
    );

    -- Cached totals; always reproducible from performance_records
    CREATE TABLE IF NOT EXISTS contract_calculations(
        assignment_id INTEGER PRIMARY KEY,
        days_worked INTEGER NOT NULL,
        total_drinks INTEGER NOT NULL,
        total_special_commissions TEXT NOT NULL,
        total_commission TEXT NOT NULL,
        total_salary TEXT NOT NULL,
        total_profit TEXT NOT NULL,
        last_updated TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(assignment_id) REFERENCES assignments(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
