// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveTime};
use paydesk::models::DailyPerformance;
use paydesk::store::{self, NewAssignment};
use paydesk::{cli, commands::exporter, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO staff(nickname) VALUES ('Mali');
        INSERT INTO venues(name) VALUES ('Mandarin');
        INSERT INTO contract_templates(name, days, late_cutoff, first_minute_penalty,
            additional_minute_penalty, drink_commission_staff, drink_revenue_bar)
        VALUES ('10jours', 10, '19:30', '50', '5', '100', '120');
        "#,
    )
    .unwrap();
    let id = store::create_assignment(
        &conn,
        NewAssignment {
            staff: "Mali",
            venue: "Mandarin",
            role: "Hostess",
            template: "10jours",
            manager: None,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            base_salary: dec!(10000),
        },
    )
    .unwrap()
    .id;
    store::upsert_record(
        &conn,
        id,
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        &DailyPerformance {
            arrival_time: NaiveTime::from_hms_opt(19, 33, 0),
            drinks_sold: 5,
            special_commissions: dec!(200),
            ..Default::default()
        },
    )
    .unwrap();
    (conn, id)
}

fn run(conn: &Connection, args: &[&str]) {
    let matches = cli::build_cli().get_matches_from(args);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m).unwrap();
    } else {
        panic!("export command not parsed");
    }
}

#[test]
fn export_payroll_writes_csv_totals() {
    let (conn, id) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("payroll.csv");
    let out_str = out.to_string_lossy().to_string();

    run(
        &conn,
        &["paydesk", "export", "payroll", "--format", "CSV", "--out", out_str.as_str()],
    );

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[15], "total_profit");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], id.to_string().as_str());
    assert_eq!(&rows[0][1], "Mali");
    assert_eq!(&rows[0][8], "ongoing");
    assert_eq!(&rows[0][10], "1");
    // 3 minutes late: 50 + 2 * 5 = 60 -> salary 940, profit 800 - 940
    let salary: rust_decimal::Decimal = rows[0][14].parse().unwrap();
    let profit: rust_decimal::Decimal = rows[0][15].parse().unwrap();
    assert_eq!(salary, dec!(940));
    assert_eq!(profit, dec!(-140));
}

#[test]
fn export_records_streams_pretty_json() {
    let (conn, id) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("records.json");
    let out_str = out.to_string_lossy().to_string();
    let id_s = id.to_string();

    run(
        &conn,
        &[
            "paydesk", "export", "records", "--id", id_s.as_str(), "--format", "json", "--out", out_str.as_str(),
        ],
    );

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.contains("\n  {"));
    let v: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let first = &v[0];
    assert_eq!(first["record_date"], "2025-06-01");
    assert_eq!(first["arrival_time"], "19:33");
    assert_eq!(first["departure_time"], serde_json::Value::Null);
    assert_eq!(first["drinks_sold"], 5);
    assert_eq!(first["lateness_penalty"], "60");
}

#[test]
fn unknown_format_is_rejected() {
    let (conn, _) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("payroll.xml");
    let matches = cli::build_cli().get_matches_from([
        "paydesk",
        "export",
        "payroll",
        "--format",
        "xml",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("export command not parsed");
    };
    let err = exporter::handle(&conn, export_m).unwrap_err();
    assert!(err.to_string().contains("Unknown format: xml"));
    assert!(!out.exists());
}
