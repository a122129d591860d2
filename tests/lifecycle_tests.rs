// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDate};
use paydesk::error::PayrollError;
use paydesk::models::{ContractStatus, DailyPerformance};
use paydesk::store::{self, NewAssignment};
use paydesk::{calc, cli, commands::assignments, commands::doctor, commands::summary, db};
use rusqlite::{params, Connection};
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO staff(nickname) VALUES ('Mali'), ('Ploy');
        INSERT INTO venues(name) VALUES ('Red Dragon'), ('Mandarin');
        INSERT INTO contract_templates(name, days, late_cutoff, first_minute_penalty,
            additional_minute_penalty, drink_commission_staff, drink_revenue_bar)
        VALUES ('10jours', 10, '19:30', '0', '5', '100', '120');
        "#,
    )
    .unwrap();
    conn
}

fn open(conn: &Connection, staff: &str, start: &str) -> i64 {
    store::create_assignment(
        conn,
        NewAssignment {
            staff,
            venue: "Red Dragon",
            role: "Dancer",
            template: "10jours",
            manager: None,
            start_date: d(start),
            base_salary: dec!(10000),
        },
    )
    .unwrap()
    .id
}

fn staff_status(conn: &Connection, nickname: &str) -> String {
    conn.query_row(
        "SELECT status FROM staff WHERE nickname=?1",
        params![nickname],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn create_snapshots_template_terms() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    let a = store::fetch_assignment(&conn, id).unwrap();
    assert_eq!(a.end_date, d("2025-03-10"));
    assert_eq!(a.status, ContractStatus::Ongoing);
    assert_eq!(a.terms.contract_days, 10);
    assert_eq!(staff_status(&conn, "Mali"), "Working");

    conn.execute(
        "UPDATE contract_templates SET drink_revenue_bar='220', days=30",
        [],
    )
    .unwrap();
    let terms = store::fetch_terms(&conn, id).unwrap();
    assert_eq!(terms.drink_revenue_bar, dec!(120));
    assert_eq!(terms.contract_days, 10);
}

#[test]
fn overlapping_contract_is_rejected() {
    let conn = setup();
    open(&conn, "Mali", "2025-03-01");
    let err = store::create_assignment(
        &conn,
        NewAssignment {
            staff: "Mali",
            venue: "Mandarin",
            role: "Hostess",
            template: "10jours",
            manager: None,
            start_date: d("2025-03-05"),
            base_salary: dec!(5000),
        },
    )
    .unwrap_err();
    assert_eq!(
        err.downcast::<PayrollError>().unwrap(),
        PayrollError::OverlappingAssignment("Mali".into())
    );
    // A different staff member can start the same day.
    open(&conn, "Ploy", "2025-03-05");
}

#[test]
fn early_end_keeps_daily_base_and_gates_summary() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    let start = d("2025-03-01");
    for i in 0..6 {
        store::upsert_record(
            &conn,
            id,
            start + Duration::days(i),
            &DailyPerformance {
                drinks_sold: 2,
                ..Default::default()
            },
        )
        .unwrap();
    }

    let view = store::contract_summary(&conn, id).unwrap();
    assert!(!view.is_final());
    assert!(store::finalized_summary(&conn, id).unwrap().is_none());

    let a = store::end_early(&conn, id, d("2025-03-06")).unwrap();
    assert_eq!(a.status, ContractStatus::Ended);
    assert_eq!(a.current_days(), 6);
    assert_eq!(a.terms.contract_days, 10);
    assert_eq!(calc::prorated_base(&a.terms), dec!(1000));

    let summary = store::finalized_summary(&conn, id).unwrap().unwrap();
    assert_eq!(summary.days_worked, 6);
    assert_eq!(summary.total_drinks, 12);
    assert_eq!(summary.total_salary, dec!(6000));
    assert_eq!(summary.total_commission, dec!(1200));
    assert_eq!(summary.total_profit, dec!(-4560));
}

#[test]
fn end_before_start_clamps_to_start() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    let a = store::end_early(&conn, id, d("2025-02-20")).unwrap();
    assert_eq!(a.end_date, d("2025-03-01"));
    assert_eq!(a.current_days(), 1);

    let err = store::end_early(&conn, id, d("2025-03-02")).unwrap_err();
    assert_eq!(
        err.downcast::<PayrollError>().unwrap(),
        PayrollError::NotOngoing {
            id,
            status: ContractStatus::Ended
        }
    );
}

#[test]
fn archive_is_terminal_and_releases_staff() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    store::finalize(&conn, id, ContractStatus::Ended).unwrap();
    let a = store::finalize(&conn, id, ContractStatus::Archived).unwrap();
    assert_eq!(a.status, ContractStatus::Archived);
    assert_eq!(staff_status(&conn, "Mali"), "Active");

    let err = store::finalize(&conn, id, ContractStatus::Ended).unwrap_err();
    assert_eq!(
        err.downcast::<PayrollError>().unwrap(),
        PayrollError::InvalidTransition {
            id,
            from: ContractStatus::Archived,
            to: ContractStatus::Ended,
        }
    );
    assert!(store::finalized_summary(&conn, id).unwrap().is_some());
}

#[test]
fn finalize_command_accepts_completed_alias() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    let id_s = id.to_string();
    let matches = cli::build_cli().get_matches_from([
        "paydesk",
        "assignment",
        "finalize",
        "--id",
        id_s.as_str(),
        "--status",
        "Completed",
    ]);
    if let Some(("assignment", a_m)) = matches.subcommand() {
        assignments::handle(&conn, a_m).unwrap();
    } else {
        panic!("assignment command not parsed");
    }
    let a = store::fetch_assignment(&conn, id).unwrap();
    assert_eq!(a.status, ContractStatus::Ended);
}

#[test]
fn delete_removes_records() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    store::upsert_record(&conn, id, d("2025-03-02"), &DailyPerformance::default()).unwrap();
    store::delete_assignment(&conn, id).unwrap();

    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM performance_records", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
    assert_eq!(staff_status(&conn, "Mali"), "Active");
    assert!(store::fetch_assignment(&conn, id).is_err());
}

#[test]
fn recalculate_all_rebuilds_cache() {
    let conn = setup();
    let a = open(&conn, "Mali", "2025-03-01");
    let b = open(&conn, "Ploy", "2025-03-01");
    store::upsert_record(&conn, a, d("2025-03-01"), &DailyPerformance::default()).unwrap();
    conn.execute("DELETE FROM contract_calculations", []).unwrap();

    assert_eq!(store::recalculate_all(&conn).unwrap(), 2);
    assert_eq!(store::cached_summary(&conn, a).unwrap().unwrap().days_worked, 1);
    assert_eq!(store::cached_summary(&conn, b).unwrap().unwrap().days_worked, 0);
}

#[test]
fn doctor_flags_records_cut_off_by_early_end() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    store::upsert_record(&conn, id, d("2025-03-08"), &DailyPerformance::default()).unwrap();
    store::end_early(&conn, id, d("2025-03-05")).unwrap();

    let issues = doctor::issues(&conn, d("2025-03-20")).unwrap();
    assert_eq!(
        issues,
        vec![vec![
            "record_outside_contract".to_string(),
            format!("assignment {} on 2025-03-08", id)
        ]]
    );

    conn.execute(
        "UPDATE contract_calculations SET total_salary='1' WHERE assignment_id=?1",
        params![id],
    )
    .unwrap();
    let issues = doctor::issues(&conn, d("2025-03-20")).unwrap();
    assert!(issues.iter().any(|r| r[0] == "stale_totals"));
}

#[test]
fn contract_past_the_calendar_is_refused() {
    let conn = setup();
    conn.execute(
        "INSERT INTO contract_templates(name, days, late_cutoff, first_minute_penalty,
            additional_minute_penalty, drink_commission_staff, drink_revenue_bar)
         VALUES ('forever', 4000000000, '19:30', '0', '5', '100', '120'),
                ('10ans', 3650, '19:30', '0', '5', '100', '120')",
        [],
    )
    .unwrap();
    let attempt = |template: &str, start: NaiveDate| {
        store::create_assignment(
            &conn,
            NewAssignment {
                staff: "Mali",
                venue: "Red Dragon",
                role: "Dancer",
                template,
                manager: None,
                start_date: start,
                base_salary: dec!(10000),
            },
        )
    };

    let err = attempt("forever", d("2025-03-01")).unwrap_err();
    assert!(err.to_string().contains("beyond the supported calendar"));
    let err = attempt("10ans", NaiveDate::MAX - Duration::days(5)).unwrap_err();
    assert!(err.to_string().contains("beyond the supported calendar"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM assignments", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(staff_status(&conn, "Mali"), "Active");
}

#[test]
fn summary_json_withholds_totals_until_final() {
    let conn = setup();
    let id = open(&conn, "Mali", "2025-03-01");
    store::upsert_record(
        &conn,
        id,
        d("2025-03-01"),
        &DailyPerformance {
            drinks_sold: 4,
            ..Default::default()
        },
    )
    .unwrap();

    let view = store::contract_summary(&conn, id).unwrap();
    let v = summary::json_view(&view).unwrap();
    assert_eq!(v["is_final"], false);
    assert_eq!(v["status"], "ongoing");
    assert_eq!(v["days_recorded"], 1);
    assert_eq!(v["contract_days"], 10);
    assert!(v.get("summary").is_none());

    store::finalize(&conn, id, ContractStatus::Ended).unwrap();
    let view = store::contract_summary(&conn, id).unwrap();
    let v = summary::json_view(&view).unwrap();
    assert_eq!(v["is_final"], true);
    assert_eq!(v["status"], "ended");
    assert_eq!(v["summary"]["total_drinks"], 4);
    let salary: rust_decimal::Decimal =
        v["summary"]["total_salary"].as_str().unwrap().parse().unwrap();
    assert_eq!(salary, dec!(1000));
}
