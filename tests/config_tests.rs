// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveTime;
use paydesk::config::{self, TemplateDefaults};
use paydesk::{cli, commands::templates, db, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn run_template(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(args);
    let Some(("template", t_m)) = matches.subcommand() else {
        panic!("template command not parsed");
    };
    templates::handle(conn, t_m)
}

#[test]
fn builtin_defaults_apply_until_overridden() {
    let conn = db::open_in_memory().unwrap();
    let defaults = TemplateDefaults::load(&conn).unwrap();
    assert_eq!(defaults.late_cutoff, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    assert_eq!(defaults.first_minute_penalty, dec!(0));
    assert_eq!(defaults.additional_minute_penalty, dec!(5));
    assert_eq!(defaults.drink_commission_staff, dec!(100));
    assert_eq!(defaults.drink_revenue_bar, dec!(220));

    config::set_setting(&conn, "default_late_cutoff", " 20:00 ").unwrap();
    assert_eq!(config::get_setting(&conn, "default_late_cutoff").unwrap(), "20:00");
    config::set_setting(&conn, "default_late_cutoff", "20:15").unwrap();
    let listed = config::list_settings(&conn).unwrap();
    assert_eq!(listed.len(), config::KNOWN_SETTINGS.len());
    assert!(listed.contains(&("default_late_cutoff".to_string(), "20:15".to_string())));
}

#[test]
fn unknown_or_invalid_settings_are_rejected() {
    let conn = db::open_in_memory().unwrap();
    let err = config::get_setting(&conn, "base_currency").unwrap_err();
    assert!(err.to_string().contains("Unknown setting 'base_currency'"));
    assert!(config::set_setting(&conn, "base_currency", "THB").is_err());

    let err = config::set_setting(&conn, "default_drink_revenue_bar", "-1").unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
    assert!(config::set_setting(&conn, "default_late_cutoff", "7pm").is_err());
    assert_eq!(
        config::get_setting(&conn, "default_drink_revenue_bar").unwrap(),
        "220"
    );
}

#[test]
fn template_add_fills_missing_terms_from_settings() {
    let conn = db::open_in_memory().unwrap();
    config::set_setting(&conn, "default_first_minute_penalty", "50").unwrap();
    run_template(
        &conn,
        &[
            "paydesk",
            "template",
            "add",
            "--name",
            "1mois",
            "--days",
            "30",
            "--commission",
            "120",
        ],
    )
    .unwrap();

    let tpl = store::fetch_template(&conn, "1mois").unwrap();
    assert_eq!(tpl.days, 30);
    assert_eq!(tpl.late_cutoff, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    assert_eq!(tpl.first_minute_penalty, dec!(50));
    assert_eq!(tpl.additional_minute_penalty, dec!(5));
    assert_eq!(tpl.drink_commission_staff, dec!(120));
    assert_eq!(tpl.drink_revenue_bar, dec!(220));
    assert_eq!(templates::list(&conn).unwrap().len(), 1);
}

#[test]
fn template_add_rejects_bad_terms() {
    let conn = db::open_in_memory().unwrap();
    let zero = run_template(
        &conn,
        &["paydesk", "template", "add", "--name", "none", "--days", "0"],
    )
    .unwrap_err();
    assert!(zero.to_string().contains("at least one day"));

    let negative = run_template(
        &conn,
        &[
            "paydesk",
            "template",
            "add",
            "--name",
            "cheap",
            "--days",
            "10",
            "--commission=-5",
        ],
    )
    .unwrap_err();
    assert!(negative.to_string().contains("--commission must not be negative"));
    assert!(templates::list(&conn).unwrap().is_empty());
}

#[test]
fn oversized_terms_are_rejected() {
    let conn = db::open_in_memory().unwrap();
    let long = run_template(
        &conn,
        &["paydesk", "template", "add", "--name", "forever", "--days", "4000000000"],
    )
    .unwrap_err();
    assert!(long.to_string().contains("more than 3660 days"));

    let rich = run_template(
        &conn,
        &[
            "paydesk",
            "template",
            "add",
            "--name",
            "gold",
            "--days",
            "10",
            "--drink-revenue",
            "1000000000001",
        ],
    )
    .unwrap_err();
    assert!(rich.to_string().contains("--drink-revenue must not exceed"));

    let err = config::set_setting(&conn, "default_drink_commission_staff", "1e30");
    assert!(err.is_err());
    let err = config::set_setting(
        &conn,
        "default_drink_commission_staff",
        "79228162514264337593543950335",
    )
    .unwrap_err();
    assert!(err.to_string().contains("must not exceed"));

    run_template(
        &conn,
        &["paydesk", "template", "add", "--name", "10ans", "--days", "3660"],
    )
    .unwrap();
    assert_eq!(store::fetch_template(&conn, "10ans").unwrap().days, 3660);
}
