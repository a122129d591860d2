// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Assignments, daily records and cached contract totals in SQLite.
//!
//! All figures are produced by [`crate::calc`]; this module only loads the
//! inputs, enforces the contract lifecycle and writes results back.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calc;
use crate::error::PayrollError;
use crate::models::{
    Assignment, ContractStatus, ContractSummary, ContractTemplate, ContractTerms,
    DailyPerformance, DerivedDailyResult, PerformanceRecord,
};
use crate::utils::{id_for_staff, id_for_venue, parse_date, parse_time, stored_decimal};

const ASSIGNMENT_SELECT: &str = "SELECT a.id, s.nickname, v.name, a.role, a.template, a.manager,
        a.start_date, a.end_date, a.status, a.contract_days, a.base_salary, a.late_cutoff,
        a.first_minute_penalty, a.additional_minute_penalty, a.drink_commission_staff,
        a.drink_revenue_bar
     FROM assignments a
     JOIN staff s ON a.staff_id=s.id
     JOIN venues v ON a.venue_id=v.id";

/// Columns of one assignment row before the text fields are parsed.
struct RawAssignment {
    id: i64,
    staff: String,
    venue: String,
    role: String,
    template: String,
    manager: Option<String>,
    start_date: String,
    end_date: String,
    status: String,
    contract_days: u32,
    text_terms: [String; 6],
}

impl RawAssignment {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            staff: r.get(1)?,
            venue: r.get(2)?,
            role: r.get(3)?,
            template: r.get(4)?,
            manager: r.get(5)?,
            start_date: r.get(6)?,
            end_date: r.get(7)?,
            status: r.get(8)?,
            contract_days: r.get(9)?,
            text_terms: [
                r.get(10)?,
                r.get(11)?,
                r.get(12)?,
                r.get(13)?,
                r.get(14)?,
                r.get(15)?,
            ],
        })
    }

    fn parse(self) -> Result<Assignment> {
        let [base, cutoff, first, additional, commission, revenue] = self.text_terms;
        let terms = ContractTerms {
            contract_days: self.contract_days,
            base_salary: stored_decimal(&base, "base salary")?,
            late_cutoff: parse_time(&cutoff)?,
            first_minute_penalty: stored_decimal(&first, "first minute penalty")?,
            additional_minute_penalty: stored_decimal(&additional, "additional minute penalty")?,
            drink_commission_staff: stored_decimal(&commission, "drink commission")?,
            drink_revenue_bar: stored_decimal(&revenue, "drink revenue")?,
        };
        Ok(Assignment {
            id: self.id,
            staff: self.staff,
            venue: self.venue,
            role: self.role,
            template: self.template,
            manager: self.manager,
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            status: self.status.parse()?,
            terms,
        })
    }
}

pub fn fetch_assignment(conn: &Connection, id: i64) -> Result<Assignment> {
    let sql = format!("{} WHERE a.id=?1", ASSIGNMENT_SELECT);
    let raw = conn
        .query_row(&sql, params![id], RawAssignment::from_row)
        .optional()?
        .ok_or(PayrollError::AssignmentNotFound(id))?;
    raw.parse()
        .with_context(|| format!("Corrupt assignment {}", id))
}

/// Terms of one contract, with the originally signed duration.
pub fn fetch_terms(conn: &Connection, assignment_id: i64) -> Result<ContractTerms> {
    Ok(fetch_assignment(conn, assignment_id)?.terms)
}

type RawRecord = (i64, i64, String, Option<String>, Option<String>, u32, [String; 3]);

fn record_from_row(r: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        [r.get(6)?, r.get(7)?, r.get(8)?],
    ))
}

fn parse_record(raw: RawRecord) -> Result<PerformanceRecord> {
    let (id, assignment_id, date, arrival, departure, drinks, [special, bonus, malus]) = raw;
    let time = |t: Option<String>| -> Result<_> { t.as_deref().map(parse_time).transpose() };
    Ok(PerformanceRecord {
        id,
        assignment_id,
        record_date: parse_date(&date)?,
        performance: DailyPerformance {
            arrival_time: time(arrival)?,
            departure_time: time(departure)?,
            drinks_sold: drinks,
            special_commissions: stored_decimal(&special, "special commissions")?,
            bonus: stored_decimal(&bonus, "bonus")?,
            malus: stored_decimal(&malus, "malus")?,
        },
    })
}

const RECORD_SELECT: &str = "SELECT id, assignment_id, record_date, arrival_time, departure_time,
        drinks_sold, special_commissions, bonus, malus
     FROM performance_records";

/// All records of an assignment in date order, with the contract's status.
pub fn list_records(
    conn: &Connection,
    assignment_id: i64,
) -> Result<(Vec<PerformanceRecord>, ContractStatus)> {
    let status = fetch_assignment(conn, assignment_id)?.status;
    let records = records_for(conn, assignment_id)?;
    Ok((records, status))
}

fn records_for(conn: &Connection, assignment_id: i64) -> Result<Vec<PerformanceRecord>> {
    let sql = format!("{} WHERE assignment_id=?1 ORDER BY record_date", RECORD_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![assignment_id], record_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(parse_record(row?)?);
    }
    Ok(out)
}

pub fn get_record(
    conn: &Connection,
    assignment_id: i64,
    date: NaiveDate,
) -> Result<Option<PerformanceRecord>> {
    let sql = format!("{} WHERE assignment_id=?1 AND record_date=?2", RECORD_SELECT);
    let raw = conn
        .query_row(&sql, params![assignment_id, date.to_string()], record_from_row)
        .optional()?;
    raw.map(parse_record).transpose()
}

/// Saves one day's figures and returns the stored record with its result.
/// Archived contracts and dates outside the contract window are rejected.
pub fn upsert_record(
    conn: &Connection,
    assignment_id: i64,
    date: NaiveDate,
    day: &DailyPerformance,
) -> Result<(PerformanceRecord, DerivedDailyResult)> {
    let a = fetch_assignment(conn, assignment_id)?;
    if !a.status.accepts_records() {
        return Err(PayrollError::ContractArchived(assignment_id).into());
    }
    if !a.covers(date) {
        return Err(PayrollError::DateOutsideContract {
            date,
            start: a.start_date,
            end: a.end_date,
        }
        .into());
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO performance_records(assignment_id, record_date, arrival_time, departure_time,
             drinks_sold, special_commissions, bonus, malus)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
         ON CONFLICT(assignment_id, record_date) DO UPDATE SET
             arrival_time=excluded.arrival_time,
             departure_time=excluded.departure_time,
             drinks_sold=excluded.drinks_sold,
             special_commissions=excluded.special_commissions,
             bonus=excluded.bonus,
             malus=excluded.malus,
             updated_at=datetime('now')",
        params![
            assignment_id,
            date.to_string(),
            day.arrival_time.map(|t| t.format("%H:%M").to_string()),
            day.departure_time.map(|t| t.format("%H:%M").to_string()),
            day.drinks_sold,
            day.special_commissions.to_string(),
            day.bonus.to_string(),
            day.malus.to_string(),
        ],
    )?;
    let stored = get_record(&tx, assignment_id, date)?
        .context("Record vanished after upsert")?;
    let summary = calc::summarize(
        records_for(&tx, assignment_id)?.iter().map(|r| &r.performance),
        &a.terms,
    );
    write_calculation(&tx, assignment_id, &summary)?;
    tx.commit()?;

    let result = calc::daily_result(&stored.performance, &a.terms);
    info!(
        assignment_id,
        date = %date,
        salary = %result.daily_salary,
        profit = %result.daily_profit,
        "saved daily record"
    );
    Ok((stored, result))
}

pub struct NewAssignment<'a> {
    pub staff: &'a str,
    pub venue: &'a str,
    pub role: &'a str,
    pub template: &'a str,
    pub manager: Option<&'a str>,
    pub start_date: NaiveDate,
    pub base_salary: Decimal,
}

pub fn fetch_template(conn: &Connection, name: &str) -> Result<ContractTemplate> {
    let raw = conn
        .query_row(
            "SELECT id, name, days, late_cutoff, first_minute_penalty, additional_minute_penalty,
                drink_commission_staff, drink_revenue_bar
             FROM contract_templates WHERE name=?1",
            params![name],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, u32>(2)?,
                    [
                        r.get::<_, String>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, String>(5)?,
                        r.get::<_, String>(6)?,
                        r.get::<_, String>(7)?,
                    ],
                ))
            },
        )
        .optional()?
        .ok_or_else(|| PayrollError::UnknownTemplate(name.to_string()))?;
    let (id, name, days, [cutoff, first, additional, commission, revenue]) = raw;
    Ok(ContractTemplate {
        id,
        name,
        days,
        late_cutoff: parse_time(&cutoff)?,
        first_minute_penalty: stored_decimal(&first, "first minute penalty")?,
        additional_minute_penalty: stored_decimal(&additional, "additional minute penalty")?,
        drink_commission_staff: stored_decimal(&commission, "drink commission")?,
        drink_revenue_bar: stored_decimal(&revenue, "drink revenue")?,
    })
}

/// Opens a contract from a template. The template's terms are copied so
/// later template edits never change a running contract.
pub fn create_assignment(conn: &Connection, new: NewAssignment<'_>) -> Result<Assignment> {
    let staff_id = id_for_staff(conn, new.staff)?;
    let venue_id = id_for_venue(conn, new.venue)?;
    let tpl = fetch_template(conn, new.template)?;
    let end_date = new
        .start_date
        .checked_add_signed(Duration::days(i64::from(tpl.days) - 1))
        .with_context(|| {
            format!(
                "Template '{}' ({} days) starting {} ends beyond the supported calendar",
                tpl.name, tpl.days, new.start_date
            )
        })?;

    let start = new.start_date.to_string();
    let overlapping: Option<i64> = conn
        .query_row(
            "SELECT id FROM assignments
             WHERE staff_id=?1 AND status='ongoing' AND start_date<=?2 AND end_date>=?2",
            params![staff_id, &start],
            |r| r.get(0),
        )
        .optional()?;
    if overlapping.is_some() {
        return Err(PayrollError::OverlappingAssignment(new.staff.to_string()).into());
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO assignments(staff_id, venue_id, role, template, manager, start_date, end_date,
             status, contract_days, base_salary, late_cutoff, first_minute_penalty,
             additional_minute_penalty, drink_commission_staff, drink_revenue_bar)
         VALUES (?1,?2,?3,?4,?5,?6,?7,'ongoing',?8,?9,?10,?11,?12,?13,?14)",
        params![
            staff_id,
            venue_id,
            new.role,
            tpl.name,
            new.manager,
            start,
            end_date.to_string(),
            tpl.days,
            new.base_salary.to_string(),
            tpl.late_cutoff.format("%H:%M").to_string(),
            tpl.first_minute_penalty.to_string(),
            tpl.additional_minute_penalty.to_string(),
            tpl.drink_commission_staff.to_string(),
            tpl.drink_revenue_bar.to_string(),
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE staff SET status='Working' WHERE id=?1",
        params![staff_id],
    )?;
    tx.commit()?;
    info!(id, staff = new.staff, venue = new.venue, "created assignment");
    fetch_assignment(conn, id)
}

/// Ends an ongoing contract on `on` (never before its start). The signed
/// duration is kept so the daily base does not change.
pub fn end_early(conn: &Connection, assignment_id: i64, on: NaiveDate) -> Result<Assignment> {
    let a = fetch_assignment(conn, assignment_id)?;
    if a.status != ContractStatus::Ongoing {
        return Err(PayrollError::NotOngoing {
            id: assignment_id,
            status: a.status,
        }
        .into());
    }
    let end = on.max(a.start_date).min(a.end_date);
    conn.execute(
        "UPDATE assignments SET end_date=?1, status='ended' WHERE id=?2",
        params![end.to_string(), assignment_id],
    )?;
    info!(assignment_id, end = %end, "ended assignment early");
    fetch_assignment(conn, assignment_id)
}

/// Moves a contract to `ended` or `archived`. Archiving is final and frees
/// the staff member for new work.
pub fn finalize(
    conn: &Connection,
    assignment_id: i64,
    target: ContractStatus,
) -> Result<Assignment> {
    let a = fetch_assignment(conn, assignment_id)?;
    if !a.status.can_transition_to(target) {
        return Err(PayrollError::InvalidTransition {
            id: assignment_id,
            from: a.status,
            to: target,
        }
        .into());
    }
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE assignments SET status=?1 WHERE id=?2",
        params![target.as_str(), assignment_id],
    )?;
    if target == ContractStatus::Archived {
        tx.execute(
            "UPDATE staff SET status='Active'
             WHERE id=(SELECT staff_id FROM assignments WHERE id=?1)",
            params![assignment_id],
        )?;
    }
    tx.commit()?;
    recalculate(conn, assignment_id)?;
    info!(assignment_id, from = %a.status, to = %target, "finalized assignment");
    fetch_assignment(conn, assignment_id)
}

/// Removes a contract together with its daily records.
pub fn delete_assignment(conn: &Connection, assignment_id: i64) -> Result<()> {
    let a = fetch_assignment(conn, assignment_id)?;
    let tx = conn.unchecked_transaction()?;
    if a.status == ContractStatus::Ongoing {
        tx.execute(
            "UPDATE staff SET status='Active'
             WHERE id=(SELECT staff_id FROM assignments WHERE id=?1)",
            params![assignment_id],
        )?;
    }
    tx.execute(
        "DELETE FROM assignments WHERE id=?1",
        params![assignment_id],
    )?;
    tx.commit()?;
    info!(assignment_id, "deleted assignment");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub assignment_id: i64,
    pub status: ContractStatus,
    pub contract_days: u32,
    pub summary: ContractSummary,
}

impl SummaryView {
    /// A summary is final once the contract has ended or been archived,
    /// however many days were recorded.
    pub fn is_final(&self) -> bool {
        self.status.is_terminal()
    }
}

pub fn contract_summary(conn: &Connection, assignment_id: i64) -> Result<SummaryView> {
    let a = fetch_assignment(conn, assignment_id)?;
    let records = records_for(conn, assignment_id)?;
    let summary = calc::summarize(records.iter().map(|r| &r.performance), &a.terms);
    Ok(SummaryView {
        assignment_id,
        status: a.status,
        contract_days: a.terms.contract_days,
        summary,
    })
}

pub fn finalized_summary(conn: &Connection, assignment_id: i64) -> Result<Option<ContractSummary>> {
    let view = contract_summary(conn, assignment_id)?;
    Ok(view.is_final().then_some(view.summary))
}

fn write_calculation(conn: &Connection, assignment_id: i64, s: &ContractSummary) -> Result<()> {
    conn.execute(
        "INSERT INTO contract_calculations(assignment_id, days_worked, total_drinks,
             total_special_commissions, total_commission, total_salary, total_profit, last_updated)
         VALUES (?1,?2,?3,?4,?5,?6,?7,datetime('now'))
         ON CONFLICT(assignment_id) DO UPDATE SET
             days_worked=excluded.days_worked,
             total_drinks=excluded.total_drinks,
             total_special_commissions=excluded.total_special_commissions,
             total_commission=excluded.total_commission,
             total_salary=excluded.total_salary,
             total_profit=excluded.total_profit,
             last_updated=excluded.last_updated",
        params![
            assignment_id,
            s.days_worked,
            s.total_drinks as i64,
            s.total_special_commissions.to_string(),
            s.total_commission.to_string(),
            s.total_salary.to_string(),
            s.total_profit.to_string(),
        ],
    )?;
    Ok(())
}

/// Rebuilds the cached totals of one contract from its records.
pub fn recalculate(conn: &Connection, assignment_id: i64) -> Result<ContractSummary> {
    let view = contract_summary(conn, assignment_id)?;
    write_calculation(conn, assignment_id, &view.summary)?;
    debug!(assignment_id, "recalculated contract totals");
    Ok(view.summary)
}

/// Rebuilds every cached total; a contract that fails is logged and skipped.
pub fn recalculate_all(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare("SELECT id FROM assignments ORDER BY id")?;
    let ids = stmt
        .query_map([], |r| r.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut count = 0;
    for id in ids {
        match recalculate(conn, id) {
            Ok(_) => count += 1,
            Err(err) => warn!(assignment_id = id, error = %err, "recalculation failed"),
        }
    }
    info!(count, "recalculated contracts");
    Ok(count)
}

pub fn cached_summary(conn: &Connection, assignment_id: i64) -> Result<Option<ContractSummary>> {
    let raw = conn
        .query_row(
            "SELECT days_worked, total_drinks, total_special_commissions, total_commission,
                total_salary, total_profit
             FROM contract_calculations WHERE assignment_id=?1",
            params![assignment_id],
            |r| {
                Ok((
                    r.get::<_, u32>(0)?,
                    r.get::<_, i64>(1)?,
                    [
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, String>(5)?,
                    ],
                ))
            },
        )
        .optional()?;
    let Some((days_worked, drinks, [special, commission, salary, profit])) = raw else {
        return Ok(None);
    };
    Ok(Some(ContractSummary {
        days_worked,
        total_drinks: u64::try_from(drinks).unwrap_or_default(),
        total_special_commissions: stored_decimal(&special, "cached special commissions")?,
        total_commission: stored_decimal(&commission, "cached commission")?,
        total_salary: stored_decimal(&salary, "cached salary")?,
        total_profit: stored_decimal(&profit, "cached profit")?,
    }))
}

#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    pub status: Option<ContractStatus>,
    pub template: Option<String>,
    pub venue: Option<String>,
    pub nickname: Option<String>,
    pub manager: Option<String>,
    /// Keep contracts still running on or after this date.
    pub from: Option<NaiveDate>,
    /// Keep contracts started on or before this date.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayrollRow {
    pub assignment: Assignment,
    pub current_days: i64,
    pub summary: ContractSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PayrollTotals {
    pub total_profit: Decimal,
    pub total_salary: Decimal,
    pub total_days_worked: u64,
}

pub fn payroll_rows(conn: &Connection, f: &PayrollFilter) -> Result<Vec<PayrollRow>> {
    let mut sql = format!("{} WHERE 1=1", ASSIGNMENT_SELECT);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(status) = f.status {
        sql.push_str(" AND a.status=?");
        params_vec.push(status.as_str().into());
    }
    if let Some(t) = &f.template {
        sql.push_str(" AND a.template=?");
        params_vec.push(t.clone());
    }
    if let Some(v) = &f.venue {
        sql.push_str(" AND v.name=?");
        params_vec.push(v.clone());
    }
    if let Some(n) = &f.nickname {
        sql.push_str(" AND s.nickname LIKE ?");
        params_vec.push(format!("%{}%", n));
    }
    if let Some(m) = &f.manager {
        sql.push_str(" AND a.manager=?");
        params_vec.push(m.clone());
    }
    if let Some(from) = f.from {
        sql.push_str(" AND a.end_date>=?");
        params_vec.push(from.to_string());
    }
    if let Some(to) = f.to {
        sql.push_str(" AND a.start_date<=?");
        params_vec.push(to.to_string());
    }
    sql.push_str(
        " ORDER BY CASE a.status WHEN 'ongoing' THEN 1 WHEN 'ended' THEN 2 ELSE 3 END,
          a.start_date, a.id",
    );

    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), RawAssignment::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(raws.len());
    for raw in raws {
        let assignment = raw.parse()?;
        let records = records_for(conn, assignment.id)?;
        let summary = calc::summarize(records.iter().map(|r| &r.performance), &assignment.terms);
        rows.push(PayrollRow {
            current_days: assignment.current_days(),
            assignment,
            summary,
        });
    }
    Ok(rows)
}

pub fn payroll_totals(rows: &[PayrollRow]) -> PayrollTotals {
    rows.iter().fold(PayrollTotals::default(), |mut t, r| {
        t.total_profit += r.summary.total_profit;
        t.total_salary += r.summary.total_salary;
        t.total_days_worked += u64::from(r.summary.days_worked);
        t
    })
}
