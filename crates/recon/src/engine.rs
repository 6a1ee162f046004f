//! The reconciliation pass itself.
//!
//! Claims flow both ways: matched ledger rows record the admin file that
//! supplied their figures, and matched admin rows record the ledger file
//! they were folded into. Either side refusing a second claim is what
//! makes a pass idempotent.

use std::collections::{HashMap, HashSet};

use shoptally_core::model::TOTAL_ROW_ID;
use shoptally_core::{Cell, Table};

use crate::error::ReconError;
use crate::model::{
    CheckOptions, CheckOutcome, ADMIN_KEY, ADMIN_PROVENANCE, DATA_COLUMNS, REPORTED_KEY,
    REPORTED_PROVENANCE,
};

/// Turn a raw transaction export into a reconciliation ledger by adding
/// the (initially empty) provenance column.
pub fn make_report(transactions: &Table) -> Table {
    let mut report = transactions.clone();
    ensure_column(&mut report, ADMIN_PROVENANCE);
    report
}

/// (claimed, total) ledger rows. Observational only.
pub fn match_ratio(reported: &Table) -> Result<(usize, usize), ReconError> {
    let provenance = require(reported, ADMIN_PROVENANCE)?;
    let claimed =
        (0..reported.rows.len()).filter(|&r| !reported.cell(r, provenance).is_empty()).count();
    Ok((claimed, reported.rows.len()))
}

/// One reconciliation pass: claim-guard, left join admin figures onto the
/// ledger, reverse-mark the admin summary, recompute its TOTAL trailer.
///
/// Both tables are updated in memory; persistence is the caller's call
/// (and should be skipped when the outcome reports `changed == false`).
pub fn finance_check(
    reported: &mut Table,
    admin: &mut Table,
    admin_file: &str,
    reported_file: &str,
    options: CheckOptions,
) -> Result<CheckOutcome, ReconError> {
    let reported_key = require(reported, REPORTED_KEY)?;
    let provenance = require(reported, ADMIN_PROVENANCE)?;
    let admin_key = require(admin, ADMIN_KEY)?;
    let admin_data: Vec<usize> =
        DATA_COLUMNS.iter().map(|c| require(admin, c)).collect::<Result<_, _>>()?;

    let total = reported.rows.len();
    let already_matched =
        (0..total).filter(|&r| !reported.cell(r, provenance).is_empty()).count();

    // admin data rows, trailer excluded
    let admin_rows: Vec<usize> = (0..admin.rows.len())
        .filter(|&r| {
            let id = admin.cell(r, admin_key).as_text();
            !id.is_empty() && id != TOTAL_ROW_ID
        })
        .collect();

    let reported_data: Vec<usize> =
        DATA_COLUMNS.iter().map(|c| ensure_column(reported, c)).collect();

    // A claimed ledger row reappearing in this admin file means the pair
    // was already reconciled once.
    let claimed: HashSet<String> = (0..total)
        .filter(|&r| !reported.cell(r, provenance).is_empty())
        .map(|r| reported.cell(r, reported_key).as_text())
        .collect();
    let mut duplicates: Vec<String> = Vec::new();
    for &r in &admin_rows {
        let id = admin.cell(r, admin_key).as_text();
        if claimed.contains(&id) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    if !duplicates.is_empty() {
        if !options.allow_replace {
            return Err(ReconError::DuplicateClaim {
                admin_file: admin_file.to_string(),
                order_ids: duplicates,
            });
        }
        // clear the stale claim so the rows re-match below
        let stale: HashSet<&str> = duplicates.iter().map(String::as_str).collect();
        for r in 0..total {
            if stale.contains(reported.cell(r, reported_key).as_text().as_str()) {
                reported.rows[r][provenance] = Cell::Empty;
                for &c in &reported_data {
                    reported.rows[r][c] = Cell::Empty;
                }
            }
        }
    }

    let mut admin_by_id: HashMap<String, usize> = HashMap::new();
    for &r in &admin_rows {
        admin_by_id.entry(admin.cell(r, admin_key).as_text()).or_insert(r);
    }

    // left join: every ledger row is kept, matched rows take the admin
    // figures verbatim
    let mut matched_ids: HashSet<String> = HashSet::new();
    for r in 0..total {
        let id = reported.cell(r, reported_key).as_text();
        let Some(&ar) = admin_by_id.get(&id) else { continue };
        reported.rows[r][provenance] = Cell::Text(admin_file.to_string());
        for (&rc, &ac) in reported_data.iter().zip(&admin_data) {
            reported.rows[r][rc] = admin.cell(ar, ac).clone();
        }
        matched_ids.insert(id);
    }

    let unmatched_after =
        (0..total).filter(|&r| reported.cell(r, provenance).is_empty()).count();
    let matched = matched_ids.len();
    if matched == 0 {
        return Ok(CheckOutcome { matched, already_matched, total, unmatched_after, changed: false });
    }

    reverse_mark(admin, &admin_rows, admin_key, &matched_ids, reported_file, options)?;
    rebuild_total_row(admin, admin_key, &admin_data);

    Ok(CheckOutcome { matched, already_matched, total, unmatched_after, changed: true })
}

/// Write ledger provenance onto the matched admin rows, refusing rows
/// already claimed by a different ledger file.
fn reverse_mark(
    admin: &mut Table,
    admin_rows: &[usize],
    admin_key: usize,
    matched_ids: &HashSet<String>,
    reported_file: &str,
    options: CheckOptions,
) -> Result<(), ReconError> {
    let provenance = ensure_column(admin, REPORTED_PROVENANCE);

    if !options.allow_replace {
        let mut conflicts: Vec<String> = Vec::new();
        for &r in admin_rows {
            let id = admin.cell(r, admin_key).as_text();
            if !matched_ids.contains(&id) {
                continue;
            }
            let existing = admin.cell(r, provenance).as_text();
            if !existing.is_empty() && existing != reported_file {
                conflicts.push(id);
            }
        }
        if !conflicts.is_empty() {
            return Err(ReconError::ReverseMarkConflict {
                reported_file: reported_file.to_string(),
                order_ids: conflicts,
            });
        }
    }

    for &r in admin_rows {
        if matched_ids.contains(&admin.cell(r, admin_key).as_text()) {
            admin.rows[r][provenance] = Cell::Text(reported_file.to_string());
        }
    }
    Ok(())
}

/// Drop any existing TOTAL trailer and append a fresh one summing the
/// financial columns over the data rows.
fn rebuild_total_row(admin: &mut Table, admin_key: usize, admin_data: &[usize]) {
    admin.rows.retain(|row| {
        row.get(admin_key).map_or(true, |cell| cell.as_text() != TOTAL_ROW_ID)
    });

    let mut totals = vec![0.0; admin_data.len()];
    for r in 0..admin.rows.len() {
        for (slot, &c) in totals.iter_mut().zip(admin_data) {
            *slot += admin.cell(r, c).as_f64().unwrap_or(0.0);
        }
    }

    let mut row = vec![Cell::Empty; admin.headers.len()];
    row[admin_key] = Cell::Text(TOTAL_ROW_ID.into());
    for (&c, value) in admin_data.iter().zip(totals) {
        row[c] = Cell::Number(value);
    }
    admin.push_row(row);
}

fn require(table: &Table, column: &str) -> Result<usize, ReconError> {
    table.col(column).ok_or_else(|| ReconError::MissingColumn {
        table: table.name.clone(),
        column: column.to_string(),
    })
}

/// Column index, appending the column (empty cells) when absent.
fn ensure_column(table: &mut Table, header: &str) -> usize {
    if let Some(c) = table.col(header) {
        return c;
    }
    table.headers.push(header.to_string());
    let width = table.headers.len();
    for row in &mut table.rows {
        row.resize(width, Cell::Empty);
    }
    width - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_report_adds_empty_provenance() {
        let mut t = Table::new("Transaction Report", vec![REPORTED_KEY.into()]);
        t.push_row(vec![Cell::Text("O1".into())]);
        let report = make_report(&t);
        let prov = report.col(ADMIN_PROVENANCE).unwrap();
        assert!(report.cell(0, prov).is_empty());
        assert_eq!(match_ratio(&report).unwrap(), (0, 1));
    }

    #[test]
    fn ensure_column_is_idempotent() {
        let mut t = Table::new("t", vec!["a".into()]);
        t.push_row(vec![Cell::Number(1.0)]);
        let c1 = ensure_column(&mut t, "b");
        let c2 = ensure_column(&mut t, "b");
        assert_eq!(c1, c2);
        assert_eq!(t.rows[0].len(), 2);
    }
}
