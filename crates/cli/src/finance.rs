use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use regex::Regex;
use shoptally_core::finance::FINANCE_SUMMARY_SHEET;
use shoptally_io::{ExcelBook, SheetStyle, WorkbookWriter};
use shoptally_recon::{finance_check, make_report, match_ratio, CheckOptions};

use crate::CliError;

/// Zero-based header row of the seller-center transaction export; the
/// rows above it hold account metadata.
const TRANSACTION_HEADER_ROW: usize = 17;
const TRANSACTION_SHEET: &str = "Transaction Report";

pub fn cmd_new_report(original_file: &Path, output: Option<PathBuf>) -> Result<(), CliError> {
    if !original_file.exists() {
        return Err(CliError::missing(format!(
            "report file not found: {}",
            original_file.display()
        )));
    }

    let mut book = ExcelBook::open(original_file).map_err(CliError::io)?;
    let transactions = book
        .read_sheet(TRANSACTION_SHEET, TRANSACTION_HEADER_ROW)
        .map_err(CliError::io)?
        .ok_or_else(|| {
            CliError::schema(format!(
                "sheet '{TRANSACTION_SHEET}' not found in '{}'",
                original_file.display()
            ))
        })?;
    let ledger = make_report(&transactions);

    let mut output = output.unwrap_or_else(|| PathBuf::from("cleaned_finance_report.xlsx"));
    if output.exists() {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("cleaned_finance_report");
        let renamed = output.with_file_name(format!("{stem}_{timestamp}.xlsx"));
        println!("File exists. Saving as: {}", renamed.display());
        output = renamed;
    }

    let mut writer = WorkbookWriter::new();
    writer.add_sheet(&ledger, &SheetStyle::plain()).map_err(CliError::io)?;
    writer.save(&output).map_err(CliError::io)?;
    println!("Saved to: {}", output.display());
    Ok(())
}

pub fn cmd_check(
    report_file: &Path,
    admin: Option<PathBuf>,
    admin_dir: Option<PathBuf>,
    date_from: Option<String>,
    date_to: Option<String>,
    dry_run: bool,
    allow_replace: bool,
) -> Result<(), CliError> {
    if admin.is_some() && admin_dir.is_some() {
        return Err(CliError::args("pass either --admin or --admin-dir, not both"));
    }
    if !report_file.exists() {
        return Err(CliError::missing(format!(
            "report file not found: {}",
            report_file.display()
        )));
    }
    let report_name =
        report_file.file_name().and_then(|s| s.to_str()).unwrap_or("report").to_string();

    let mut book = ExcelBook::open(report_file).map_err(CliError::io)?;
    let mut reported = book.read_first_sheet(0).map_err(CliError::io)?.ok_or_else(|| {
        CliError::schema(format!("'{}' contains no sheets", report_file.display()))
    })?;

    let (claimed, total) = match_ratio(&reported).map_err(CliError::recon)?;
    let percentage = if total > 0 { claimed as f64 / total as f64 * 100.0 } else { 0.0 };
    println!("Matched orders: {claimed}/{total} ({percentage:.1}%)");

    let date_from = date_from.map(|s| parse_date(&s)).transpose()?;
    let date_to = date_to.map(|s| parse_date(&s)).transpose()?;

    let admin_files: Vec<PathBuf> = match (admin, admin_dir) {
        (Some(file), None) => {
            if !file.exists() {
                return Err(CliError::missing(format!(
                    "admin file not found: {}",
                    file.display()
                )));
            }
            vec![file]
        }
        (None, Some(dir)) => discover_dated_files(&dir, date_from, date_to)?,
        _ => {
            println!("No admin file provided. Exiting finance check.");
            return Ok(());
        }
    };
    if admin_files.is_empty() {
        println!("No admin files found in the requested date range.");
        return Ok(());
    }

    let options = CheckOptions { allow_replace };
    for path in &admin_files {
        let admin_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("admin").to_string();
        let mut admin_book = ExcelBook::open(path).map_err(CliError::io)?;
        let sheet_names = admin_book.sheet_names();
        let mut summary = admin_book
            .read_sheet(FINANCE_SUMMARY_SHEET, 0)
            .map_err(CliError::io)?
            .ok_or_else(|| {
                CliError::schema(format!(
                    "sheet '{FINANCE_SUMMARY_SHEET}' not found in '{}'",
                    path.display()
                ))
            })?;

        let outcome = finance_check(&mut reported, &mut summary, &admin_name, &report_name, options)
            .map_err(CliError::recon)?;
        println!("Matched {} orders with {admin_name}", outcome.matched);
        println!("Remaining unmatched: {}", outcome.unmatched_after);

        if !outcome.changed || dry_run {
            continue;
        }

        // rewrite the admin workbook, carrying the untouched sheets over
        let mut writer = WorkbookWriter::new();
        for name in &sheet_names {
            if name == FINANCE_SUMMARY_SHEET {
                writer.add_sheet(&summary, &SheetStyle::report()).map_err(CliError::io)?;
            } else if let Some(sheet) = admin_book.read_sheet(name, 0).map_err(CliError::io)? {
                writer.add_sheet(&sheet, &SheetStyle::plain()).map_err(CliError::io)?;
            }
        }
        writer.save(path).map_err(CliError::io)?;
        println!("Updated admin file saved to: {}", path.display());

        // the ledger must record the claims this admin file now carries;
        // a later failing pass must not lose them
        let mut ledger_writer = WorkbookWriter::new();
        ledger_writer.add_sheet(&reported, &SheetStyle::plain()).map_err(CliError::io)?;
        ledger_writer.save(report_file).map_err(CliError::io)?;
        println!("Updated reported file saved to: {}", report_file.display());
    }

    if dry_run {
        println!("Dry run: no files were modified.");
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CliError::args(format!("invalid date: '{s}'")).with_hint("use YYYY-MM-DD"))
}

/// Admin files carry a date in their name (`20250417` or `2025-04-17`).
/// Returns matching .xlsx paths in ascending date order; later passes
/// depend on provenance written by earlier ones.
fn discover_dated_files(
    dir: &Path,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<PathBuf>, CliError> {
    if !dir.is_dir() {
        return Err(CliError::missing(format!("admin directory not found: {}", dir.display())));
    }
    let pattern = Regex::new(r"(\d{4})-?(\d{2})-?(\d{2})").expect("static regex");

    let entries = std::fs::read_dir(dir)
        .map_err(|e| CliError::missing(format!("cannot read '{}': {e}", dir.display())))?;
    let mut dated: Vec<(NaiveDate, PathBuf)> = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| CliError::missing(format!("cannot read '{}': {e}", dir.display())))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("xlsx") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else { continue };
        let Some(date) = pattern.captures(name).and_then(|caps| {
            let y = caps[1].parse().ok()?;
            let m = caps[2].parse().ok()?;
            let d = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(y, m, d)
        }) else {
            continue;
        };
        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }
        dated.push((date, path));
    }
    dated.sort();
    Ok(dated.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoptally_core::model::TOTAL_ROW_ID;
    use shoptally_core::{Cell, Table};
    use shoptally_recon::model::{ADMIN_KEY, ADMIN_PROVENANCE, DATA_COLUMNS, REPORTED_KEY};

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    fn write_ledger(path: &Path, order_ids: &[&str]) {
        let mut t = Table::new("cleaned_finance_report", vec![REPORTED_KEY.into()]);
        for id in order_ids {
            t.push_row(vec![Cell::Text((*id).into())]);
        }
        let ledger = make_report(&t);
        let mut writer = WorkbookWriter::new();
        writer.add_sheet(&ledger, &SheetStyle::plain()).unwrap();
        writer.save(path).unwrap();
    }

    fn write_admin(path: &Path, orders: &[(&str, f64)]) {
        let mut headers = vec![ADMIN_KEY.to_string()];
        headers.extend(DATA_COLUMNS.iter().map(|c| c.to_string()));
        let mut t = Table::new(FINANCE_SUMMARY_SHEET, headers);
        for (id, net) in orders {
            t.push_row(vec![
                Cell::Text((*id).into()),
                Cell::Number(*net),
                Cell::Number(40.0),
                Cell::Number(10.0),
            ]);
        }
        t.push_row(vec![
            Cell::Text(TOTAL_ROW_ID.into()),
            Cell::Number(orders.iter().map(|(_, n)| n).sum()),
            Cell::Number(40.0 * orders.len() as f64),
            Cell::Number(10.0 * orders.len() as f64),
        ]);
        let mut writer = WorkbookWriter::new();
        writer.add_sheet(&t, &SheetStyle::report()).unwrap();
        writer.save(path).unwrap();
    }

    #[test]
    fn ledger_persists_after_each_directory_pass() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.xlsx");
        write_ledger(&ledger, &["O1", "O2"]);

        let admin_dir = dir.path().join("outputs");
        std::fs::create_dir(&admin_dir).unwrap();
        write_admin(&admin_dir.join("a_2025-04-17.xlsx"), &[("O1", 100.0)]);
        // second file re-claims O1, so the second pass fails
        write_admin(&admin_dir.join("a_2025-04-18.xlsx"), &[("O1", 100.0)]);

        let err = cmd_check(&ledger, None, Some(admin_dir), None, None, false, false)
            .unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_RECON_DUPLICATE);

        // the first pass's claim reached disk before the failure
        let mut book = ExcelBook::open(&ledger).unwrap();
        let t = book.read_first_sheet(0).unwrap().unwrap();
        let prov = t.col(ADMIN_PROVENANCE).unwrap();
        assert_eq!(t.cell(0, prov).as_text(), "a_2025-04-17.xlsx");
        assert!(t.cell(1, prov).is_empty());
    }

    #[test]
    fn dry_run_leaves_every_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.xlsx");
        write_ledger(&ledger, &["O1"]);
        let admin = dir.path().join("a_2025-04-17.xlsx");
        write_admin(&admin, &[("O1", 100.0)]);

        let before = std::fs::read(&ledger).unwrap();
        cmd_check(&ledger, Some(admin), None, None, None, true, false).unwrap();
        assert_eq!(std::fs::read(&ledger).unwrap(), before);
    }

    #[test]
    fn dated_files_come_back_in_ascending_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "shopee_2025-04-18_output.xlsx");
        touch(dir.path(), "shopee_20250416_output.xlsx");
        touch(dir.path(), "shopee_2025-04-17_output.xlsx");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "undated.xlsx");

        let files = discover_dated_files(dir.path(), None, None).unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "shopee_20250416_output.xlsx",
                "shopee_2025-04-17_output.xlsx",
                "shopee_2025-04-18_output.xlsx",
            ]
        );
    }

    #[test]
    fn date_range_filter_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a_2025-04-16.xlsx");
        touch(dir.path(), "b_2025-04-17.xlsx");
        touch(dir.path(), "c_2025-04-18.xlsx");

        let from = NaiveDate::from_ymd_opt(2025, 4, 17);
        let to = NaiveDate::from_ymd_opt(2025, 4, 17);
        let files = discover_dated_files(dir.path(), from, to).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].to_str().unwrap().contains("b_2025-04-17"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = discover_dated_files(Path::new("/no/such/dir"), None, None).unwrap_err();
        assert!(err.message.contains("/no/such/dir"));
    }
}
