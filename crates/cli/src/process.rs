use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use shoptally_core::{run, PipelineInput, Platform};
use shoptally_io::{ExcelBook, SheetStyle, WorkbookWriter};

use crate::CliError;

pub fn cmd_process(
    platform: &str,
    input_file: &Path,
    output: Option<PathBuf>,
    shipping_date: Option<String>,
    mapping_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let platform = Platform::parse(platform).ok_or_else(|| {
        CliError::args(format!("unknown platform '{platform}'"))
            .with_hint("expected one of: shopee, lazada, tiktok")
    })?;
    let target_date = shipping_date
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                CliError::args(format!("invalid date: '{s}'")).with_hint("use YYYY-MM-DD")
            })
        })
        .transpose()?;

    if !input_file.exists() {
        return Err(CliError::missing(format!("input file not found: {}", input_file.display())));
    }
    let mapping_path =
        mapping_file.unwrap_or_else(|| PathBuf::from(platform.default_mapping_file()));
    if !mapping_path.exists() {
        return Err(CliError::missing(format!(
            "mapping file not found: {}",
            mapping_path.display()
        ))
        .with_hint("generate a template with `shoptally mapping init`"));
    }
    let output = output.unwrap_or_else(|| default_output_name(input_file));

    println!("Processing {platform} orders from {}", input_file.display());

    let mut book = ExcelBook::open(input_file).map_err(CliError::io)?;
    let orders = book.read_sheet(platform.orders_sheet(), 0).map_err(CliError::io)?.ok_or_else(
        || {
            CliError::schema(format!(
                "sheet '{}' not found in '{}'",
                platform.orders_sheet(),
                input_file.display()
            ))
        },
    )?;
    let canceled = book.read_sheet("canceled_orders", 0).map_err(CliError::io)?;
    if canceled.is_none() {
        println!("No canceled orders sheet found. Continuing without excluding any orders.");
    }

    let mut mapping_book = ExcelBook::open(&mapping_path).map_err(CliError::io)?;
    let mapping =
        mapping_book.read_sheet("Item Mapping", 0).map_err(CliError::io)?.ok_or_else(|| {
            CliError::schema(format!(
                "sheet 'Item Mapping' not found in '{}'",
                mapping_path.display()
            ))
        })?;

    let input = PipelineInput { orders: &orders, canceled: canceled.as_ref(), mapping: &mapping };
    let result = run(platform, &input, target_date).map_err(CliError::pipeline)?;

    if result.date_was_derived {
        if let Some(date) = result.target_date {
            println!("warning: no shipping date given, using {date} from the first order row");
        }
    }
    println!("Unique order numbers processed: {}", result.order_sn_unique);

    let mut writer = WorkbookWriter::new();
    let plain = SheetStyle::plain();
    let report = SheetStyle::report();

    writer.add_sheet(&result.orders_echo, &plain).map_err(CliError::io)?;
    if platform == Platform::Shopee {
        writer.add_sheet(&result.day_orders, &plain).map_err(CliError::io)?;
    }
    for (label, table) in &result.invoice_sheets {
        let mut sheet = table.clone();
        sheet.name = label.clone();
        writer.add_sheet(&sheet, &report).map_err(CliError::io)?;
    }
    if let Some(deduction) = &result.stock_deduction {
        writer.add_sheet(deduction, &report).map_err(CliError::io)?;
    }
    writer.add_sheet(&result.canceled_echo, &plain).map_err(CliError::io)?;
    writer.add_sheet(&result.finance_summary, &report).map_err(CliError::io)?;
    writer.save(&output).map_err(CliError::io)?;

    println!("Exported to {}", output.display());
    Ok(())
}

/// `orders.xlsx` becomes `orders_output.xlsx`; already-suffixed names
/// are reused so re-runs overwrite their own output.
fn default_output_name(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("orders");
    if stem.ends_with("_output") {
        return input.to_path_buf();
    }
    input.with_file_name(format!("{stem}_output.xlsx"))
}
