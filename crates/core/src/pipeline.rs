use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::error::PipelineError;
use crate::finance;
use crate::invoice;
use crate::mapping::load_mapping;
use crate::merge::merge;
use crate::model::{CanceledOrderSet, InvoiceTable, StockDeductionRow, CANCELED_ORDERS_COLUMN};
use crate::platform::{lazada, shopee, tiktok, Platform};
use crate::stock;
use crate::table::{Cell, Table};

/// Pre-loaded tables for one platform run. The engine never touches
/// files; loading is the caller's concern.
pub struct PipelineInput<'a> {
    pub orders: &'a Table,
    /// The optional `canceled_orders` sheet; `None` means no exclusions.
    pub canceled: Option<&'a Table>,
    pub mapping: &'a Table,
}

/// Everything one run produces, in output-sheet order.
#[derive(Debug)]
pub struct PlatformRun {
    pub platform: Platform,
    pub orders_echo: Table,
    pub day_orders: Table,
    /// One invoice per group, keyed by sheet label.
    pub invoice_sheets: IndexMap<String, Table>,
    /// Net quantity to deduct per stock item (tax-partitioned runs only).
    pub stock_deduction: Option<Table>,
    pub canceled_echo: Table,
    pub finance_summary: Table,
    pub order_sn_unique: usize,
    /// The ship date actually used for filtering, when the platform
    /// filters by date.
    pub target_date: Option<NaiveDate>,
    /// True when the date came from the first-row fallback rather than an
    /// explicit parameter; callers should warn, the heuristic is fragile.
    pub date_was_derived: bool,
}

/// Run the full order pipeline for one platform:
/// load → cancellation filtering → mapping merge → invoices → deduction.
pub fn run(
    platform: Platform,
    input: &PipelineInput<'_>,
    target_date: Option<NaiveDate>,
) -> Result<PlatformRun, PipelineError> {
    let canceled = CanceledOrderSet::from_table(input.canceled)?;
    let mapping = load_mapping(input.mapping, platform.mapping_key())?;

    let (loaded, used_date, date_was_derived) = match platform {
        Platform::Shopee => {
            let (date, derived) = match target_date {
                Some(d) => (d, false),
                None => {
                    let d = shopee::default_target_date(input.orders)?.ok_or_else(|| {
                        PipelineError::Value {
                            sheet: input.orders.name.clone(),
                            row: 0,
                            column: shopee::COL_SHIP_DATE.into(),
                            value: String::new(),
                        }
                    })?;
                    (d, true)
                }
            };
            (shopee::load(input.orders, &canceled, date)?, Some(date), derived)
        }
        Platform::Lazada => (lazada::load(input.orders, &canceled)?, None, false),
        Platform::Tiktok => (tiktok::load(input.orders, &canceled)?, None, false),
    };

    let merged = merge(&loaded.lines, &mapping, platform.mapping_key())?;

    let (invoice_sheets, stock_deduction) = match platform {
        Platform::Shopee => {
            let groups = invoice::invoice_groups(&merged);
            let deduction = stock_deduction_table(&stock::summarize(&groups));
            let sheets = groups
                .iter()
                .map(|(label, table)| (label.clone(), invoice_table_to_sheet(table)))
                .collect();
            (sheets, Some(deduction))
        }
        Platform::Lazada => {
            let label = format!("invoice_{}_orders", loaded.order_sn_unique);
            let mut sheets = IndexMap::new();
            sheets.insert(label, invoice::lazada_invoice(&merged));
            (sheets, None)
        }
        Platform::Tiktok => {
            let label = format!("invoice_{}_orders", loaded.order_sn_unique);
            let mut sheets = IndexMap::new();
            sheets.insert(label, invoice::tiktok_invoice(&merged));
            (sheets, None)
        }
    };

    let finance_summary = match platform {
        Platform::Shopee => finance::shopee_finance_summary(&loaded.lines),
        Platform::Lazada => finance::lazada_finance_summary(&loaded.lines),
        Platform::Tiktok => finance::tiktok_finance_summary(&loaded.lines),
    };

    let canceled_echo = match input.canceled {
        Some(table) => table.clone(),
        None => Table::new("canceled_orders", vec![CANCELED_ORDERS_COLUMN.into()]),
    };

    Ok(PlatformRun {
        platform,
        orders_echo: loaded.projected,
        day_orders: loaded.day_orders,
        invoice_sheets,
        stock_deduction,
        canceled_echo,
        finance_summary,
        order_sn_unique: loaded.order_sn_unique,
        target_date: used_date,
        date_was_derived,
    })
}

fn invoice_table_to_sheet(invoice: &InvoiceTable) -> Table {
    let mut table = Table::new(
        "invoice",
        vec![
            "stock_item_id".into(),
            "stock_item_name".into(),
            "จำนวนรวม".into(),
            "ราคาขายสุทธิ".into(),
        ],
    );
    for row in &invoice.rows {
        table.push_row(vec![
            Cell::Text(row.stock_item_id.clone()),
            Cell::Text(row.stock_item_name.clone()),
            Cell::Number(row.total_quantity as f64),
            Cell::Number(row.net_amount),
        ]);
    }
    table
}

fn stock_deduction_table(rows: &[StockDeductionRow]) -> Table {
    let mut table = Table::new(
        "Stock Deduction",
        vec!["stock_item_id".into(), "stock_item_name".into(), "quantity".into()],
    );
    for row in rows {
        table.push_row(vec![
            Cell::Text(row.stock_item_id.clone()),
            Cell::Text(row.stock_item_name.clone()),
            Cell::Number(row.quantity as f64),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SHIPPING_FEE_ITEM_ID, TOTAL_ROW_ID};
    use chrono::NaiveDate;

    fn shopee_orders() -> Table {
        let headers = vec![
            shopee::COL_ORDER_ID,
            shopee::COL_PARENT_SKU,
            shopee::COL_ITEM_NAME,
            shopee::COL_ORIGINAL_PRICE,
            shopee::COL_SALE_PRICE,
            shopee::COL_QUANTITY,
            shopee::COL_NET_SALE,
            shopee::COL_BUYER_SHIPPING,
            shopee::COL_PLATFORM_SUBSIDY,
            shopee::COL_TAX_INVOICE,
            shopee::COL_SHIP_DATE,
        ];
        let mut t = Table::new("orders", headers.iter().map(|s| s.to_string()).collect());
        let ship = Cell::DateTime(
            NaiveDate::from_ymd_opt(2025, 4, 17).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        );
        for (order, qty, net, tax) in
            [("O1", 2.0, 50.0, "No"), ("O2", 1.0, 25.0, "Yes")]
        {
            t.push_row(vec![
                Cell::Text(order.into()),
                Cell::Text("SKU-A".into()),
                Cell::Text("สินค้า".into()),
                Cell::Number(30.0),
                Cell::Number(25.0),
                Cell::Number(qty),
                Cell::Number(net),
                Cell::Number(40.0),
                Cell::Number(10.0),
                Cell::Text(tax.into()),
                ship.clone(),
            ]);
        }
        t
    }

    fn shopee_mapping() -> Table {
        let mut t = Table::new(
            "Item Mapping",
            vec![
                "platform_item_id".into(),
                "platform_sku".into(),
                "platform_item_name".into(),
                "stock_item_id".into(),
                "stock_item_name".into(),
                "multiplier".into(),
                "ratio".into(),
            ],
        );
        t.push_row(vec![
            Cell::Text("1001".into()),
            Cell::Text("SKU-A".into()),
            Cell::Text("สินค้า".into()),
            Cell::Text("10-000X-01".into()),
            Cell::Text("stock X".into()),
            Cell::Number(1.0),
            Cell::Number(1.0),
        ]);
        t
    }

    #[test]
    fn shopee_run_end_to_end() {
        let orders = shopee_orders();
        let mapping = shopee_mapping();
        let input = PipelineInput { orders: &orders, canceled: None, mapping: &mapping };
        let run = run(Platform::Shopee, &input, None).unwrap();

        assert!(run.date_was_derived);
        assert_eq!(run.order_sn_unique, 2);
        assert_eq!(run.invoice_sheets.len(), 2);

        // no-VAT pool: stock X qty 2, net 50, TOTAL = 50 + shipping 40
        let no_vat = &run.invoice_sheets["no_vat_1_orders"];
        assert_eq!(no_vat.cell(0, 0).as_text(), "10-000X-01");
        assert_eq!(no_vat.cell(0, 2).as_i64(), Some(2));
        assert_eq!(no_vat.cell(0, 3).as_f64(), Some(50.0));
        assert_eq!(no_vat.cell(1, 0).as_text(), SHIPPING_FEE_ITEM_ID);
        assert_eq!(no_vat.cell(2, 0).as_text(), TOTAL_ROW_ID);
        assert_eq!(no_vat.cell(2, 3).as_f64(), Some(90.0));

        // O2's own tax-invoice group: qty 1, net 25
        let o2 = &run.invoice_sheets["O2"];
        assert_eq!(o2.cell(0, 2).as_i64(), Some(1));
        assert_eq!(o2.cell(0, 3).as_f64(), Some(25.0));

        // stock deduction across both groups, trailers excluded
        let deduction = run.stock_deduction.as_ref().unwrap();
        assert_eq!(deduction.rows.len(), 1);
        assert_eq!(deduction.cell(0, 2).as_i64(), Some(3));

        // finance summary: per order plus TOTAL
        assert_eq!(run.finance_summary.rows.len(), 3);
    }

    #[test]
    fn unmapped_sku_fails_the_run() {
        let orders = shopee_orders();
        let mut mapping = shopee_mapping();
        mapping.rows.clear();
        let input = PipelineInput { orders: &orders, canceled: None, mapping: &mapping };
        let err = run(Platform::Shopee, &input, None).unwrap_err();
        assert!(matches!(err, PipelineError::IncompleteMapping { .. }));
    }
}
