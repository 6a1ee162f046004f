use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::model::{CanceledOrderSet, OrderLine, TaxInvoiceRequest};
use crate::platform::{distinct_order_count, LoadedOrders};
use crate::table::Table;

pub const COL_ORDER_ID: &str = "หมายเลขคำสั่งซื้อ";
pub const COL_PARENT_SKU: &str = "เลขอ้างอิง Parent SKU";
pub const COL_ITEM_NAME: &str = "ชื่อสินค้า";
pub const COL_ORIGINAL_PRICE: &str = "ราคาตั้งต้น";
pub const COL_SALE_PRICE: &str = "ราคาขาย";
pub const COL_QUANTITY: &str = "จำนวน";
pub const COL_NET_SALE: &str = "ราคาขายสุทธิ";
pub const COL_BUYER_SHIPPING: &str = "ค่าจัดส่งที่ชำระโดยผู้ซื้อ";
pub const COL_PLATFORM_SUBSIDY: &str = "ค่าจัดส่งที่ Shopee ออกให้โดยประมาณ";
pub const COL_TAX_INVOICE: &str = "ผู้ซื้อร้องขอใบกำกับภาษี";
pub const COL_SHIP_DATE: &str = "วันที่คาดว่าจะทำการจัดส่งสินค้า";
/// Optional: newer exports carry an in-file cancellation reason.
pub const COL_CANCEL_REASON: &str = "เหตุผลในการยกเลิกคำสั่งซื้อ";

const REQUIRED_COLS: [&str; 11] = [
    COL_ORDER_ID,
    COL_PARENT_SKU,
    COL_ITEM_NAME,
    COL_ORIGINAL_PRICE,
    COL_SALE_PRICE,
    COL_QUANTITY,
    COL_NET_SALE,
    COL_BUYER_SHIPPING,
    COL_PLATFORM_SUBSIDY,
    COL_TAX_INVOICE,
    COL_SHIP_DATE,
];

/// Ship date of the first order row, used by callers that were not given
/// an explicit target date. Fragile by construction: if the export is not
/// sorted by ship date the filter silently misbehaves, so callers should
/// surface a warning when they fall back to this.
pub fn default_target_date(orders: &Table) -> Result<Option<NaiveDate>, PipelineError> {
    let order_col = orders.require_col(COL_ORDER_ID)?;
    let date_col = orders.require_col(COL_SHIP_DATE)?;
    for r in 0..orders.rows.len() {
        if orders.cell(r, order_col).is_empty() {
            continue;
        }
        return Ok(orders.cell(r, date_col).as_datetime().map(|dt| dt.date()));
    }
    Ok(None)
}

/// Load and filter the Shopee `orders` sheet.
///
/// Keeps only rows whose expected-ship-date (date part, time ignored)
/// equals `target_date`, then applies both cancellation mechanisms: the
/// in-file reason column when present, and the canceled-order set.
pub fn load(
    orders: &Table,
    canceled: &CanceledOrderSet,
    target_date: NaiveDate,
) -> Result<LoadedOrders, PipelineError> {
    let mut required: Vec<usize> = Vec::with_capacity(REQUIRED_COLS.len());
    for col in REQUIRED_COLS {
        required.push(orders.require_col(col)?);
    }
    let [order_col, sku_col, name_col, _orig_col, sale_col, qty_col, net_col, fee_col, subsidy_col, tax_col, date_col] =
        required[..]
    else {
        unreachable!()
    };
    let cancel_col = orders.col(COL_CANCEL_REASON);

    let mut projected_cols: Vec<&str> = REQUIRED_COLS.to_vec();
    if cancel_col.is_some() {
        projected_cols.push(COL_CANCEL_REASON);
    }
    let projected = orders.project(&projected_cols);

    let mut day_orders = Table::new("to_day_orders", projected.headers.clone());
    let mut lines = Vec::new();
    for r in 0..orders.rows.len() {
        if orders.cell(r, order_col).is_empty() {
            continue;
        }
        let ship_date = orders.cell(r, date_col).as_datetime();
        if ship_date.map(|dt| dt.date()) != Some(target_date) {
            continue;
        }
        let cancellation_reason = cancel_col
            .map(|c| orders.cell(r, c))
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.as_text());
        if cancellation_reason.is_some() {
            continue;
        }
        let order_id = orders.cell(r, order_col).as_text();
        if canceled.contains(&order_id) {
            continue;
        }

        day_orders.push_row(projected.rows[r].clone());
        lines.push(OrderLine {
            order_id,
            platform_sku: orders.cell(r, sku_col).as_text(),
            item_name: orders.cell(r, name_col).as_text(),
            quantity: orders.require_i64(r, qty_col)?,
            unit_price: orders.require_f64(r, sale_col)?,
            net_sale_amount: orders.require_f64(r, net_col)?,
            buyer_shipping_fee: orders.require_f64(r, fee_col)?,
            platform_shipping_subsidy: orders.require_f64(r, subsidy_col)?,
            tax_invoice_requested: TaxInvoiceRequest::parse(&orders.cell(r, tax_col).as_text()),
            expected_ship_date: ship_date,
            ..OrderLine::default()
        });
    }

    let order_sn_unique = distinct_order_count(&lines);
    Ok(LoadedOrders { projected, day_orders, lines, order_sn_unique })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> Cell {
        Cell::DateTime(
            NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap(),
        )
    }

    fn orders_table(with_cancel_col: bool) -> Table {
        let mut headers: Vec<String> = REQUIRED_COLS.iter().map(|s| s.to_string()).collect();
        if with_cancel_col {
            headers.push(COL_CANCEL_REASON.into());
        }
        Table::new("orders", headers)
    }

    fn order_row(
        order_id: &str,
        sku: &str,
        qty: f64,
        net: f64,
        tax: &str,
        ship: Cell,
        cancel: Option<&str>,
    ) -> Vec<Cell> {
        let mut row = vec![
            Cell::Text(order_id.into()),
            Cell::Text(sku.into()),
            Cell::Text("สินค้า".into()),
            Cell::Number(120.0),
            Cell::Number(100.0),
            Cell::Number(qty),
            Cell::Number(net),
            Cell::Number(40.0),
            Cell::Number(10.0),
            Cell::Text(tax.into()),
            ship,
        ];
        if let Some(reason) = cancel {
            row.push(if reason.is_empty() { Cell::Empty } else { Cell::Text(reason.into()) });
        }
        row
    }

    #[test]
    fn date_filter_ignores_time_of_day() {
        let mut t = orders_table(false);
        t.push_row(order_row("O1", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 8), None));
        t.push_row(order_row("O2", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 22), None));
        t.push_row(order_row("O3", "A", 1.0, 50.0, "No", dt(2025, 4, 18, 8), None));
        let loaded = load(
            &t,
            &CanceledOrderSet::default(),
            NaiveDate::from_ymd_opt(2025, 4, 17).unwrap(),
        )
        .unwrap();
        assert_eq!(loaded.lines.len(), 2);
        assert_eq!(loaded.order_sn_unique, 2);
        assert_eq!(loaded.day_orders.rows.len(), 2);
    }

    #[test]
    fn both_cancellation_mechanisms_apply() {
        let mut t = orders_table(true);
        t.push_row(order_row("O1", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 8), Some("")));
        t.push_row(order_row("O2", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 8), Some("buyer changed mind")));
        t.push_row(order_row("O3", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 8), Some("")));

        let mut canceled_table =
            Table::new("canceled_orders", vec![crate::model::CANCELED_ORDERS_COLUMN.into()]);
        canceled_table.push_row(vec![Cell::Text("O3".into())]);
        let canceled = CanceledOrderSet::from_table(Some(&canceled_table)).unwrap();

        let loaded =
            load(&t, &canceled, NaiveDate::from_ymd_opt(2025, 4, 17).unwrap()).unwrap();
        assert_eq!(loaded.lines.len(), 1);
        assert_eq!(loaded.lines[0].order_id, "O1");
    }

    #[test]
    fn missing_cancel_reason_column_is_not_an_error() {
        let mut t = orders_table(false);
        t.push_row(order_row("O1", "A", 2.0, 50.0, "Yes", dt(2025, 4, 17, 8), None));
        let loaded = load(
            &t,
            &CanceledOrderSet::default(),
            NaiveDate::from_ymd_opt(2025, 4, 17).unwrap(),
        )
        .unwrap();
        assert_eq!(loaded.lines.len(), 1);
        assert_eq!(loaded.lines[0].tax_invoice_requested, Some(TaxInvoiceRequest::Yes));
        assert_eq!(loaded.lines[0].quantity, 2);
    }

    #[test]
    fn default_target_date_comes_from_first_order_row() {
        let mut t = orders_table(false);
        t.push_row({
            let mut row = order_row("", "A", 1.0, 0.0, "No", Cell::Empty, None);
            row[0] = Cell::Empty; // summary/blank row before the data
            row
        });
        t.push_row(order_row("O1", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 8), None));
        let date = default_target_date(&t).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 4, 17));
    }

    #[test]
    fn garbage_quantity_or_money_cells_fail_the_load() {
        let mut t = orders_table(false);
        let mut row = order_row("O1", "A", 1.0, 50.0, "No", dt(2025, 4, 17, 8), None);
        row[5] = Cell::Text("two".into());
        row[6] = Cell::Text("N/A".into());
        t.push_row(row);
        let err = load(
            &t,
            &CanceledOrderSet::default(),
            NaiveDate::from_ymd_opt(2025, 4, 17).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Value { .. }));
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let t = Table::new("orders", vec![COL_ORDER_ID.into()]);
        assert!(load(
            &t,
            &CanceledOrderSet::default(),
            NaiveDate::from_ymd_opt(2025, 4, 17).unwrap()
        )
        .is_err());
    }
}
