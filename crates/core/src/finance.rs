use indexmap::IndexMap;

use crate::model::{OrderLine, TOTAL_ROW_ID};
use crate::table::{Cell, Table};

/// Sheet name the reconciliation engine expects in admin files.
pub const FINANCE_SUMMARY_SHEET: &str = "Finance Summary";

enum Fold {
    /// Sum the value over all lines of the order.
    Sum,
    /// Take the value of the order's first line (fields repeated on every
    /// line of a multi-line order, e.g. shipping fees).
    First,
}

struct FinanceColumn {
    header: &'static str,
    fold: Fold,
    value: fn(&OrderLine) -> f64,
}

/// Per-order financial figures with a TOTAL trailer row. Orders appear in
/// encounter order (no sorting) so the summary follows the export.
fn finance_summary(lines: &[OrderLine], key_header: &str, columns: &[FinanceColumn]) -> Table {
    let mut headers = vec![key_header.to_string()];
    headers.extend(columns.iter().map(|c| c.header.to_string()));

    let mut orders: IndexMap<&str, (Vec<f64>, usize)> = IndexMap::new();
    for line in lines {
        let entry = orders
            .entry(line.order_id.as_str())
            .or_insert_with(|| (vec![0.0; columns.len()], 0));
        for (slot, column) in entry.0.iter_mut().zip(columns) {
            match column.fold {
                Fold::Sum => *slot += (column.value)(line),
                Fold::First => {
                    if entry.1 == 0 {
                        *slot = (column.value)(line);
                    }
                }
            }
        }
        entry.1 += 1;
    }

    let mut table = Table::new(FINANCE_SUMMARY_SHEET, headers);
    let mut totals = vec![0.0; columns.len()];
    for (order_id, (values, _)) in &orders {
        for (slot, value) in totals.iter_mut().zip(values) {
            *slot += value;
        }
        let mut row = vec![Cell::Text((*order_id).to_string())];
        row.extend(values.iter().map(|v| Cell::Number(*v)));
        table.push_row(row);
    }
    let mut total_row = vec![Cell::Text(TOTAL_ROW_ID.into())];
    total_row.extend(totals.into_iter().map(Cell::Number));
    table.push_row(total_row);
    table
}

pub fn shopee_finance_summary(lines: &[OrderLine]) -> Table {
    finance_summary(
        lines,
        "หมายเลขคำสั่งซื้อ",
        &[
            FinanceColumn { header: "ราคาขายสุทธิ", fold: Fold::Sum, value: |l| l.net_sale_amount },
            FinanceColumn {
                header: "ค่าจัดส่งที่ชำระโดยผู้ซื้อ",
                fold: Fold::First,
                value: |l| l.buyer_shipping_fee,
            },
            FinanceColumn {
                header: "ค่าจัดส่งที่ Shopee ออกให้โดยประมาณ",
                fold: Fold::First,
                value: |l| l.platform_shipping_subsidy,
            },
        ],
    )
}

pub fn lazada_finance_summary(lines: &[OrderLine]) -> Table {
    finance_summary(
        lines,
        "orderNumber",
        &[
            FinanceColumn { header: "paidPrice", fold: Fold::Sum, value: |l| l.net_sale_amount },
            FinanceColumn { header: "unitPrice", fold: Fold::Sum, value: |l| l.gross_amount },
            FinanceColumn { header: "sellerDiscountTotal", fold: Fold::Sum, value: |l| l.discount },
        ],
    )
}

pub fn tiktok_finance_summary(lines: &[OrderLine]) -> Table {
    finance_summary(
        lines,
        "Order ID",
        &[
            FinanceColumn {
                header: "SKU Subtotal Before Discount",
                fold: Fold::Sum,
                value: |l| l.gross_amount,
            },
            FinanceColumn { header: "SKU Seller Discount", fold: Fold::Sum, value: |l| l.discount },
            FinanceColumn {
                header: "SKU Subtotal After Discount",
                fold: Fold::Sum,
                value: |l| l.net_sale_amount,
            },
        ],
    )
}
