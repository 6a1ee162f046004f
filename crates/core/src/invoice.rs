use std::collections::BTreeMap;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{
    InvoiceGroups, InvoiceRow, InvoiceTable, MergedLine, TaxInvoiceRequest,
    SHIPPING_FEE_ITEM_ID, SHIPPING_FEE_LABEL, TOTAL_LABEL, TOTAL_ROW_ID,
};
use crate::table::{Cell, Table};

/// Partition merged lines by tax-document request status.
///
/// Orders without a tax-invoice request pool into one synthetic group whose
/// label encodes the distinct order count; each order that requested a tax
/// invoice gets its own group (it must produce a standalone document).
/// Lines with an unrecognized status are dropped, matching the export's
/// Yes/No contract. Returned in presentation order: pooled group first.
pub fn partition_groups<'a>(merged: &'a [MergedLine]) -> IndexMap<String, Vec<&'a MergedLine>> {
    let no_vat: Vec<&MergedLine> = merged
        .iter()
        .filter(|l| l.order.tax_invoice_requested == Some(TaxInvoiceRequest::No))
        .collect();
    let no_vat_orders: HashSet<&str> =
        no_vat.iter().map(|l| l.order.order_id.as_str()).collect();

    let mut groups: IndexMap<String, Vec<&MergedLine>> = IndexMap::new();
    groups.insert(format!("no_vat_{}_orders", no_vat_orders.len()), no_vat);

    for line in merged {
        if line.order.tax_invoice_requested == Some(TaxInvoiceRequest::Yes) {
            groups.entry(line.order.order_id.clone()).or_default().push(line);
        }
    }
    groups
}

/// Buyer shipping fee for a group, taken once per distinct order.
///
/// The fee repeats on every line of a multi-line order; summing per line
/// double-counts it, so only the first line of each order contributes.
pub fn group_shipping_fee(group: &[&MergedLine]) -> f64 {
    let mut seen = HashSet::new();
    group
        .iter()
        .filter(|l| seen.insert(l.order.order_id.as_str()))
        .map(|l| l.order.buyer_shipping_fee)
        .sum()
}

/// Build one invoice from a merged group.
///
/// Lines with ratio 1 are grouped by stock item, quantity and net amount
/// summed in full. Lines with ratio != 1 are folded in one at a time:
/// quantity contributes unscaled, only the monetary value is multiplied by
/// the ratio. The ratio splits value across co-mapped stock items without
/// inflating the inventory draw. Two trailer rows close the table: the
/// shipping-fee pseudo-item and the grand TOTAL.
pub fn calculate_invoice(group: &[&MergedLine], buyer_shipping_fee: f64) -> InvoiceTable {
    let mut buckets: BTreeMap<String, InvoiceRow> = BTreeMap::new();
    for line in group.iter().filter(|l| l.mapping.ratio == 1.0) {
        let row = buckets
            .entry(line.mapping.stock_item_id.clone())
            .or_insert_with(|| InvoiceRow {
                stock_item_id: line.mapping.stock_item_id.clone(),
                stock_item_name: line.mapping.stock_item_name.clone(),
                total_quantity: 0,
                net_amount: 0.0,
            });
        row.total_quantity += line.total_quantity;
        row.net_amount += line.order.net_sale_amount;
    }

    let mut rows: IndexMap<String, InvoiceRow> =
        buckets.into_values().map(|r| (r.stock_item_id.clone(), r)).collect();

    for line in group.iter().filter(|l| l.mapping.ratio != 1.0) {
        let adj_amount = line.order.net_sale_amount * line.mapping.ratio;
        let row = rows
            .entry(line.mapping.stock_item_id.clone())
            .or_insert_with(|| InvoiceRow {
                stock_item_id: line.mapping.stock_item_id.clone(),
                stock_item_name: line.mapping.stock_item_name.clone(),
                total_quantity: 0,
                net_amount: 0.0,
            });
        row.total_quantity += line.total_quantity;
        row.net_amount += adj_amount;
    }

    let mut invoice = InvoiceTable { rows: rows.into_values().collect() };

    invoice.rows.push(InvoiceRow {
        stock_item_id: SHIPPING_FEE_ITEM_ID.into(),
        stock_item_name: SHIPPING_FEE_LABEL.into(),
        total_quantity: 1,
        net_amount: buyer_shipping_fee,
    });
    let total: f64 = invoice.rows.iter().map(|r| r.net_amount).sum();
    invoice.rows.push(InvoiceRow {
        stock_item_id: TOTAL_ROW_ID.into(),
        stock_item_name: TOTAL_LABEL.into(),
        total_quantity: 1,
        net_amount: total,
    });
    invoice
}

/// Partition and calculate all invoice groups for a tax-partitioned
/// (Shopee-style) run.
pub fn invoice_groups(merged: &[MergedLine]) -> InvoiceGroups {
    partition_groups(merged)
        .into_iter()
        .map(|(label, group)| {
            let fee = group_shipping_fee(&group);
            (label, calculate_invoice(&group, fee))
        })
        .collect()
}

/// Flat single-invoice rendering used by the Lazada and TikTok runs:
/// group everything by stock item, sum the platform money columns, close
/// with a TOTAL row. `money_headers` names the two or three money columns
/// and `money_of` extracts them per merged line.
fn flat_invoice(
    merged: &[MergedLine],
    money_headers: &[&str],
    money_of: impl Fn(&MergedLine) -> Vec<f64>,
) -> Table {
    let mut headers = vec![
        "stock_item_id".to_string(),
        "stock_item_name".to_string(),
        "จำนวนรวม".to_string(),
    ];
    headers.extend(money_headers.iter().map(|h| h.to_string()));

    let mut buckets: BTreeMap<String, (String, i64, Vec<f64>)> = BTreeMap::new();
    for line in merged {
        let money = money_of(line);
        let entry = buckets
            .entry(line.mapping.stock_item_id.clone())
            .or_insert_with(|| {
                (line.mapping.stock_item_name.clone(), 0, vec![0.0; money.len()])
            });
        entry.1 += line.total_quantity;
        for (slot, value) in entry.2.iter_mut().zip(&money) {
            *slot += value;
        }
    }

    let mut table = Table::new("invoice", headers);
    let mut totals = vec![0.0; money_headers.len()];
    for (stock_item_id, (name, quantity, money)) in buckets {
        for (slot, value) in totals.iter_mut().zip(&money) {
            *slot += value;
        }
        let mut row = vec![
            Cell::Text(stock_item_id),
            Cell::Text(name),
            Cell::Number(quantity as f64),
        ];
        row.extend(money.into_iter().map(Cell::Number));
        table.push_row(row);
    }
    let mut total_row = vec![Cell::Text(TOTAL_ROW_ID.into()), Cell::Empty, Cell::Empty];
    total_row.extend(totals.into_iter().map(Cell::Number));
    table.push_row(total_row);
    table
}

pub fn lazada_invoice(merged: &[MergedLine]) -> Table {
    flat_invoice(merged, &["ลูกค้าจ่าย", "ราคาสุทธิ", "ส่วนลดรวม"], |l| {
        vec![l.order.net_sale_amount, l.order.gross_amount, l.order.discount]
    })
}

pub fn tiktok_invoice(merged: &[MergedLine]) -> Table {
    flat_invoice(
        merged,
        &["SKU Subtotal Before Discount", "SKU Seller Discount"],
        |l| vec![l.order.gross_amount, l.order.discount],
    )
}
