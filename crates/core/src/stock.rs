use indexmap::IndexMap;

use crate::model::{InvoiceGroups, StockDeductionRow};

/// Fold every invoice group into one net-quantity-per-stock-item table.
///
/// Trailer rows (shipping pseudo-item, TOTAL) are skipped; the first
/// occurrence of a stock item seeds its row, later occurrences add to it.
pub fn summarize(groups: &InvoiceGroups) -> Vec<StockDeductionRow> {
    let mut rows: IndexMap<String, StockDeductionRow> = IndexMap::new();
    for invoice in groups.values() {
        for item in invoice.items() {
            rows.entry(item.stock_item_id.clone())
                .and_modify(|r| r.quantity += item.total_quantity)
                .or_insert_with(|| StockDeductionRow {
                    stock_item_id: item.stock_item_id.clone(),
                    stock_item_name: item.stock_item_name.clone(),
                    quantity: item.total_quantity,
                });
        }
    }
    rows.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InvoiceRow, InvoiceTable, SHIPPING_FEE_ITEM_ID, TOTAL_ROW_ID};

    fn invoice(rows: &[(&str, i64)]) -> InvoiceTable {
        let mut out: Vec<InvoiceRow> = rows
            .iter()
            .map(|(id, qty)| InvoiceRow {
                stock_item_id: (*id).into(),
                stock_item_name: format!("stock {id}"),
                total_quantity: *qty,
                net_amount: 10.0,
            })
            .collect();
        out.push(InvoiceRow {
            stock_item_id: SHIPPING_FEE_ITEM_ID.into(),
            stock_item_name: "shipping".into(),
            total_quantity: 1,
            net_amount: 40.0,
        });
        out.push(InvoiceRow {
            stock_item_id: TOTAL_ROW_ID.into(),
            stock_item_name: "total".into(),
            total_quantity: 1,
            net_amount: 50.0,
        });
        InvoiceTable { rows: out }
    }

    #[test]
    fn quantities_accumulate_across_groups_excluding_trailers() {
        let mut groups = InvoiceGroups::new();
        groups.insert("no_vat_2_orders".into(), invoice(&[("10-0001-01", 2), ("10-0002-01", 1)]));
        groups.insert("O9".into(), invoice(&[("10-0001-01", 3)]));

        let deduction = summarize(&groups);
        assert_eq!(deduction.len(), 2);
        assert_eq!(deduction[0].stock_item_id, "10-0001-01");
        assert_eq!(deduction[0].quantity, 5);
        assert_eq!(deduction[1].quantity, 1);
    }
}
