use std::collections::HashSet;

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::error::PipelineError;
use crate::table::Table;

/// Pseudo stock item id carrying the buyer shipping fee on an invoice.
pub const SHIPPING_FEE_ITEM_ID: &str = "00-0000-00";
/// Trailer row id closing every invoice table.
pub const TOTAL_ROW_ID: &str = "TOTAL";

/// Labels on the two synthetic trailer rows (Thai, as on the issued invoices).
pub const SHIPPING_FEE_LABEL: &str = "ค่าจัดส่งที่ชำระโดยผู้ซื้อ";
pub const TOTAL_LABEL: &str = "รวมทั้งหมด";

/// Column of the optional `canceled_orders` sheet.
pub const CANCELED_ORDERS_COLUMN: &str = "canceled_orders_sn";

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// One row of the item mapping table. A platform identifier may map to
/// multiple stock items, each with its own multiplier and ratio.
/// `ratio != 1` signals that monetary value (not quantity) is split
/// proportionally across the co-mapped stock items.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub platform_item_id: String,
    pub platform_sku: Option<String>,
    pub platform_item_name: String,
    pub stock_item_id: String,
    pub stock_item_name: String,
    pub multiplier: i64,
    pub ratio: f64,
}

/// Which mapping column an order export joins against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKey {
    PlatformSku,
    PlatformItemId,
}

impl MappingEntry {
    pub fn join_key(&self, key: MappingKey) -> &str {
        match key {
            MappingKey::PlatformSku => self.platform_sku.as_deref().unwrap_or(""),
            MappingKey::PlatformItemId => &self.platform_item_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxInvoiceRequest {
    Yes,
    No,
}

impl TaxInvoiceRequest {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }
}

/// A platform order export row normalized to a common shape.
/// `order_id` is not unique per row: one order has multiple line items.
#[derive(Debug, Clone, Default)]
pub struct OrderLine {
    pub order_id: String,
    pub platform_sku: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// Net amount the buyer actually paid for the line.
    pub net_sale_amount: f64,
    /// Pre-discount amount (Lazada unitPrice, TikTok subtotal before discount).
    pub gross_amount: f64,
    pub discount: f64,
    pub buyer_shipping_fee: f64,
    pub platform_shipping_subsidy: f64,
    pub tax_invoice_requested: Option<TaxInvoiceRequest>,
    pub expected_ship_date: Option<NaiveDateTime>,
    /// In-file cancellation marker; `None` on every line that survives
    /// cancellation filtering.
    pub cancellation_reason: Option<String>,
}

/// Order ids excluded by the operator via the optional `canceled_orders`
/// sheet. A missing sheet means an empty set, not an error.
#[derive(Debug, Clone, Default)]
pub struct CanceledOrderSet {
    ids: HashSet<String>,
}

impl CanceledOrderSet {
    /// Build from the optional sheet. `None` (sheet absent) yields an empty
    /// set; a present sheet without the id column is a schema error.
    pub fn from_table(table: Option<&Table>) -> Result<Self, PipelineError> {
        let mut ids = HashSet::new();
        if let Some(table) = table {
            let col = table.require_col(CANCELED_ORDERS_COLUMN)?;
            for r in 0..table.rows.len() {
                let cell = table.cell(r, col);
                if !cell.is_empty() {
                    ids.insert(cell.as_text());
                }
            }
        }
        Ok(Self { ids })
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.ids.contains(order_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Merge + invoices
// ---------------------------------------------------------------------------

/// An order line joined with one mapping entry, with the derived
/// `total_quantity = quantity * multiplier`.
#[derive(Debug, Clone)]
pub struct MergedLine {
    pub order: OrderLine,
    pub mapping: MappingEntry,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub stock_item_id: String,
    pub stock_item_name: String,
    pub total_quantity: i64,
    pub net_amount: f64,
}

/// Invoice for one group: stock item rows followed by the shipping-fee
/// pseudo-item and the grand TOTAL trailer.
#[derive(Debug, Clone, Default)]
pub struct InvoiceTable {
    pub rows: Vec<InvoiceRow>,
}

impl InvoiceTable {
    pub fn is_trailer(stock_item_id: &str) -> bool {
        stock_item_id == SHIPPING_FEE_ITEM_ID || stock_item_id == TOTAL_ROW_ID
    }

    /// Stock item rows, trailer rows excluded.
    pub fn items(&self) -> impl Iterator<Item = &InvoiceRow> {
        self.rows.iter().filter(|r| !Self::is_trailer(&r.stock_item_id))
    }

    pub fn total_net_amount(&self) -> f64 {
        self.rows
            .iter()
            .find(|r| r.stock_item_id == TOTAL_ROW_ID)
            .map(|r| r.net_amount)
            .unwrap_or(0.0)
    }
}

/// Invoice groups keyed by sheet label, in presentation order: the pooled
/// no-VAT group first, then one group per tax-invoice order.
pub type InvoiceGroups = IndexMap<String, InvoiceTable>;

#[derive(Debug, Clone, PartialEq)]
pub struct StockDeductionRow {
    pub stock_item_id: String,
    pub stock_item_name: String,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn canceled_set_absent_sheet_is_empty() {
        let set = CanceledOrderSet::from_table(None).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn canceled_set_skips_blank_cells_and_keeps_numeric_ids_exact() {
        let mut t = Table::new("canceled_orders", vec![CANCELED_ORDERS_COLUMN.into()]);
        t.push_row(vec![Cell::Number(250417.0)]);
        t.push_row(vec![Cell::Empty]);
        t.push_row(vec![Cell::Text("ABC-1".into())]);
        let set = CanceledOrderSet::from_table(Some(&t)).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("250417"));
        assert!(set.contains("ABC-1"));
    }

    #[test]
    fn canceled_sheet_without_id_column_is_schema_error() {
        let t = Table::new("canceled_orders", vec!["other".into()]);
        assert!(CanceledOrderSet::from_table(Some(&t)).is_err());
    }

    #[test]
    fn trailer_rows_are_excluded_from_items() {
        let invoice = InvoiceTable {
            rows: vec![
                InvoiceRow {
                    stock_item_id: "10-0001-01".into(),
                    stock_item_name: "Widget".into(),
                    total_quantity: 2,
                    net_amount: 50.0,
                },
                InvoiceRow {
                    stock_item_id: SHIPPING_FEE_ITEM_ID.into(),
                    stock_item_name: SHIPPING_FEE_LABEL.into(),
                    total_quantity: 1,
                    net_amount: 40.0,
                },
                InvoiceRow {
                    stock_item_id: TOTAL_ROW_ID.into(),
                    stock_item_name: TOTAL_LABEL.into(),
                    total_quantity: 1,
                    net_amount: 90.0,
                },
            ],
        };
        assert_eq!(invoice.items().count(), 1);
        assert_eq!(invoice.total_net_amount(), 90.0);
    }
}
