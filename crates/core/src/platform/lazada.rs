use crate::error::PipelineError;
use crate::model::{CanceledOrderSet, OrderLine};
use crate::platform::{distinct_order_count, LoadedOrders};
use crate::table::Table;

pub const COL_ORDER_ITEM_ID: &str = "orderItemId";
pub const COL_ORDER_NUMBER: &str = "orderNumber";
pub const COL_INVOICE_NUMBER: &str = "invoiceNumber";
pub const COL_PAID_PRICE: &str = "paidPrice";
pub const COL_UNIT_PRICE: &str = "unitPrice";
pub const COL_SELLER_DISCOUNT: &str = "sellerDiscountTotal";
pub const COL_ITEM_NAME: &str = "itemName";
pub const COL_SKU: &str = "lazadaSku";

const REQUIRED_COLS: [&str; 8] = [
    COL_ORDER_ITEM_ID,
    COL_ORDER_NUMBER,
    COL_INVOICE_NUMBER,
    COL_PAID_PRICE,
    COL_UNIT_PRICE,
    COL_SELLER_DISCOUNT,
    COL_ITEM_NAME,
    COL_SKU,
];

/// Load the Lazada `sheet1` export. One row per order item, quantity is
/// implicitly 1. The seller-center SKU carries a `_variant` suffix that
/// the mapping table does not, so it is truncated at the first underscore.
/// Canceled-order exclusion is keyed on the order *item* id.
pub fn load(orders: &Table, canceled: &CanceledOrderSet) -> Result<LoadedOrders, PipelineError> {
    // invoiceNumber is required in the export but not read per line
    orders.require_col(COL_INVOICE_NUMBER)?;
    let item_id_col = orders.require_col(COL_ORDER_ITEM_ID)?;
    let order_col = orders.require_col(COL_ORDER_NUMBER)?;
    let paid_col = orders.require_col(COL_PAID_PRICE)?;
    let unit_col = orders.require_col(COL_UNIT_PRICE)?;
    let discount_col = orders.require_col(COL_SELLER_DISCOUNT)?;
    let name_col = orders.require_col(COL_ITEM_NAME)?;
    let sku_col = orders.require_col(COL_SKU)?;

    let projected = orders.project(&REQUIRED_COLS);

    let mut day_orders = Table::new("filtered_orders", projected.headers.clone());
    let mut lines = Vec::new();
    for r in 0..orders.rows.len() {
        let order_item_id = orders.cell(r, item_id_col).as_text();
        if order_item_id.is_empty() || canceled.contains(&order_item_id) {
            continue;
        }
        let sku_raw = orders.cell(r, sku_col).as_text();
        let sku = sku_raw.split('_').next().unwrap_or("").to_string();

        day_orders.push_row(projected.rows[r].clone());
        lines.push(OrderLine {
            order_id: orders.cell(r, order_col).as_text(),
            platform_sku: sku,
            item_name: orders.cell(r, name_col).as_text(),
            quantity: 1,
            unit_price: orders.require_f64(r, unit_col)?,
            net_sale_amount: orders.require_f64(r, paid_col)?,
            gross_amount: orders.require_f64(r, unit_col)?,
            // blank discounts coerce to 0
            discount: orders.require_f64(r, discount_col)?,
            ..OrderLine::default()
        });
    }

    let order_sn_unique = distinct_order_count(&lines);
    Ok(LoadedOrders { projected, day_orders, lines, order_sn_unique })
}
