use crate::error::PipelineError;
use crate::model::{CanceledOrderSet, OrderLine};
use crate::platform::{distinct_order_count, LoadedOrders};
use crate::table::Table;

pub const COL_ORDER_ID: &str = "Order ID";
pub const COL_SKU_ID: &str = "SKU ID";
pub const COL_PRODUCT_NAME: &str = "Product Name";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_UNIT_PRICE: &str = "SKU Unit Original Price";
pub const COL_BEFORE_DISCOUNT: &str = "SKU Subtotal Before Discount";
pub const COL_SELLER_DISCOUNT: &str = "SKU Seller Discount";
pub const COL_AFTER_DISCOUNT: &str = "SKU Subtotal After Discount";
/// Optional in-file cancellation marker.
pub const COL_CANCEL_TYPE: &str = "Cancelation/Return Type";

const REQUIRED_COLS: [&str; 8] = [
    COL_ORDER_ID,
    COL_SKU_ID,
    COL_PRODUCT_NAME,
    COL_QUANTITY,
    COL_UNIT_PRICE,
    COL_BEFORE_DISCOUNT,
    COL_SELLER_DISCOUNT,
    COL_AFTER_DISCOUNT,
];

/// Load the TikTok `OrderSKUList` export. The sheet carries a field
/// description row directly under the header, which is always skipped.
pub fn load(orders: &Table, canceled: &CanceledOrderSet) -> Result<LoadedOrders, PipelineError> {
    let order_col = orders.require_col(COL_ORDER_ID)?;
    let sku_col = orders.require_col(COL_SKU_ID)?;
    let name_col = orders.require_col(COL_PRODUCT_NAME)?;
    let qty_col = orders.require_col(COL_QUANTITY)?;
    let unit_col = orders.require_col(COL_UNIT_PRICE)?;
    let before_col = orders.require_col(COL_BEFORE_DISCOUNT)?;
    let discount_col = orders.require_col(COL_SELLER_DISCOUNT)?;
    let after_col = orders.require_col(COL_AFTER_DISCOUNT)?;
    let cancel_col = orders.col(COL_CANCEL_TYPE);

    let mut projected_cols: Vec<&str> = REQUIRED_COLS.to_vec();
    if cancel_col.is_some() {
        projected_cols.push(COL_CANCEL_TYPE);
    }
    let projected = orders.project(&projected_cols);

    let mut day_orders = Table::new("filtered_orders", projected.headers.clone());
    let mut lines = Vec::new();
    for r in 0..orders.rows.len() {
        // description row under the header
        if r == 0 {
            continue;
        }
        let order_id = orders.cell(r, order_col).as_text();
        if order_id.is_empty() {
            continue;
        }
        if cancel_col.map_or(false, |c| !orders.cell(r, c).is_empty()) {
            continue;
        }
        if canceled.contains(&order_id) {
            continue;
        }

        day_orders.push_row(projected.rows[r].clone());
        lines.push(OrderLine {
            order_id,
            platform_sku: orders.cell(r, sku_col).as_text(),
            item_name: orders.cell(r, name_col).as_text(),
            quantity: orders.require_i64(r, qty_col)?,
            unit_price: orders.require_f64(r, unit_col)?,
            net_sale_amount: orders.require_f64(r, after_col)?,
            gross_amount: orders.require_f64(r, before_col)?,
            discount: orders.require_f64(r, discount_col)?,
            ..OrderLine::default()
        });
    }

    let order_sn_unique = distinct_order_count(&lines);
    Ok(LoadedOrders { projected, day_orders, lines, order_sn_unique })
}
