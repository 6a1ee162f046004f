use crate::error::PipelineError;
use crate::model::{MappingEntry, MappingKey};
use crate::table::Table;

const COL_PLATFORM_ITEM_ID: &str = "platform_item_id";
const COL_PLATFORM_SKU: &str = "platform_sku";
const COL_PLATFORM_ITEM_NAME: &str = "platform_item_name";
const COL_STOCK_ITEM_ID: &str = "stock_item_id";
const COL_STOCK_ITEM_NAME: &str = "stock_item_name";
const COL_MULTIPLIER: &str = "multiplier";
const COL_RATIO: &str = "ratio";

/// Load mapping entries from the `Item Mapping` sheet.
///
/// `platform_sku` and `ratio` are optional columns (only the Shopee mapping
/// carries them); a blank or absent ratio defaults to 1.0. Rows whose
/// join-key identifier is blank are template filler and get dropped.
pub fn load_mapping(table: &Table, key: MappingKey) -> Result<Vec<MappingEntry>, PipelineError> {
    let item_id = table.require_col(COL_PLATFORM_ITEM_ID)?;
    let item_name = table.require_col(COL_PLATFORM_ITEM_NAME)?;
    let stock_id = table.require_col(COL_STOCK_ITEM_ID)?;
    let stock_name = table.require_col(COL_STOCK_ITEM_NAME)?;
    let multiplier = table.require_col(COL_MULTIPLIER)?;
    let sku = match key {
        MappingKey::PlatformSku => Some(table.require_col(COL_PLATFORM_SKU)?),
        MappingKey::PlatformItemId => table.col(COL_PLATFORM_SKU),
    };
    let ratio = table.col(COL_RATIO);

    let mut entries = Vec::new();
    for r in 0..table.rows.len() {
        let key_cell = match key {
            MappingKey::PlatformSku => sku.map(|c| table.cell(r, c)),
            MappingKey::PlatformItemId => Some(table.cell(r, item_id)),
        };
        if key_cell.is_none_or(|c| c.is_empty()) {
            continue;
        }
        let entry = MappingEntry {
            platform_item_id: table.cell(r, item_id).as_text(),
            platform_sku: sku.map(|c| table.cell(r, c).as_text()).filter(|s| !s.is_empty()),
            platform_item_name: table.cell(r, item_name).as_text(),
            stock_item_id: table.cell(r, stock_id).as_text(),
            stock_item_name: table.cell(r, stock_name).as_text(),
            multiplier: table.cell(r, multiplier).as_i64().ok_or_else(|| {
                PipelineError::Value {
                    sheet: table.name.clone(),
                    row: r,
                    column: COL_MULTIPLIER.into(),
                    value: table.cell(r, multiplier).as_text(),
                }
            })?,
            ratio: match ratio {
                Some(c) if !table.cell(r, c).is_empty() => {
                    table.cell(r, c).as_f64().ok_or_else(|| PipelineError::Value {
                        sheet: table.name.clone(),
                        row: r,
                        column: COL_RATIO.into(),
                        value: table.cell(r, c).as_text(),
                    })?
                }
                _ => 1.0,
            },
        };
        entries.push(entry);
    }
    Ok(entries)
}
