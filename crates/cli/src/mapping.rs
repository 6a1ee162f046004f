use std::path::{Path, PathBuf};

use shoptally_core::{Cell, MappingKey, Platform, Table};
use shoptally_io::{csv::read_csv, json::read_json, SheetStyle, WorkbookWriter};

use crate::CliError;

/// Build a mapping template workbook: the stock catalog, the platform's
/// product list, and an empty `Item Mapping` sheet to fill in by hand.
/// One platform item may get several rows, one per stock item it draws.
pub fn cmd_mapping_init(
    platform: &str,
    stock_items: &Path,
    items: &Path,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let platform = Platform::parse(platform).ok_or_else(|| {
        CliError::args(format!("unknown platform '{platform}'"))
            .with_hint("expected one of: shopee, lazada, tiktok")
    })?;
    if !stock_items.exists() {
        return Err(CliError::missing(format!(
            "stock items file not found: {}",
            stock_items.display()
        )));
    }
    if !items.exists() {
        return Err(CliError::missing(format!("items file not found: {}", items.display())));
    }
    let output = output.unwrap_or_else(|| PathBuf::from(platform.default_mapping_file()));

    let mut stock = read_csv(stock_items).map_err(CliError::io)?;
    stock.name = "Stock Items".to_string();
    println!("Found {} stock items", stock.rows.len());

    let mut platform_items = if items.extension().and_then(|e| e.to_str()) == Some("json") {
        platform_items_from_json(items)?
    } else {
        read_csv(items).map_err(CliError::io)?
    };
    platform_items.name = "Platform Items".to_string();
    println!("Found {} platform items", platform_items.rows.len());

    let template = mapping_template(platform, platform_items.rows.len());

    let mut writer = WorkbookWriter::new();
    writer.add_sheet(&stock, &SheetStyle::plain()).map_err(CliError::io)?;
    writer.add_sheet(&platform_items, &SheetStyle::plain()).map_err(CliError::io)?;
    writer.add_sheet(&template, &SheetStyle::report()).map_err(CliError::io)?;
    writer.save(&output).map_err(CliError::io)?;

    println!("Created mapping template: {}", output.display());
    println!("Fill in the 'Item Mapping' sheet, then pass it to `shoptally process -m`.");
    Ok(())
}

/// The seller center exposes no product API; the list comes from the
/// products-list XHR response saved as JSON.
fn platform_items_from_json(path: &Path) -> Result<Table, CliError> {
    let value = read_json(path).map_err(CliError::io)?;
    let products = value["data"]["products"].as_array().ok_or_else(|| {
        CliError::schema(format!(
            "'{}' has no data.products array; save the raw products-list response",
            path.display()
        ))
    })?;

    let mut table = Table::new(
        "Platform Items",
        vec!["item_id".into(), "item_name".into(), "item_sku".into()],
    );
    for product in products {
        let first_sku = &product["skus"][0];
        table.push_row(vec![
            json_text(&first_sku["id"]),
            json_text(&product["product_name"]),
            json_text(&first_sku["seller_sku"]),
        ]);
    }
    Ok(table)
}

fn json_text(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::String(s) => Cell::Text(s.clone()),
        serde_json::Value::Number(n) => Cell::Text(n.to_string()),
        _ => Cell::Empty,
    }
}

/// Empty mapping rows, three per platform item so multi-stock-item
/// bundles have room without inserting rows by hand.
fn mapping_template(platform: Platform, platform_item_count: usize) -> Table {
    let mut headers = vec!["platform_item_id".to_string()];
    if platform.mapping_key() == MappingKey::PlatformSku {
        headers.push("platform_sku".to_string());
    }
    headers.extend(
        ["platform_item_name", "stock_item_id", "stock_item_name", "multiplier", "ratio"]
            .map(String::from),
    );

    let mut table = Table::new("Item Mapping", headers);
    for _ in 0..platform_item_count.max(1) * 3 {
        let mut row = vec![Cell::Empty; table.headers.len()];
        let len = row.len();
        row[len - 2] = Cell::Number(1.0);
        row[len - 1] = Cell::Number(1.0);
        table.push_row(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopee_template_carries_the_sku_column() {
        let t = mapping_template(Platform::Shopee, 2);
        assert!(t.headers.contains(&"platform_sku".to_string()));
        assert_eq!(t.rows.len(), 6);
        // multiplier and ratio default to 1
        assert_eq!(t.rows[0][t.headers.len() - 2], Cell::Number(1.0));
        assert_eq!(t.rows[0][t.headers.len() - 1], Cell::Number(1.0));
    }

    #[test]
    fn tiktok_template_keys_on_item_id() {
        let t = mapping_template(Platform::Tiktok, 1);
        assert!(!t.headers.contains(&"platform_sku".to_string()));
        assert_eq!(t.headers[0], "platform_item_id");
        assert_eq!(t.rows.len(), 3);
    }

    #[test]
    fn product_json_is_flattened_to_first_sku() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(
            &path,
            r#"{"data":{"products":[
                {"product_name":"Gift Set A","skus":[{"id":1729,"seller_sku":"GSA"}]},
                {"product_name":"Candy","skus":[{"id":1730,"seller_sku":"CND"}]}
            ]}}"#,
        )
        .unwrap();

        let table = platform_items_from_json(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 0).as_text(), "1729");
        assert_eq!(table.cell(1, 1).as_text(), "Candy");
        assert_eq!(table.cell(1, 2).as_text(), "CND");
    }
}
