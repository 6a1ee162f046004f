use std::collections::HashMap;

use crate::error::{PipelineError, UnmappedLine};
use crate::model::{MappingEntry, MappingKey, MergedLine, OrderLine};

/// Left-join order lines to mapping entries on the platform identifier.
///
/// Every order line is retained; a line matching several mapping entries
/// fans out to one merged line per entry (one-to-many mapping). Any line
/// left without a match fails the whole merge with `IncompleteMapping`,
/// since invoice aggregation assumes total coverage.
pub fn merge(
    orders: &[OrderLine],
    mapping: &[MappingEntry],
    key: MappingKey,
) -> Result<Vec<MergedLine>, PipelineError> {
    let mut by_key: HashMap<&str, Vec<&MappingEntry>> = HashMap::new();
    for entry in mapping {
        by_key.entry(entry.join_key(key)).or_default().push(entry);
    }

    let mut merged = Vec::with_capacity(orders.len());
    let mut unmapped = Vec::new();
    for order in orders {
        match by_key.get(order.platform_sku.as_str()) {
            Some(entries) => {
                for entry in entries {
                    merged.push(MergedLine {
                        order: order.clone(),
                        mapping: (*entry).clone(),
                        total_quantity: order.quantity * entry.multiplier,
                    });
                }
            }
            None => unmapped.push(UnmappedLine {
                order_id: order.order_id.clone(),
                platform_sku: order.platform_sku.clone(),
                item_name: order.item_name.clone(),
            }),
        }
    }

    if !unmapped.is_empty() {
        return Err(PipelineError::IncompleteMapping { lines: unmapped });
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(order_id: &str, sku: &str, quantity: i64) -> OrderLine {
        OrderLine {
            order_id: order_id.into(),
            platform_sku: sku.into(),
            item_name: format!("item {sku}"),
            quantity,
            ..OrderLine::default()
        }
    }

    fn entry(sku: &str, stock_id: &str, multiplier: i64, ratio: f64) -> MappingEntry {
        MappingEntry {
            platform_item_id: format!("id-{sku}"),
            platform_sku: Some(sku.into()),
            platform_item_name: format!("item {sku}"),
            stock_item_id: stock_id.into(),
            stock_item_name: format!("stock {stock_id}"),
            multiplier,
            ratio,
        }
    }

    #[test]
    fn complete_mapping_never_fails() {
        let orders = vec![order("O1", "A", 2), order("O2", "B", 1)];
        let mapping = vec![entry("A", "10-0001-01", 1, 1.0), entry("B", "10-0002-01", 3, 1.0)];
        let merged = merge(&orders, &mapping, MappingKey::PlatformSku).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].total_quantity, 3);
    }

    #[test]
    fn removing_one_entry_raises_incomplete_mapping() {
        let orders = vec![order("O1", "A", 2), order("O2", "B", 1)];
        let mapping = vec![entry("A", "10-0001-01", 1, 1.0)];
        let err = merge(&orders, &mapping, MappingKey::PlatformSku).unwrap_err();
        match err {
            PipelineError::IncompleteMapping { lines } => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].order_id, "O2");
                assert_eq!(lines[0].platform_sku, "B");
            }
            other => panic!("expected IncompleteMapping, got {other}"),
        }
    }

    #[test]
    fn one_to_many_mapping_fans_out() {
        let orders = vec![order("O1", "A", 2)];
        let mapping = vec![
            entry("A", "10-0001-01", 2, 0.6),
            entry("A", "10-0002-01", 1, 0.4),
        ];
        let merged = merge(&orders, &mapping, MappingKey::PlatformSku).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].total_quantity, 4);
        assert_eq!(merged[1].total_quantity, 2);
    }
}
