//! Per-platform order loaders behind a common strategy surface.
//!
//! Each marketplace export has its own sheet name, column layout and
//! filtering rules; everything downstream of `LoadedOrders` is shared.

pub mod lazada;
pub mod shopee;
pub mod tiktok;

use crate::model::MappingKey;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Shopee,
    Lazada,
    Tiktok,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shopee => "shopee",
            Self::Lazada => "lazada",
            Self::Tiktok => "tiktok",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "shopee" => Some(Self::Shopee),
            "lazada" => Some(Self::Lazada),
            "tiktok" => Some(Self::Tiktok),
            _ => None,
        }
    }

    /// Sheet holding the order export inside the input workbook.
    pub fn orders_sheet(&self) -> &'static str {
        match self {
            Self::Shopee => "orders",
            Self::Lazada => "sheet1",
            Self::Tiktok => "OrderSKUList",
        }
    }

    /// Mapping column the platform's SKU identifier joins against.
    pub fn mapping_key(&self) -> MappingKey {
        match self {
            Self::Shopee => MappingKey::PlatformSku,
            Self::Lazada | Self::Tiktok => MappingKey::PlatformItemId,
        }
    }

    pub fn default_mapping_file(&self) -> &'static str {
        match self {
            Self::Shopee => "shopee_item_mapping.xlsx",
            Self::Lazada => "lazada_item_mapping.xlsx",
            Self::Tiktok => "tiktok_item_mapping.xlsx",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized output of a platform loader.
#[derive(Debug)]
pub struct LoadedOrders {
    /// Declared columns of the export, unfiltered; echoed as the `orders` sheet.
    pub projected: Table,
    /// Rows surviving every filter, platform columns intact.
    pub day_orders: Table,
    /// The same rows, normalized.
    pub lines: Vec<crate::model::OrderLine>,
    /// Distinct order ids after all filtering.
    pub order_sn_unique: usize,
}

pub(crate) fn distinct_order_count(lines: &[crate::model::OrderLine]) -> usize {
    let mut seen = std::collections::HashSet::new();
    lines.iter().filter(|l| seen.insert(l.order_id.as_str())).count()
}
