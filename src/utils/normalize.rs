//! Shop identifier normalization
//!
//! Two separate concerns live here. Join keys are made canonical by replacing
//! whitespace with `_`, so `"Shop A"` in one table meets `"Shop_A"` in the
//! other. Display names come from an optional mapping that renames raw order
//! identifiers (`shop1`) to the names used by the sales data (`Shop_B`).

use std::collections::BTreeMap;

/// Separator substituted for whitespace in shop identifiers
pub const SHOP_ID_SEPARATOR: char = '_';

/// Canonical join key for a shop identifier
#[must_use]
pub fn normalize_shop_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() { SHOP_ID_SEPARATOR } else { c })
        .collect()
}

/// Mapping from raw shop identifiers to display identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopNameMapping {
    names: BTreeMap<String, String>,
}

impl ShopNameMapping {
    /// Create a mapping from `(raw, display)` pairs
    #[must_use]
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    /// Display identifier for `shop_id`; unmapped identifiers pass through
    #[must_use]
    pub fn rename<'a>(&'a self, shop_id: &'a str) -> &'a str {
        self.names.get(shop_id).map_or(shop_id, String::as_str)
    }

    /// Whether the mapping is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ShopNameMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
