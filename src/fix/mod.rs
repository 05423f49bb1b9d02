// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

pub mod tags;

mod dictionaries;

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static STANDARD: Lazy<Arc<FixTables>> = Lazy::new(|| Arc::new(FixTables::build_standard()));

/// Field-name and enumeration lookup used to turn raw tag/value pairs into
/// readable labels.  Instances are immutable once built; the decoder holds
/// them behind an `Arc` so alternative tables can be swapped in per call.
#[derive(Debug, Clone, Default)]
pub struct FixTables {
    tag_to_name: HashMap<u32, String>,
    enum_map: HashMap<u32, HashMap<String, String>>,
}

impl FixTables {
    /// The shared built-in FIX 4.2/4.4 tables.
    pub fn standard() -> Arc<FixTables> {
        Arc::clone(&STANDARD)
    }

    /// Tables with no names or enumerations: every tag becomes `Tag_<n>`
    /// and every value passes through untouched.
    pub fn empty() -> Self {
        Self::default()
    }

    fn build_standard() -> Self {
        let mut tables = Self::empty();
        for (tag, name) in dictionaries::FIELD_NAMES {
            tables = tables.with_field(*tag, name);
        }
        for (tag, values) in dictionaries::VALUE_TABLES {
            for (code, label) in values.iter() {
                tables = tables.with_value(*tag, code, label);
            }
        }
        tables
    }

    pub fn with_field(mut self, tag: u32, name: &str) -> Self {
        self.tag_to_name.insert(tag, name.to_string());
        self
    }

    pub fn with_value(mut self, tag: u32, code: &str, label: &str) -> Self {
        self.enum_map
            .entry(tag)
            .or_default()
            .insert(code.to_string(), label.to_string());
        self
    }

    pub fn is_known(&self, tag: u32) -> bool {
        self.tag_to_name.contains_key(&tag)
    }

    /// Name for a tag, or the synthetic `Tag_<n>` key for tags outside the table.
    pub fn field_name(&self, tag: u32) -> String {
        match self.tag_to_name.get(&tag) {
            Some(name) => name.clone(),
            None => format!("Tag_{tag}"),
        }
    }

    pub fn enum_description(&self, tag: u32, value: &str) -> Option<&str> {
        self.enum_map
            .get(&tag)
            .and_then(|values| values.get(value))
            .map(|s| s.as_str())
    }

    /// Decoded label for a coded value; unmapped codes come back verbatim.
    pub fn decode<'a>(&'a self, tag: u32, value: &'a str) -> &'a str {
        self.enum_description(tag, value).unwrap_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_table_decodes_and_passes_through() {
        let tables = FixTables::standard();
        assert_eq!(tables.decode(tags::SIDE, "1"), "Buy");
        assert_eq!(tables.decode(tags::SIDE, "2"), "Sell");
        assert_eq!(tables.decode(tags::SIDE, "9"), "9");
    }

    #[test]
    fn message_types_cover_order_flow() {
        let tables = FixTables::standard();
        assert_eq!(tables.decode(tags::MSG_TYPE, "D"), "New Order Single");
        assert_eq!(tables.decode(tags::MSG_TYPE, "8"), "Execution Report");
        assert_eq!(
            tables.decode(tags::MSG_TYPE, "G"),
            "Order Cancel/Replace Request"
        );
        assert_eq!(tables.decode(tags::MSG_TYPE, "F"), "Order Cancel Request");
    }

    #[test]
    fn exec_type_extends_ord_status() {
        let tables = FixTables::standard();
        for code in ["0", "1", "2", "4", "5", "6", "8", "9", "A", "C", "E"] {
            assert_eq!(
                tables.decode(tags::ORD_STATUS, code),
                tables.decode(tags::EXEC_TYPE, code),
                "code {code}"
            );
        }
        assert_eq!(tables.decode(tags::EXEC_TYPE, "F"), "Trade");
        assert_eq!(tables.decode(tags::EXEC_TYPE, "D"), "Restated");
        assert_eq!(tables.decode(tags::ORD_STATUS, "F"), "F");
    }

    #[test]
    fn unknown_tags_get_synthetic_names() {
        let tables = FixTables::standard();
        assert_eq!(tables.field_name(38), "OrderQty");
        assert_eq!(tables.field_name(9999), "Tag_9999");
        assert!(!tables.is_known(9999));
    }

    #[test]
    fn custom_tables_replace_standard_labels() {
        let tables = FixTables::empty()
            .with_field(54, "Direction")
            .with_value(54, "1", "Long");
        assert_eq!(tables.field_name(54), "Direction");
        assert_eq!(tables.decode(54, "1"), "Long");
        assert_eq!(tables.field_name(38), "Tag_38");
    }
}
