use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// GUI bootstrap object embedded in the generated HTML shell as `const gui=...;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiInfo {
    pub name: String,
    /// Absolute URL path of the structure file, e.g. `/1234.json`.
    pub structure: String,
    pub stylesheet: String,
}

/// `[type_index, content]` pair describing one widget.
pub type WidgetEntry = (usize, Value);

/// Reference to the root widget: an ordinal in numeric mode, the literal name in debug mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetTable {
    /// Widgets in name order; object references are ordinals into this array.
    Indexed(Vec<WidgetEntry>),
    /// Widgets keyed by name (debug mode).
    Named(BTreeMap<String, WidgetEntry>),
}

impl WidgetTable {
    pub fn len(&self) -> usize {
        match self {
            Self::Indexed(entries) => entries.len(),
            Self::Named(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The JSON intermediate representation consumed by the runtime script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDocument {
    pub main: WidgetRef,
    pub widgets: WidgetTable,
    pub types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn indexed_document_serializes_as_arrays() {
        let document = StructureDocument {
            main: WidgetRef::Index(1),
            widgets: WidgetTable::Indexed(vec![(1, json!({})), (0, json!({"child": {"object": 0}}))]),
            types: vec!["window".into(), "button".into()],
        };
        let value = serde_json::to_value(&document).expect("serialize");
        assert_eq!(
            value,
            json!({
                "main": 1,
                "widgets": [[1, {}], [0, {"child": {"object": 0}}]],
                "types": ["window", "button"],
            })
        );
    }

    #[test]
    fn named_document_keeps_widget_names() {
        let mut widgets = BTreeMap::new();
        widgets.insert("main".to_string(), (0, json!({})));
        let document = StructureDocument {
            main: WidgetRef::Name("main".into()),
            widgets: WidgetTable::Named(widgets),
            types: vec!["window".into()],
        };
        let value = serde_json::to_value(&document).expect("serialize");
        assert_eq!(value["main"], json!("main"));
        assert_eq!(value["widgets"]["main"], json!([0, {}]));
    }
}
