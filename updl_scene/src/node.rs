//! Graph nodes as they come out of the flow editor: an optional id plus an untyped data bag.
//! Most fields exist either directly under `data` or duplicated under `data.inputs`; readers
//! go through [`Node::resolve`] with an ordered list of candidate paths.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use updl_structs::{FieldPath, first_defined, to_bool, to_number, to_text};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Node {
    #[serde(
        default,
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Node {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: Some(id.into()),
            data,
        }
    }

    /// Non-empty id, if the node carries one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn resolve(&self, paths: &[FieldPath]) -> Option<&Value> {
        first_defined(&self.data, paths)
    }

    /// `data.<name>`, falling back to `data.inputs.<name>`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let direct = self.data.get(name).filter(|v| !v.is_null());
        direct.or_else(|| {
            self.data
                .get("inputs")
                .and_then(|inputs| inputs.get(name))
                .filter(|v| !v.is_null())
        })
    }

    pub fn text(&self, paths: &[FieldPath]) -> Option<String> {
        self.resolve(paths).and_then(to_text)
    }

    pub fn number(&self, paths: &[FieldPath]) -> Option<f64> {
        self.resolve(paths).and_then(to_number)
    }

    pub fn flag(&self, paths: &[FieldPath]) -> Option<bool> {
        self.resolve(paths).and_then(to_bool)
    }

    /// Components wired into an entity (`data.components`, then `data.inputs.components`).
    /// Entries that are not node-shaped are skipped.
    pub fn attached_components(&self) -> Vec<AttachedComponent> {
        let Some(Value::Array(items)) = self.resolve(ATTACHED_COMPONENT_PATHS) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<Node>(item.clone()).ok())
            .map(AttachedComponent::from_node)
            .collect()
    }
}

pub const ATTACHED_COMPONENT_PATHS: &[FieldPath] = &[&["components"], &["inputs", "components"]];
pub const COMPONENT_TYPE_PATHS: &[FieldPath] = &[&["componentType"], &["inputs", "componentType"]];
pub const COMPONENT_PROPERTY_PATHS: &[FieldPath] = &[&["properties"], &["inputs", "properties"]];

pub const CUSTOM_COMPONENT_TYPE: &str = "custom";

/// Lower-cased `componentType` of a component node, `custom` when missing.
pub fn component_type_of(node: &Node) -> String {
    node.text(COMPONENT_TYPE_PATHS)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| CUSTOM_COMPONENT_TYPE.to_string())
}

/// A component as seen from the entity it is wired into.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedComponent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub component_type: String,
    pub properties: Value,
    #[serde(skip)]
    pub node: Node,
}

impl AttachedComponent {
    pub fn from_node(node: Node) -> Self {
        let properties = node
            .resolve(COMPONENT_PROPERTY_PATHS)
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self {
            id: node.id().map(str::to_string),
            component_type: component_type_of(&node),
            properties,
            node,
        }
    }
}

/// Ids arrive as strings or numbers; anything else counts as missing.
pub(crate) fn loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_prefers_data_over_inputs() {
        let node = Node::new("e1", json!({ "entityType": "ship", "inputs": { "entityType": "gate" } }));
        assert_eq!(node.field("entityType"), Some(&json!("ship")));

        let node = Node::new("e2", json!({ "inputs": { "entityType": "gate" } }));
        assert_eq!(node.field("entityType"), Some(&json!("gate")));
        assert_eq!(node.field("missing"), None);
    }

    #[test]
    fn ids_are_loose() {
        let node: Node = serde_json::from_value(json!({ "id": 7, "data": {} })).unwrap();
        assert_eq!(node.id(), Some("7"));
        let node: Node = serde_json::from_value(json!({ "id": "  ", "data": {} })).unwrap();
        assert_eq!(node.id(), None);
        let node: Node = serde_json::from_value(json!({ "data": { "a": 1 } })).unwrap();
        assert_eq!(node.id, None);
    }

    #[test]
    fn component_type_is_lowercased_with_custom_default() {
        let node = Node::new("c", json!({ "componentType": "Render" }));
        assert_eq!(component_type_of(&node), "render");
        let node = Node::new("c", json!({ "inputs": { "componentType": "MINEABLE" } }));
        assert_eq!(component_type_of(&node), "mineable");
        let node = Node::new("c", json!({}));
        assert_eq!(component_type_of(&node), "custom");
    }

    #[test]
    fn attached_components_skip_garbage() {
        let entity = Node::new(
            "e",
            json!({
                "inputs": {
                    "components": [
                        { "id": "c1", "data": { "componentType": "render", "properties": { "color": "#fff" } } },
                        42,
                        { "id": "c2", "data": { "componentType": "mineable" } }
                    ]
                }
            }),
        );
        let components = entity.attached_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].component_type, "render");
        assert_eq!(components[0].properties, json!({ "color": "#fff" }));
        assert_eq!(components[1].id.as_deref(), Some("c2"));
        assert_eq!(components[1].properties, json!({}));
    }
}
