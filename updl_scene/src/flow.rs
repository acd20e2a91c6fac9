//! The compiler input envelope: a single space (`updlSpace`), a multi-scene container
//! (`multiScene`), both, or neither.
//!
//! Reading is lenient below the top level: a list entry that is not node-shaped is skipped on
//! its own, and a field of the wrong kind reads as absent, so one stray value never costs the
//! rest of the flow.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use updl_structs::to_text;

use crate::node::{Node, loose_id};

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("flow data must be an object, found {0}")]
    NotAnObject(&'static str),

    #[error("malformed flow data: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowData {
    #[serde(deserialize_with = "lenient_object")]
    pub updl_space: Option<Space>,
    #[serde(deserialize_with = "lenient_object")]
    pub multi_scene: Option<MultiScene>,
}

impl FlowData {
    /// `null` is an empty flow; any other non-object is rejected.
    pub fn from_value(raw: &Value) -> Result<Self, FlowError> {
        match raw {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => Ok(Self::deserialize(raw)?),
            other => Err(FlowError::NotAnObject(json_kind(other))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updl_space.is_none() && self.multi_scene.is_none()
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiScene {
    #[serde(deserialize_with = "lenient_list")]
    pub scenes: Vec<SceneEntry>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneEntry {
    #[serde(deserialize_with = "loose_id")]
    pub scene_id: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    pub space_data: Option<Space>,
}

/// One scene graph. Lights may come as `lights`, `light`, or both, each a list or one node.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Space {
    #[serde(deserialize_with = "loose_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub name: Option<String>,
    pub data: Value,
    #[serde(deserialize_with = "lenient_list")]
    pub entities: Vec<Node>,
    #[serde(deserialize_with = "lenient_list")]
    pub components: Vec<Node>,
    #[serde(deserialize_with = "lenient_list")]
    pub events: Vec<Node>,
    #[serde(deserialize_with = "lenient_list")]
    pub actions: Vec<Node>,
    #[serde(deserialize_with = "lenient_list")]
    pub datas: Vec<Node>,
    #[serde(deserialize_with = "lenient_list")]
    pub universo: Vec<Node>,
    #[serde(deserialize_with = "one_or_many")]
    pub lights: Vec<Node>,
    #[serde(deserialize_with = "one_or_many")]
    pub light: Vec<Node>,
}

impl Space {
    /// The space itself as a node: its `data` object, with `name` filled in from the space.
    pub fn as_node(&self) -> Node {
        let mut data = match &self.data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        if let Some(name) = &self.name {
            data.entry("name")
                .or_insert_with(|| Value::String(name.clone()));
        }
        Node {
            id: self.id.clone(),
            data: Value::Object(data),
        }
    }

    /// `lights` followed by `light`.
    pub fn lights(&self) -> Vec<Node> {
        self.lights.iter().chain(&self.light).cloned().collect()
    }
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.len() < total {
        debug!("skipped {} malformed list entries", total - kept.len());
    }
    kept
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => lenient_items(items),
        _ => Vec::new(),
    })
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => lenient_items(items),
        single @ Value::Object(_) => lenient_items(vec![single]),
        _ => Vec::new(),
    })
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(to_text(&Value::deserialize(deserializer)?))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_objects_are_empty_flows() {
        assert!(FlowData::from_value(&Value::Null).unwrap().is_empty());
        assert!(FlowData::from_value(&json!({})).unwrap().is_empty());
        assert!(FlowData::from_value(&json!({ "updlSpace": null })).unwrap().is_empty());
        assert!(FlowData::from_value(&json!({ "updlSpace": 5, "multiScene": "x" })).unwrap().is_empty());
    }

    #[test]
    fn scalars_are_rejected() {
        let err = FlowData::from_value(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn null_lists_become_empty() {
        let flow = FlowData::from_value(&json!({
            "updlSpace": { "id": "s", "entities": null, "components": "nope" }
        }))
        .unwrap();
        let space = flow.updl_space.unwrap();
        assert!(space.entities.is_empty());
        assert!(space.components.is_empty());
        assert!(space.lights().is_empty());
    }

    #[test]
    fn bad_entries_are_skipped_one_by_one() {
        let flow = FlowData::from_value(&json!({
            "updlSpace": {
                "name": 42,
                "entities": [{ "id": "e1" }, null, 7, "e", { "id": "e2", "data": { "entityType": "ship" } }]
            }
        }))
        .unwrap();
        let space = flow.updl_space.unwrap();
        let ids: Vec<_> = space.entities.iter().filter_map(Node::id).collect();
        assert_eq!(ids, ["e1", "e2"]);
        assert_eq!(space.name.as_deref(), Some("42"));
    }

    #[test]
    fn single_light_is_lifted_into_a_list() {
        let flow = FlowData::from_value(&json!({
            "updlSpace": { "light": { "id": "l1", "data": { "lightType": "point" } } }
        }))
        .unwrap();
        let lights = flow.updl_space.unwrap().lights();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].id(), Some("l1"));
    }

    #[test]
    fn light_and_lights_are_merged() {
        let flow = FlowData::from_value(&json!({
            "updlSpace": {
                "entities": [{ "id": "e1" }],
                "light": { "id": "l0" },
                "lights": [{ "id": "l1" }]
            }
        }))
        .unwrap();
        let space = flow.updl_space.unwrap();
        assert_eq!(space.entities.len(), 1);
        let ids: Vec<_> = space.lights().iter().filter_map(|l| l.id.clone()).collect();
        assert_eq!(ids, ["l1", "l0"]);
    }

    #[test]
    fn space_node_carries_name() {
        let flow = FlowData::from_value(&json!({
            "updlSpace": { "id": "s1", "name": "Sector", "data": { "backgroundColor": "#000" } }
        }))
        .unwrap();
        let node = flow.updl_space.unwrap().as_node();
        assert_eq!(node.id(), Some("s1"));
        assert_eq!(node.data["name"], json!("Sector"));
        assert_eq!(node.data["backgroundColor"], json!("#000"));
    }
}
