use log::{debug, error};
use serde::Serialize;
use serde_json::Value;

use crate::{FlowData, Node, Space};

/// Flow nodes sorted by role. Categories are independent: the same id may show up in more
/// than one list and is never deduplicated.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ExtractedNodes {
    pub spaces: Vec<Node>,
    pub entities: Vec<Node>,
    pub components: Vec<Node>,
    pub events: Vec<Node>,
    pub actions: Vec<Node>,
    pub datas: Vec<Node>,
    pub universo: Vec<Node>,
    pub lights: Vec<Node>,
}

impl ExtractedNodes {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.spaces.len()
            + self.entities.len()
            + self.components.len()
            + self.events.len()
            + self.actions.len()
            + self.datas.len()
            + self.universo.len()
            + self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn append_space(&mut self, space: &Space) {
        self.spaces.push(space.as_node());
        self.entities.extend(space.entities.iter().cloned());
        self.components.extend(space.components.iter().cloned());
        self.events.extend(space.events.iter().cloned());
        self.actions.extend(space.actions.iter().cloned());
        self.datas.extend(space.datas.iter().cloned());
        self.universo.extend(space.universo.iter().cloned());
        self.lights.extend(space.lights());
    }
}

/// Never fails: a flow whose overall shape cannot be read is logged and yields no nodes.
pub fn extract_nodes(raw: &Value) -> ExtractedNodes {
    match FlowData::from_value(raw) {
        Ok(flow) => extract_flow(&flow),
        Err(err) => {
            error!("node extraction failed, continuing with an empty flow: {err}");
            ExtractedNodes::empty()
        }
    }
}

/// Multi-scene nodes come first, in scene order, followed by the single space.
pub fn extract_flow(flow: &FlowData) -> ExtractedNodes {
    let mut out = ExtractedNodes::empty();

    if let Some(multi) = &flow.multi_scene {
        for (index, scene) in multi.scenes.iter().enumerate() {
            let Some(space) = &scene.space_data else {
                debug!(
                    "scene {} ({}) has no space data, skipped",
                    index,
                    scene.scene_id.as_deref().unwrap_or("unnamed")
                );
                continue;
            };
            out.append_space(space);
        }
    }

    if let Some(space) = &flow.updl_space {
        out.append_space(space);
    }

    debug!(
        "extracted {} spaces, {} entities, {} components, {} events, {} actions, {} datas, {} universo, {} lights",
        out.spaces.len(),
        out.entities.len(),
        out.components.len(),
        out.events.len(),
        out.actions.len(),
        out.datas.len(),
        out.universo.len(),
        out.lights.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().filter_map(Node::id).collect()
    }

    #[test]
    fn missing_envelopes_give_empty_categories() {
        let nodes = extract_nodes(&json!({}));
        assert!(nodes.is_empty());
        let nodes = extract_nodes(&json!({ "updlSpace": null, "multiScene": null }));
        assert_eq!(nodes, ExtractedNodes::empty());
    }

    #[test]
    fn structural_failure_is_swallowed() {
        let nodes = extract_nodes(&json!("flow"));
        assert_eq!(nodes, ExtractedNodes::empty());
        assert!(nodes.lights.is_empty());
        assert_eq!(extract_nodes(&json!([{ "id": "e1" }])), ExtractedNodes::empty());
    }

    #[test]
    fn one_bad_value_keeps_the_rest_of_the_flow() {
        let nodes = extract_nodes(&json!({
            "updlSpace": {
                "name": { "en": "Belt" },
                "entities": [{ "id": "e1" }, null, "junk"],
                "components": "not a list",
                "light": { "id": "l0" },
                "lights": [{ "id": "l1" }]
            }
        }));
        assert_eq!(nodes.spaces.len(), 1);
        assert_eq!(ids(&nodes.entities), ["e1"]);
        assert!(nodes.components.is_empty());
        assert_eq!(ids(&nodes.lights), ["l1", "l0"]);
    }

    #[test]
    fn single_space_lists_are_copied_in_order() {
        let nodes = extract_nodes(&json!({
            "updlSpace": {
                "id": "space",
                "entities": [ { "id": "e1" }, { "id": "e2" } ],
                "components": [ { "id": "c1" } ],
                "events": [ { "id": "ev1" } ],
                "actions": [ { "id": "a1" } ],
                "datas": [ { "id": "d1" } ],
                "universo": [ { "id": "u1" } ],
                "lights": [ { "id": "l1" }, { "id": "l2" } ]
            }
        }));
        assert_eq!(ids(&nodes.spaces), ["space"]);
        assert_eq!(ids(&nodes.entities), ["e1", "e2"]);
        assert_eq!(ids(&nodes.components), ["c1"]);
        assert_eq!(ids(&nodes.events), ["ev1"]);
        assert_eq!(ids(&nodes.actions), ["a1"]);
        assert_eq!(ids(&nodes.datas), ["d1"]);
        assert_eq!(ids(&nodes.universo), ["u1"]);
        assert_eq!(ids(&nodes.lights), ["l1", "l2"]);
    }

    #[test]
    fn scenes_concatenate_in_order_then_single_space() {
        let nodes = extract_nodes(&json!({
            "multiScene": {
                "scenes": [
                    { "sceneId": "a", "spaceData": { "id": "sa", "entities": [ { "id": "a1" }, { "id": "a2" } ] } },
                    { "sceneId": "skip" },
                    { "sceneId": "b", "spaceData": { "id": "sb", "entities": [ { "id": "b1" } ], "light": { "id": "lb" } } }
                ]
            },
            "updlSpace": { "id": "solo", "entities": [ { "id": "s1" } ] }
        }));
        assert_eq!(ids(&nodes.spaces), ["sa", "sb", "solo"]);
        assert_eq!(ids(&nodes.entities), ["a1", "a2", "b1", "s1"]);
        assert_eq!(ids(&nodes.lights), ["lb"]);
    }

    #[test]
    fn ids_are_not_deduplicated_across_categories() {
        let nodes = extract_nodes(&json!({
            "updlSpace": {
                "entities": [ { "id": "x" }, { "id": "x" } ],
                "components": [ { "id": "x" } ]
            }
        }));
        assert_eq!(ids(&nodes.entities), ["x", "x"]);
        assert_eq!(ids(&nodes.components), ["x"]);
    }
}
