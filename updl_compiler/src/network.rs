//! Network entity adapter: derives wire records for the session service from entity nodes.
//!
//! Networking here is decided by entity type alone. A `networked` flag on the node only
//! affects the compiled script, never the wire record.

use serde_json::{Value, json};
use updl_scene::Node;
use updl_structs::{FieldPath, Transform, color_source, lookup, normalize_transform};

use crate::components::attach::RenderParams;
use crate::output::{NetworkEntity, NetworkEntityType, NetworkVisual};
use crate::{ComponentType, entity_type_name};

/// Entity types whose instances are synchronized.
pub const NETWORKED_ENTITY_TYPES: &[&str] = &["ship", "station", "player", "interactive", "vehicle"];

pub const DEFAULT_NETWORK_COLOR: &str = "#ffffff";

const MODEL_PATHS: &[FieldPath] = param_paths!("model");
const TEXTURE_PATHS: &[FieldPath] = param_paths!("texture");

pub fn is_networked_type(entity_type: &str) -> bool {
    NETWORKED_ENTITY_TYPES.contains(&entity_type)
}

impl NetworkEntityType {
    /// Total over strings: anything not in the table is an asteroid.
    pub fn from_entity_type(entity_type: &str) -> Self {
        match entity_type {
            "ship" | "player" | "vehicle" => Self::Ship,
            "station" | "interactive" => Self::Station,
            "gate" | "portal" => Self::Gate,
            _ => Self::Asteroid,
        }
    }
}

/// Entity-level color, else the color of the first attached render component, else white.
/// The raw value is forwarded without normalization.
pub fn network_color(node: &Node) -> Value {
    if let Some(color) = color_source(&node.data) {
        return color.clone();
    }
    node.attached_components()
        .iter()
        .filter(|c| ComponentType::parse(&c.component_type) == ComponentType::Render)
        .find_map(|c| color_source(&c.node.data).cloned())
        .unwrap_or_else(|| json!(DEFAULT_NETWORK_COLOR))
}

/// `data.transform`, unless it carries no position; then `data.inputs.transform`.
pub fn network_transform(node: &Node) -> Transform {
    let direct = lookup(&node.data, &["transform"]);
    let raw = match direct {
        Some(t) if has_position(t) => Some(t),
        _ => lookup(&node.data, &["inputs", "transform"]).or(direct),
    };
    normalize_transform(raw)
}

fn has_position(transform: &Value) -> bool {
    let has = |v: &Value| v.get("pos").or_else(|| v.get("position")).is_some_and(|p| !p.is_null());
    match transform {
        Value::String(s) => serde_json::from_str::<Value>(s).is_ok_and(|v| has(&v)),
        other => has(other),
    }
}

fn visual(node: &Node) -> NetworkVisual {
    let components = node.attached_components();
    let render_model = components
        .iter()
        .find(|c| ComponentType::parse(&c.component_type) == ComponentType::Render)
        .map(|c| RenderParams::from_node(&c.node).primitive);
    NetworkVisual {
        model: node
            .text(MODEL_PATHS)
            .or(render_model)
            .unwrap_or_else(|| "default".to_string()),
        texture: node.text(TEXTURE_PATHS),
        color: network_color(node),
    }
}

pub fn to_network_entity(node: &Node) -> NetworkEntity {
    let entity_type = entity_type_name(node);
    let transform = network_transform(node);
    NetworkEntity {
        id: node.id().unwrap_or_default().to_string(),
        kind: NetworkEntityType::from_entity_type(&entity_type),
        transform,
        visual: visual(node),
        networked: is_networked_type(&entity_type),
        components: node.attached_components(),
        position: transform.position,
        scale: transform.scale,
        entity_type,
    }
}
