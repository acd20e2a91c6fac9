use std::fmt;

use updl_scene::{Node, component_type_of};
use updl_structs::FieldPath;

pub const ENTITY_TYPE_PATHS: &[FieldPath] = &[&["entityType"], &["inputs", "entityType"]];
pub const DEFAULT_ENTITY_TYPE: &str = "static";

/// Raw `entityType` string of an entity node, trimmed and lower-cased; `static` when missing.
pub fn entity_type_name(node: &Node) -> String {
    node.text(ENTITY_TYPE_PATHS)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_ENTITY_TYPE.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityType {
    Player,
    Interactive,
    Vehicle,
    Ship,
    Station,
    Asteroid,
    Gate,
    Static,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::Player,
        EntityType::Interactive,
        EntityType::Vehicle,
        EntityType::Ship,
        EntityType::Station,
        EntityType::Asteroid,
        EntityType::Gate,
        EntityType::Static,
    ];

    /// Unknown names are `Static`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "player" => Self::Player,
            "interactive" => Self::Interactive,
            "vehicle" => Self::Vehicle,
            "ship" => Self::Ship,
            "station" => Self::Station,
            "asteroid" => Self::Asteroid,
            "gate" => Self::Gate,
            _ => Self::Static,
        }
    }

    pub fn of(node: &Node) -> Self {
        Self::parse(&entity_type_name(node))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Interactive => "interactive",
            Self::Vehicle => "vehicle",
            Self::Ship => "ship",
            Self::Station => "station",
            Self::Asteroid => "asteroid",
            Self::Gate => "gate",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Physics,
    Networking,
    Audio,
    Render,
    Custom,
    Inventory,
    Trading,
    Mineable,
    Portal,
    Weapon,
}

impl ComponentType {
    pub const ALL: [ComponentType; 10] = [
        ComponentType::Physics,
        ComponentType::Networking,
        ComponentType::Audio,
        ComponentType::Render,
        ComponentType::Custom,
        ComponentType::Inventory,
        ComponentType::Trading,
        ComponentType::Mineable,
        ComponentType::Portal,
        ComponentType::Weapon,
    ];

    /// Case-insensitive; unknown names are `Custom`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "physics" => Self::Physics,
            "networking" => Self::Networking,
            "audio" => Self::Audio,
            "render" => Self::Render,
            "inventory" => Self::Inventory,
            "trading" => Self::Trading,
            "mineable" => Self::Mineable,
            "portal" => Self::Portal,
            "weapon" => Self::Weapon,
            _ => Self::Custom,
        }
    }

    pub fn of(node: &Node) -> Self {
        Self::parse(&component_type_of(node))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physics => "physics",
            Self::Networking => "networking",
            Self::Audio => "audio",
            Self::Render => "render",
            Self::Custom => "custom",
            Self::Inventory => "inventory",
            Self::Trading => "trading",
            Self::Mineable => "mineable",
            Self::Portal => "portal",
            Self::Weapon => "weapon",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_names_roundtrip_and_default() {
        for ty in EntityType::ALL {
            assert_eq!(EntityType::parse(ty.as_str()), ty);
        }
        assert_eq!(EntityType::parse("Ship"), EntityType::Ship);
        assert_eq!(EntityType::parse("dragon"), EntityType::Static);
        assert_eq!(EntityType::parse(""), EntityType::Static);
    }

    #[test]
    fn entity_type_reads_data_then_inputs() {
        let node = Node::new("e", json!({ "inputs": { "entityType": "Asteroid" } }));
        assert_eq!(entity_type_name(&node), "asteroid");
        assert_eq!(EntityType::of(&node), EntityType::Asteroid);
        assert_eq!(entity_type_name(&Node::new("e", json!({}))), "static");
    }

    #[test]
    fn component_names_roundtrip_and_default() {
        for ty in ComponentType::ALL {
            assert_eq!(ComponentType::parse(ty.as_str()), ty);
        }
        assert_eq!(ComponentType::parse("RENDER"), ComponentType::Render);
        assert_eq!(ComponentType::parse("shield"), ComponentType::Custom);
    }
}
