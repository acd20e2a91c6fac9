//! Build results. Everything here is created fresh per build and serialized as camelCase JSON
//! for the runtime loader and the multiplayer session service.

use serde::Serialize;
use serde_json::Value;
use updl_scene::{AttachedComponent, Node};
use updl_structs::{Transform, Vector3};

/// One compiled node: its id, the script text, and the node it was compiled from.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CompiledArtifact {
    pub id: String,
    pub script: String,
    pub data: Node,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedGameData {
    pub entities: Vec<CompiledArtifact>,
    pub spaces: Vec<CompiledArtifact>,
    pub components: Vec<CompiledArtifact>,
    pub actions: Vec<CompiledArtifact>,
    pub events: Vec<CompiledArtifact>,
    pub datas: Vec<CompiledArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lights: Option<Vec<CompiledArtifact>>,
}

impl ProcessedGameData {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.spaces.is_empty()
            && self.components.is_empty()
            && self.actions.is_empty()
            && self.events.is_empty()
            && self.datas.is_empty()
            && self.lights.as_ref().is_none_or(Vec::is_empty)
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NetworkEntityType {
    Ship,
    Station,
    Asteroid,
    Gate,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NetworkVisual {
    pub model: String,
    pub texture: Option<String>,
    /// Forwarded as found on the node; the runtime normalizes it.
    pub color: Value,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NetworkEntityType,
    pub transform: Transform,
    pub visual: NetworkVisual,
    pub networked: bool,
    pub components: Vec<AttachedComponent>,
    pub entity_type: String,
    pub position: Vector3,
    pub scale: Vector3,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthScreenData {
    pub collect_name: bool,
    pub title: String,
    pub description: String,
    pub placeholder: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub room_name: String,
    pub protocol: String,
}

/// Single-player data plus what the session service needs.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiplayerGameData {
    #[serde(flatten)]
    pub game: ProcessedGameData,
    pub network_entities: Vec<NetworkEntity>,
    pub player_spawn_point: Transform,
    pub auth_screen_data: AuthScreenData,
    pub server_config: ServerConfig,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "gameMode")]
pub enum BuildOutput {
    #[serde(rename = "singleplayer")]
    SinglePlayer(ProcessedGameData),
    #[serde(rename = "multiplayer")]
    Multiplayer(MultiplayerGameData),
}

impl BuildOutput {
    /// The single-player part, present in both modes.
    pub fn game(&self) -> &ProcessedGameData {
        match self {
            Self::SinglePlayer(game) => game,
            Self::Multiplayer(mp) => &mp.game,
        }
    }
}
