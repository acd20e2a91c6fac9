//! Build orchestration: extraction, per-category compilation, and the multiplayer layer on top.

use log::{debug, error, info};
use serde_json::Value;
use updl_ids::{RandomIdGenerator, SharedIdGenerator, shared};
use updl_project::{CompileOptions, GameConfig, GameMode};
use updl_scene::{ExtractedNodes, Node, extract_nodes};
use updl_structs::{FieldPath, Transform, normalize_transform, normalize_triple, to_number, to_text};

use crate::actions::ActionCompiler;
use crate::components::ComponentCompiler;
use crate::datas::DataCompiler;
use crate::entities::EntityCompiler;
use crate::events::EventCompiler;
use crate::lights::LightCompiler;
use crate::network::{network_transform, to_network_entity};
use crate::output::{
    AuthScreenData, BuildOutput, CompiledArtifact, MultiplayerGameData, ProcessedGameData,
    ServerConfig,
};
use crate::spaces::SpaceCompiler;
use crate::{CompileError, EntityType};

pub const DEFAULT_AUTH_TITLE: &str = "Universo MMOOMM";
pub const DEFAULT_AUTH_DESCRIPTION: &str = "Enter your name to join the game";
pub const DEFAULT_AUTH_PLACEHOLDER: &str = "Player name";

const COLLECT_NAME_PATHS: &[FieldPath] = &[
    &["collectName"],
    &["inputs", "collectName"],
    &["collectLeadName"],
    &["inputs", "collectLeadName"],
];
const AUTH_TITLE_PATHS: &[FieldPath] = &[&["authTitle"], &["inputs", "authTitle"], &["title"]];
const AUTH_DESCRIPTION_PATHS: &[FieldPath] = &[
    &["authDescription"],
    &["inputs", "authDescription"],
    &["description"],
];
const AUTH_PLACEHOLDER_PATHS: &[FieldPath] = &[
    &["authPlaceholder"],
    &["inputs", "authPlaceholder"],
    &["placeholder"],
];
const SPAWN_POINT_PATHS: &[FieldPath] = &[&["spawnPoint"], &["inputs", "spawnPoint"]];

const SERVER_HOST_PATHS: &[FieldPath] = &[&["serverHost"], &["inputs", "serverHost"]];
const SERVER_PORT_PATHS: &[FieldPath] = &[&["serverPort"], &["inputs", "serverPort"]];
const ROOM_NAME_PATHS: &[FieldPath] = &[&["roomName"], &["inputs", "roomName"]];
const PROTOCOL_PATHS: &[FieldPath] = &[&["protocol"], &["inputs", "protocol"]];

/// Owns one instance of every category compiler, built up front and reused for each build.
///
/// Nodes without an id get one from the injected [`IdGenerator`](updl_ids::IdGenerator) right
/// after extraction, so the id in a script always matches the id of its artifact. With the
/// default random generator those ids differ between builds.
pub struct HandlerManager {
    config: GameConfig,
    ids: SharedIdGenerator,
    entities: EntityCompiler,
    components: ComponentCompiler,
    spaces: SpaceCompiler,
    lights: LightCompiler,
    events: EventCompiler,
    actions: ActionCompiler,
    datas: DataCompiler,
}

impl HandlerManager {
    pub fn new(config: GameConfig) -> Self {
        Self::with_id_generator(config, shared(RandomIdGenerator))
    }

    pub fn with_id_generator(config: GameConfig, ids: SharedIdGenerator) -> Self {
        let components = ComponentCompiler::new(ids.clone());
        Self {
            config,
            entities: EntityCompiler::new(components.clone(), ids.clone()),
            components,
            spaces: SpaceCompiler::new(ids.clone()),
            lights: LightCompiler::new(ids.clone()),
            events: EventCompiler::new(ids.clone()),
            actions: ActionCompiler::new(ids.clone()),
            datas: DataCompiler::new(ids.clone()),
            ids,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn options(&self) -> &CompileOptions {
        &self.config.compile
    }

    /// Builds in the configured game mode.
    pub fn process(&self, flow: &Value) -> Result<BuildOutput, CompileError> {
        match self.config.game_mode {
            GameMode::Singleplayer => self
                .process_for_single_player(flow)
                .map(BuildOutput::SinglePlayer),
            GameMode::Multiplayer => self
                .process_for_multiplayer(flow)
                .map(BuildOutput::Multiplayer),
        }
    }

    pub fn process_for_single_player(&self, flow: &Value) -> Result<ProcessedGameData, CompileError> {
        let nodes = self.extract(flow);
        let game = self.single_player(&nodes)?;
        info!("single-player build done: {} entities", game.entities.len());
        Ok(game)
    }

    /// Runs the single-player build first and derives the network data from its result, so
    /// the shared fields of both modes are identical.
    pub fn process_for_multiplayer(&self, flow: &Value) -> Result<MultiplayerGameData, CompileError> {
        let nodes = self.extract(flow);
        let game = self.single_player(&nodes)?;

        let network_entities = game
            .entities
            .iter()
            .map(|artifact| to_network_entity(&artifact.data))
            .collect::<Vec<_>>();
        let player_spawn_point = spawn_point(&game.entities, &nodes.spaces);
        let auth_screen_data = auth_screen(nodes.spaces.first());
        let server_config = self.server_config(&nodes.universo);

        info!(
            "multiplayer build done: {} network entities, server {}:{} room {}",
            network_entities.len(),
            server_config.host,
            server_config.port,
            server_config.room_name
        );
        Ok(MultiplayerGameData {
            game,
            network_entities,
            player_spawn_point,
            auth_screen_data,
            server_config,
        })
    }

    fn extract(&self, flow: &Value) -> ExtractedNodes {
        let mut nodes = extract_nodes(flow);
        info!(
            "extracted {} nodes: {} spaces, {} entities, {} components, {} events, {} actions, {} data, {} universo, {} lights",
            nodes.total(),
            nodes.spaces.len(),
            nodes.entities.len(),
            nodes.components.len(),
            nodes.events.len(),
            nodes.actions.len(),
            nodes.datas.len(),
            nodes.universo.len(),
            nodes.lights.len()
        );
        self.assign_ids(&mut nodes.spaces, "space");
        self.assign_ids(&mut nodes.entities, "entity");
        self.assign_ids(&mut nodes.components, "component");
        self.assign_ids(&mut nodes.events, "event");
        self.assign_ids(&mut nodes.actions, "action");
        self.assign_ids(&mut nodes.datas, "data");
        self.assign_ids(&mut nodes.universo, "universo");
        self.assign_ids(&mut nodes.lights, "light");
        nodes
    }

    fn assign_ids(&self, nodes: &mut [Node], prefix: &str) {
        for node in nodes.iter_mut().filter(|n| n.id().is_none()) {
            node.id = Some(self.ids.next_id(prefix));
        }
    }

    fn single_player(&self, nodes: &ExtractedNodes) -> Result<ProcessedGameData, CompileError> {
        let options = self.options();
        let lights = if nodes.lights.is_empty() {
            None
        } else {
            Some(compile_each("lights", &nodes.lights, |n| {
                self.lights.compile(n, options)
            })?)
        };
        Ok(ProcessedGameData {
            entities: compile_each("entities", &nodes.entities, |n| {
                self.entities.compile(n, options)
            })?,
            spaces: compile_each("spaces", &nodes.spaces, |n| self.spaces.compile(n, options))?,
            components: fan_out("components", &nodes.components, |all| {
                self.components.process(all, options)
            })?,
            actions: fan_out("actions", &nodes.actions, |all| {
                self.actions.process(all, options)
            })?,
            events: fan_out("events", &nodes.events, |all| self.events.process(all, options))?,
            datas: fan_out("datas", &nodes.datas, |all| self.datas.process(all, options))?,
            lights,
        })
    }

    /// Config values, each overridden by the first universo node that sets it.
    fn server_config(&self, universo: &[Node]) -> ServerConfig {
        let mp = &self.config.multiplayer;
        let text = |paths: &[FieldPath]| universo.iter().find_map(|n| n.text(paths));
        let port = universo
            .iter()
            .find_map(|n| n.resolve(SERVER_PORT_PATHS).and_then(to_number))
            .filter(|p| *p >= 1.0 && *p <= u16::MAX as f64 && p.fract() == 0.0)
            .map(|p| p as u16);
        ServerConfig {
            host: text(SERVER_HOST_PATHS).unwrap_or_else(|| mp.server_host.clone()),
            port: port.unwrap_or(mp.server_port),
            room_name: text(ROOM_NAME_PATHS).unwrap_or_else(|| mp.room_name.clone()),
            protocol: text(PROTOCOL_PATHS).unwrap_or_else(|| mp.protocol.clone()),
        }
    }
}

fn category_failed(category: &'static str, err: CompileError) -> CompileError {
    error!("{category} compilation failed: {err}");
    CompileError::in_category(category, err)
}

fn artifact(node: &Node, script: String) -> CompiledArtifact {
    CompiledArtifact {
        id: node.id().unwrap_or_default().to_string(),
        script,
        data: node.clone(),
    }
}

/// One script per node.
fn compile_each(
    category: &'static str,
    nodes: &[Node],
    compile: impl Fn(&Node) -> Result<String, CompileError>,
) -> Result<Vec<CompiledArtifact>, CompileError> {
    nodes
        .iter()
        .map(|node| {
            let script = compile(node).map_err(|err| category_failed(category, err))?;
            debug!("{category}: compiled {}", node.id().unwrap_or_default());
            Ok(artifact(node, script))
        })
        .collect()
}

/// One script for the whole category, attached unchanged to every node's artifact.
fn fan_out(
    category: &'static str,
    nodes: &[Node],
    compile: impl FnOnce(&[Node]) -> Result<String, CompileError>,
) -> Result<Vec<CompiledArtifact>, CompileError> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }
    let script = compile(nodes).map_err(|err| category_failed(category, err))?;
    debug!("{category}: one script shared by {} nodes", nodes.len());
    Ok(nodes.iter().map(|node| artifact(node, script.clone())).collect())
}

/// First player or ship entity, else the first space's `spawnPoint`, else the origin.
fn spawn_point(entities: &[CompiledArtifact], spaces: &[Node]) -> Transform {
    let from_entity = entities
        .iter()
        .map(|a| &a.data)
        .find(|n| matches!(EntityType::of(n), EntityType::Player | EntityType::Ship))
        .map(network_transform);
    if let Some(transform) = from_entity {
        return transform;
    }
    match spaces.first().and_then(|s| s.resolve(SPAWN_POINT_PATHS)) {
        Some(raw) if is_bare_triple(raw) => {
            Transform::at(normalize_triple(Some(raw), Transform::DEFAULT.position))
        }
        Some(raw) => normalize_transform(Some(raw)),
        None => Transform::DEFAULT,
    }
}

/// `[x, y, z]` or `{x, y, z}` rather than a full transform object.
fn is_bare_triple(raw: &Value) -> bool {
    match raw {
        Value::Array(_) => true,
        Value::Object(map) => ["x", "y", "z"].iter().any(|k| map.contains_key(*k)),
        _ => false,
    }
}

fn auth_screen(space: Option<&Node>) -> AuthScreenData {
    let text = |paths: &[FieldPath], default: &str| {
        space
            .and_then(|s| s.resolve(paths))
            .and_then(to_text)
            .unwrap_or_else(|| default.to_string())
    };
    AuthScreenData {
        collect_name: space
            .and_then(|s| s.flag(COLLECT_NAME_PATHS))
            .unwrap_or(true),
        title: text(AUTH_TITLE_PATHS, DEFAULT_AUTH_TITLE),
        description: text(AUTH_DESCRIPTION_PATHS, DEFAULT_AUTH_DESCRIPTION),
        placeholder: text(AUTH_PLACEHOLDER_PATHS, DEFAULT_AUTH_PLACEHOLDER),
    }
}
