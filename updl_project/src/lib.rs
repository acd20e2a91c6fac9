use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

pub const DEFAULT_SERVER_HOST: &str = "localhost";
pub const DEFAULT_SERVER_PORT: u16 = 2567;
pub const DEFAULT_ROOM_NAME: &str = "mmoomm";
pub const DEFAULT_PROTOCOL: &str = "ws";
pub const DEFAULT_ENTITY_REGISTRY: &str = "UPDLEntities";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("invalid field `{0}`: {1}")]
    InvalidField(&'static str, String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Singleplayer,
    Multiplayer,
}

/// Build options. Keys are camelCase so the same document reads as TOML or JSON:
///
/// ```toml
/// gameMode = "multiplayer"
///
/// [multiplayer]
/// serverHost = "play.example.org"
/// serverPort = 2567
/// roomName = "mmoomm"
///
/// [compile]
/// includeComments = false
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub game_mode: GameMode,
    pub multiplayer: MultiplayerConfig,
    pub compile: CompileOptions,
}

/// Only read when deriving multiplayer output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiplayerConfig {
    pub server_host: String,
    pub server_port: u16,
    pub room_name: String,
    pub protocol: String,
}

impl Default for MultiplayerConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            room_name: DEFAULT_ROOM_NAME.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }
}

/// Shape of the generated scripts. Applied identically in both game modes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    pub include_comments: bool,
    pub entity_registry: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            entity_registry: DEFAULT_ENTITY_REGISTRY.to_string(),
        }
    }
}

impl GameConfig {
    pub fn multiplayer() -> Self {
        Self {
            game_mode: GameMode::Multiplayer,
            ..Self::default()
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// `.json` files are read as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&src)
        } else {
            Self::from_toml_str(&src)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mp = &self.multiplayer;
        if mp.server_host.trim().is_empty() {
            return Err(ConfigError::InvalidField(
                "multiplayer.serverHost",
                "must not be empty".to_string(),
            ));
        }
        if mp.server_port == 0 {
            return Err(ConfigError::InvalidField(
                "multiplayer.serverPort",
                "must be between 1 and 65535".to_string(),
            ));
        }
        if mp.room_name.trim().is_empty() {
            return Err(ConfigError::InvalidField(
                "multiplayer.roomName",
                "must not be empty".to_string(),
            ));
        }
        if !is_script_ident(&self.compile.entity_registry) {
            return Err(ConfigError::InvalidField(
                "compile.entityRegistry",
                format!("`{}` is not a valid identifier", self.compile.entity_registry),
            ));
        }
        Ok(())
    }
}

fn is_script_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_session_service() {
        let config = GameConfig::default();
        assert_eq!(config.game_mode, GameMode::Singleplayer);
        assert_eq!(config.multiplayer.server_host, "localhost");
        assert_eq!(config.multiplayer.server_port, 2567);
        assert_eq!(config.multiplayer.room_name, "mmoomm");
        assert_eq!(config.multiplayer.protocol, "ws");
        assert!(config.compile.include_comments);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
gameMode = "multiplayer"

[multiplayer]
serverHost = "10.0.0.5"
roomName = "arena"
"#,
        )
        .unwrap();
        assert_eq!(config.game_mode, GameMode::Multiplayer);
        assert_eq!(config.multiplayer.server_host, "10.0.0.5");
        assert_eq!(config.multiplayer.server_port, 2567);
        assert_eq!(config.multiplayer.room_name, "arena");
    }

    #[test]
    fn json_is_accepted() {
        let config = GameConfig::from_json_str(
            r#"{ "gameMode": "multiplayer", "multiplayer": { "serverPort": 3000 } }"#,
        )
        .unwrap();
        assert_eq!(config.multiplayer.server_port, 3000);
        assert_eq!(config.multiplayer.server_host, "localhost");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = GameConfig::from_toml_str("[multiplayer]\nserverPort = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField("multiplayer.serverPort", _)));

        let err = GameConfig::from_toml_str("[compile]\nentityRegistry = \"my registry\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField("compile.entityRegistry", _)));

        let err = GameConfig::from_toml_str("gameMode = \"coop\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml(_)));
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = std::env::temp_dir().join(format!("updl_project_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let json_path = dir.join("game.json");
        fs::write(&json_path, r#"{ "gameMode": "multiplayer" }"#).unwrap();
        let toml_path = dir.join("game.toml");
        fs::write(&toml_path, "gameMode = \"singleplayer\"\n").unwrap();

        assert_eq!(GameConfig::load(&json_path).unwrap().game_mode, GameMode::Multiplayer);
        assert_eq!(GameConfig::load(&toml_path).unwrap().game_mode, GameMode::Singleplayer);
        assert!(matches!(
            GameConfig::load(&dir.join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
