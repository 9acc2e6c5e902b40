//! Client configuration at `~/.qcon/config.toml`.
//!
//! Provides default host, port, and game settings. CLI flags always
//! override config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default connection settings.
    #[serde(default)]
    pub default: DefaultConfig,
}

/// Default connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Default game server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Default game server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default game identifier (empty = none).
    #[serde(default)]
    pub game: String,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            game: String::new(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    4181
}

impl Config {
    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &str) -> Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Resolve the CLI target into a connection URL and the game identifier.
///
/// A full `ws://` or `wss://` URL is used as-is with the game derived from
/// its path; a bare game name is combined with the configured host and port.
pub fn resolve_target(target: &str, host: &str, port: u16) -> (String, String) {
    if let Some(rest) = target
        .strip_prefix("ws://")
        .or_else(|| target.strip_prefix("wss://"))
    {
        let path = rest.find('/').map(|pos| &rest[pos..]).unwrap_or("");
        return (target.to_string(), qcon_core::game_id_from_path(path));
    }

    let game = qcon_core::game_id_from_path(target);
    (format!("ws://{host}:{port}/{game}/"), game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.default.host, "localhost");
        assert_eq!(cfg.default.port, 4181);
        assert!(cfg.default.game.is_empty());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[default]
host = "games.example.com"
port = 5000
game = "dungeon"
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.default.host, "games.example.com");
        assert_eq!(cfg.default.port, 5000);
        assert_eq!(cfg.default.game, "dungeon");
    }

    #[test]
    fn parse_partial_toml_config() {
        let toml_str = r#"
[default]
game = "dungeon"
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.default.game, "dungeon");
        assert_eq!(cfg.default.host, "localhost"); // default
        assert_eq!(cfg.default.port, 4181); // default
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = Config::load("/nonexistent/qcon/config.toml").unwrap();
        assert_eq!(cfg.default.port, 4181);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[default]\nhost = \"example.com\"\n").unwrap();

        let cfg = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.default.host, "example.com");
        assert_eq!(cfg.default.port, 4181);
    }

    #[test]
    fn resolve_bare_game_name() {
        let (url, game) = resolve_target("dungeon", "localhost", 4181);
        assert_eq!(url, "ws://localhost:4181/dungeon/");
        assert_eq!(game, "dungeon");
    }

    #[test]
    fn resolve_game_name_with_slashes() {
        let (url, game) = resolve_target("/dungeon/", "localhost", 4181);
        assert_eq!(url, "ws://localhost:4181/dungeon/");
        assert_eq!(game, "dungeon");
    }

    #[test]
    fn resolve_full_url() {
        let (url, game) = resolve_target("ws://games.example.com:5000/dungeon/", "ignored", 1);
        assert_eq!(url, "ws://games.example.com:5000/dungeon/");
        assert_eq!(game, "dungeon");
    }

    #[test]
    fn resolve_url_without_path() {
        let (url, game) = resolve_target("wss://games.example.com:5000", "ignored", 1);
        assert_eq!(url, "wss://games.example.com:5000");
        assert_eq!(game, "");
    }
}
