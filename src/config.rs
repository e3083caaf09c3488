use crate::shared::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const MODE_ENV_VAR: &str = "TILEWORLD_MODE";
pub const COLLISION_ENV_VAR: &str = "TILEWORLD_COLLISION";
pub const ASSETS_ENV_VAR: &str = "TILEWORLD_ASSETS";
pub const VSYNC_ENV_VAR: &str = "TILEWORLD_VSYNC";
pub const MAX_STEP_ENV_VAR: &str = "TILEWORLD_MAX_STEP_MS";

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("unknown world mode `{0}` (expected room, scroll or viewer)")]
    Mode(String),
    #[error("unknown collision response `{0}` (expected revert, reapply or snap)")]
    Collision(String),
    #[error("{var} must be {expected}, got `{value}`")]
    Value {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which pieces of the world a run puts together.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WorldMode {
    /// Actor in an open room over the animated stream.
    Room,
    /// Tiled level with a following camera, the stream and the actor.
    #[default]
    Scroll,
    /// Tiles seen through a fixed camera. Nothing moves.
    Viewer,
}

impl WorldMode {
    pub fn has_tile_grid(self) -> bool {
        self != WorldMode::Room
    }

    pub fn has_camera(self) -> bool {
        self == WorldMode::Scroll
    }

    pub fn has_actor(self) -> bool {
        self != WorldMode::Viewer
    }

    pub fn has_stream(self) -> bool {
        self != WorldMode::Viewer
    }
}

impl FromStr for WorldMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "room" => Ok(WorldMode::Room),
            "scroll" => Ok(WorldMode::Scroll),
            "viewer" | "tiles" => Ok(WorldMode::Viewer),
            _ => Err(ConfigError::Mode(s.to_string())),
        }
    }
}

impl FromStr for CollisionResponse {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revert" => Ok(CollisionResponse::Revert),
            "reapply" => Ok(CollisionResponse::Reapply),
            "snap" => Ok(CollisionResponse::Snap),
            _ => Err(ConfigError::Collision(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub mode: WorldMode,
    pub collision: CollisionResponse,
    pub assets: PathBuf,
    pub vsync: bool,
    pub max_frame_delta: Duration,
}

impl AppConfig {
    pub fn with_root(root: &Path) -> Self {
        Self {
            window_title: "tileworld".to_string(),
            window_width: SCREEN_WIDTH as u32,
            window_height: SCREEN_HEIGHT as u32,
            mode: WorldMode::default(),
            collision: CollisionResponse::default(),
            assets: root.join("assets"),
            vsync: true,
            max_frame_delta: Duration::from_millis(250),
        }
    }

    /// Defaults, then environment, then the first argument as the mode.
    pub fn from_env(root: &Path) -> Result<Self, ConfigError> {
        Self::from_sources(root, |var| std::env::var(var).ok(), std::env::args().skip(1))
    }

    pub fn from_sources(
        root: &Path,
        var: impl Fn(&str) -> Option<String>,
        mut args: impl Iterator<Item = String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::with_root(root);

        if let Some(mode) = var(MODE_ENV_VAR) {
            config.mode = mode.parse()?;
        }
        if let Some(collision) = var(COLLISION_ENV_VAR) {
            config.collision = collision.parse()?;
        }
        if let Some(assets) = var(ASSETS_ENV_VAR) {
            config.assets = PathBuf::from(assets);
        }
        if let Some(vsync) = var(VSYNC_ENV_VAR) {
            config.vsync = parse_bool(VSYNC_ENV_VAR, &vsync)?;
        }
        if let Some(ms) = var(MAX_STEP_ENV_VAR) {
            config.max_frame_delta = parse_millis(MAX_STEP_ENV_VAR, &ms)?;
        }
        if let Some(mode) = args.next() {
            config.mode = mode.parse()?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::Value {
            var,
            expected: "a boolean",
            value: value.to_string(),
        }),
    }
}

fn parse_millis(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::Value {
            var,
            expected: "a positive number of milliseconds",
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)], args: &[&str]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_sources(
            Path::new("/game"),
            |var| vars.get(var).cloned(),
            args.iter().map(|a| a.to_string()),
        )
    }

    #[test]
    fn defaults() {
        let config = config(&[], &[]).unwrap();
        assert_eq!((config.window_width, config.window_height), (640, 480));
        assert_eq!(config.mode, WorldMode::Scroll);
        assert_eq!(config.collision, CollisionResponse::Revert);
        assert_eq!(config.assets, PathBuf::from("/game/assets"));
        assert!(config.vsync);
        assert_eq!(config.max_frame_delta, Duration::from_millis(250));
    }

    #[test]
    fn env_overrides() {
        let config = config(
            &[
                (MODE_ENV_VAR, "room"),
                (COLLISION_ENV_VAR, "Snap"),
                (ASSETS_ENV_VAR, "/tmp/art"),
                (VSYNC_ENV_VAR, "off"),
                (MAX_STEP_ENV_VAR, "100"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(config.mode, WorldMode::Room);
        assert_eq!(config.collision, CollisionResponse::Snap);
        assert_eq!(config.assets, PathBuf::from("/tmp/art"));
        assert!(!config.vsync);
        assert_eq!(config.max_frame_delta, Duration::from_millis(100));
    }

    #[test]
    fn argument_beats_env() {
        let config = config(&[(MODE_ENV_VAR, "room")], &["viewer"]).unwrap();
        assert_eq!(config.mode, WorldMode::Viewer);
    }

    #[test]
    fn bad_values_are_errors() {
        assert_eq!(
            config(&[], &["dungeon"]).unwrap_err(),
            ConfigError::Mode("dungeon".to_string())
        );
        assert_eq!(
            config(&[(COLLISION_ENV_VAR, "bounce")], &[]).unwrap_err(),
            ConfigError::Collision("bounce".to_string())
        );
        assert!(matches!(
            config(&[(MAX_STEP_ENV_VAR, "0")], &[]),
            Err(ConfigError::Value { var: MAX_STEP_ENV_VAR, .. })
        ));
        assert!(matches!(
            config(&[(VSYNC_ENV_VAR, "maybe")], &[]),
            Err(ConfigError::Value { var: VSYNC_ENV_VAR, .. })
        ));
    }

    #[test]
    fn modes_select_components() {
        let room = WorldMode::Room;
        assert!(room.has_actor() && room.has_stream());
        assert!(!room.has_tile_grid() && !room.has_camera());

        let scroll = WorldMode::Scroll;
        assert!(scroll.has_actor() && scroll.has_tile_grid() && scroll.has_camera());
        assert!(scroll.has_stream());

        let viewer = WorldMode::Viewer;
        assert!(viewer.has_tile_grid());
        assert!(!viewer.has_actor() && !viewer.has_camera() && !viewer.has_stream());
    }

    #[test]
    fn mode_names() {
        assert_eq!("tiles".parse::<WorldMode>().unwrap(), WorldMode::Viewer);
        assert_eq!(" Scroll ".parse::<WorldMode>().unwrap(), WorldMode::Scroll);
        assert!("stream".parse::<WorldMode>().is_err());
    }
}
