use std::path::Path;

use glam::DVec2;
use log::info;
use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::runner::Runner;
use crate::solver::SolverParams;

pub const DEFAULT_PATH: &str = "fluidbox.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub physics: SolverParams,
    pub run: Runner,
    pub scene: SceneConfig,
}

/// Closed axis-aligned rectangle in world units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Region {
    pub bl: DVec2,
    pub tr: DVec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct SpawnerConfig {
    /// Simulated seconds between spawns.
    pub interval: f64,
    #[serde(flatten)]
    pub region: Region,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Regions filled before the first step.
    pub fluid: Vec<Region>,
    pub spawner: Option<SpawnerConfig>,
    pub drain: Option<Region>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fluid: vec![Region { bl: DVec2::new(0.02, 0.02), tr: DVec2::new(1.98, 3.0) }],
            spawner: None,
            drain: None,
        }
    }
}

/// Parse and validate a YAML document.
pub fn parse(contents: &str) -> Result<Config> {
    let cfg: Config = serde_yaml::from_str(contents)?;
    cfg.physics.validate()?;
    Ok(cfg)
}

pub fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&contents)
}

/// Load `fluidbox.yaml` from the working directory, or defaults when it is absent.
pub fn load() -> Result<Config> {
    let path = Path::new(DEFAULT_PATH);
    if path.exists() {
        load_from(path)
    } else {
        info!("{DEFAULT_PATH} not found; using defaults");
        Ok(Config::default())
    }
}
