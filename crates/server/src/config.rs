//! Server configuration, read from TOML. Every field has a default, so an
//! empty file (or no file) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use riverbed_engine::world::position::BlockPos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::{self, Material};
use crate::registry::{BlockRegistry, TableRegistry};
use crate::simulation::ScriptedEdit;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown material `{0}`")]
    UnknownMaterial(String),
    #[error("state {state} for `{material}` is above the maximum of {max}", max = block::MAX_STATE)]
    StateOutOfRange { material: String, state: u8 },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub scheduler: SchedulerConfig,
    pub simulation: SimulationConfig,
    pub registry: RegistryConfig,
    pub edits: Vec<EditConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Flat world spans chunks `-radius..radius` on both axes.
    pub chunk_radius: i32,
    /// Layer materials from y=0 upward.
    pub layers: Vec<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_radius: 8,
            layers: ["bedrock", "stone", "stone", "stone", "dirt"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub max_events_per_step: usize,
    /// Waves per cascade before it is cut off.
    pub max_steps: usize,
    pub parallel: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_events_per_step: 10_000,
            max_steps: 1_000,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_ms: u64,
    /// Zero disables the periodic stats line.
    pub stats_interval_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            stats_interval_secs: 30,
        }
    }
}

/// Material names for each registry table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub liquids: Vec<String>,
    pub fluid_replaceable: Vec<String>,
    pub gravity: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            liquids: names(&["water", "lava"]),
            fluid_replaceable: names(&["air", "short_grass", "fern", "dead_bush"]),
            gravity: names(&["sand", "red_sand", "gravel"]),
        }
    }
}

/// A block placed (or removed, with `block = "air"`) at a given tick.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditConfig {
    pub tick: u64,
    pub pos: [i64; 3],
    pub block: String,
    /// State payload; for liquids this is the fluid level.
    #[serde(default)]
    pub state: u8,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn registry(&self) -> Result<TableRegistry, ConfigError> {
        Ok(TableRegistry::new(
            &materials(&self.registry.liquids)?,
            &materials(&self.registry.fluid_replaceable)?,
            &materials(&self.registry.gravity)?,
        ))
    }

    pub fn layers(&self) -> Result<Vec<Material>, ConfigError> {
        materials(&self.world.layers)
    }

    pub fn edits(&self, registry: &impl BlockRegistry) -> Result<Vec<ScriptedEdit>, ConfigError> {
        self.edits
            .iter()
            .map(|edit| {
                let material = material(&edit.block)?;
                if edit.state > block::MAX_STATE {
                    return Err(ConfigError::StateOutOfRange {
                        material: edit.block.clone(),
                        state: edit.state,
                    });
                }
                let [x, y, z] = edit.pos;
                Ok(ScriptedEdit {
                    tick: edit.tick,
                    pos: BlockPos::new(x, y, z),
                    block: registry.block_for(material, edit.state),
                })
            })
            .collect()
    }
}

fn material(name: &str) -> Result<Material, ConfigError> {
    Material::from_name(name).ok_or_else(|| ConfigError::UnknownMaterial(name.to_string()))
}

fn materials(names: &[String]) -> Result<Vec<Material>, ConfigError> {
    names.iter().map(|name| material(name)).collect()
}
