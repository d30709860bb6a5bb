use std::path::{Path, PathBuf};

use wanderer_core::{CountingAutomaton, EngineConfig, WandererError};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq)]
pub(crate) struct HostConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ports: PortConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct PortConfig {
    pub input_name: String,
    pub output_name: String,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            input_name: "Wanderer In".to_string(),
            output_name: "Wanderer Out".to_string(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct WatchConfig {
    /// Extra files whose change resets the engine. The config file itself is
    /// always watched.
    pub paths: Vec<PathBuf>,
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { paths: Vec::new(), poll_interval_ms: 500 }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct DisplayConfig {
    pub panes: usize,
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { panes: 4, color: true }
    }
}

pub(crate) fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("WANDERER_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wanderer")
        .join("config.toml")
}

/// Missing file means defaults; a file that does not parse or describes a
/// broken automaton is an error
pub(crate) fn load_config(path: &Path) -> Result<HostConfig, WandererError> {
    let Ok(text) = std::fs::read_to_string(path) else {
        return Ok(HostConfig::default());
    };
    let config: HostConfig = toml::from_str(&text)
        .map_err(|e| WandererError::Config(format!("{}: {e}", path.display())))?;
    CountingAutomaton::validate(&config.engine.automaton)?;
    Ok(config)
}
