// loaded on startup and saved on quit; remembers the engine settings between runs
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::warn;

use crate::pipeline::config::EngineConfig;

const TAPEDECK_DIR: &str = ".tapedeck";
const CONFIG_FILE: &str = "audio.json";
const LOG_FILE: &str = "tapedeck.log";

// <project_dir>/.tapedeck/audio.json
fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(TAPEDECK_DIR).join(CONFIG_FILE)
}

pub fn log_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(TAPEDECK_DIR).join(LOG_FILE)
}

// a missing file is normal on first run; a broken one is logged and ignored
pub fn load_config(project_dir: &Path) -> Option<EngineConfig> {
    let path = config_file_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    let parsed = serde_json::from_str::<EngineConfig>(&data)
        .context("malformed config")
        .and_then(EngineConfig::validated);
    match parsed {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), "ignoring config: {e:#}");
            None
        }
    }
}

// Save the config to disk, making the files if they don't exist already
pub fn save_config(project_dir: &Path, config: &EngineConfig) -> anyhow::Result<()> {
    let path = config_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
