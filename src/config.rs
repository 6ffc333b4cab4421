use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SrConfig {
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Syntect token highlighting for undimmed hunks
    #[serde(default = "default_true")]
    pub syntax_highlighting: bool,
    /// Word-level highlighting for paired delete/add lines
    #[serde(default = "default_true")]
    pub word_diff: bool,
    /// Syntect theme name
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "base16-ocean.dark".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            syntax_highlighting: true,
            word_diff: true,
            theme: default_theme(),
        }
    }
}

/// Load config from `~/.config/story-review/config.toml`. A missing file
/// yields defaults; a malformed file yields defaults with a warning.
pub fn load_config() -> SrConfig {
    let path = match dirs::config_dir() {
        Some(dir) => dir.join("story-review/config.toml"),
        None => return SrConfig::default(),
    };
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return SrConfig::default(),
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            SrConfig::default()
        }
    }
}

/// Save config to the global config dir
pub fn save_config(config: &SrConfig) -> Result<()> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("story-review");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("config.toml");
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
