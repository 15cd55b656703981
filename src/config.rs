use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_duration_mins: u32,
    pub model_path: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub log_level: String,
    pub refresh_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration_mins: 90,
            model_path: None,
            export_path: None,
            log_level: "info".to_string(),
            refresh_millis: 250,
        }
    }
}

impl Config {
    pub fn model_path(&self, base_dir: &Path) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| base_dir.join("model.json"))
    }

    pub fn export_path(&self, base_dir: &Path) -> PathBuf {
        self.export_path
            .clone()
            .unwrap_or_else(|| base_dir.join("study_session_log.csv"))
    }
}

pub fn get_base_dir() -> Result<PathBuf> {
    let mut path =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    path.push(".studyflow");
    if !path.exists() {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

pub fn load_config(base_dir: &Path) -> Result<Config> {
    let path = base_dir.join("config.json");

    if !path.exists() {
        let config = Config::default();
        let data = serde_json::to_string_pretty(&config)?;
        fs::write(&path, data)?;
        return Ok(config);
    }

    let data = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&data)?;
    Ok(config)
}
