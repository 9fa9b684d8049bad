use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::domain::{ServerAddress, DEFAULT_HOST, DEFAULT_PORT};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "gama-console.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub model_file: Option<String>,
    pub experiment_name: Option<String>,
    pub event_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            model_file: None,
            experiment_name: None,
            event_buffer: 1024,
        }
    }
}

impl Settings {
    pub fn address(&self) -> ServerAddress {
        ServerAddress::new(self.host.clone(), self.port)
    }
}

pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut settings = read_settings_file(&path);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn read_settings_file(path: &Path) -> Settings {
    let Ok(raw) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match toml::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config: ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(key));

    if let Some(v) = first(&["APP__HOST", "GAMA_HOST"]) {
        settings.host = v;
    }
    if let Some(v) = first(&["APP__PORT", "GAMA_PORT"]) {
        match v.trim().parse::<u16>() {
            Ok(port) => settings.port = port,
            Err(_) => warn!(value = %v, "config: ignoring invalid port from environment"),
        }
    }
    if let Some(v) = first(&["APP__MODEL_FILE", "GAMA_MODEL_FILE"]) {
        settings.model_file = Some(v);
    }
    if let Some(v) = first(&["APP__EXPERIMENT", "GAMA_EXPERIMENT"]) {
        settings.experiment_name = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
