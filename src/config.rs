use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default = "default_shuffle_questions")]
    pub shuffle_questions: bool,
    #[serde(default = "default_drill_size")]
    pub drill_size: usize,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_roles() -> Vec<String> {
    vec!["user".to_string()]
}
fn default_shuffle_questions() -> bool {
    false
}
fn default_drill_size() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            roles: default_roles(),
            shuffle_questions: default_shuffle_questions(),
            drill_size: default_drill_size(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizdr")
            .join("config.toml")
    }

    /// Drop empty and duplicate role names from hand-edited config files.
    /// An explicitly empty list stays empty (unrestricted tabs only).
    pub fn normalize_roles(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.roles.len());
        for role in self.roles.drain(..) {
            let role = role.trim().to_string();
            if !role.is_empty() && !seen.contains(&role) {
                seen.push(role);
            }
        }
        self.roles = seen;
    }
}
