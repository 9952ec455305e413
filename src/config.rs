// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - A keyboard-driven sidebar companion for a markdown note vault

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Vault REST API connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Base URL of the vault notes endpoint.
    pub api_url: String,
    /// Base URL of the periodic-notes endpoints.
    pub periodic_api_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:27123/vault".to_string(),
            periodic_api_url: "http://127.0.0.1:27123".to_string(),
            api_key: String::new(),
            timeout_secs: 5,
        }
    }
}

/// Hotkey annotation settings for rendered previews.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HotkeysConfig {
    pub enabled: bool,
    /// Exclude digits from the symbol alphabet.
    pub letters_only: bool,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            letters_only: false,
        }
    }
}

/// Open-tab handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Reload a re-activated tab older than this many minutes.
    pub refresh_minutes: i64,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: 480,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PomodoroConfig {
    pub duration_minutes: i64,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 25,
        }
    }
}

/// Well-known vault pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub home_page: String,
    /// Default destination for captured bookmarks.
    pub bookmarks_page: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            home_page: "index.md".to_string(),
            bookmarks_page: "bookmarks/index.md".to_string(),
        }
    }
}

/// Application configuration loaded from config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub hotkeys: HotkeysConfig,
    #[serde(default)]
    pub tabs: TabsConfig,
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
    #[serde(default)]
    pub pages: PagesConfig,
}

/// Returns the path to config.toml.
pub fn config_file_path() -> Result<PathBuf> {
    let dir = ensure_config_dir()?;
    Ok(dir.join("config.toml"))
}

/// Returns the vaultside config directory (~/.config/vaultside).
/// Creates it if it does not exist.
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "vaultside")
        .context("Could not determine XDG config directory")?;
    let config_dir = dirs.config_dir().to_path_buf();
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    Ok(config_dir)
}

/// Load config from ~/.config/vaultside/config.toml.
/// Creates default config file if missing.
pub fn load_config() -> Result<Config> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join("config.toml");

    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?
    } else {
        let default = Config::default();
        let content = generate_default_config(&default);
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write default config: {}", config_path.display()))?;
        default
    };

    Ok(config)
}

fn generate_default_config(config: &Config) -> String {
    let v = &config.vault;
    let h = &config.hotkeys;
    let p = &config.pages;
    format!(
        r#"# Vaultside Configuration

[vault]
# Base URL of the vault notes endpoint
api_url = "{}"
# Base URL of the periodic-notes endpoints
periodic_api_url = "{}"
# Bearer token for the local REST API
api_key = "{}"
# Request timeout in seconds
timeout_secs = {}

[hotkeys]
enabled = {}
# Exclude digits from the symbol alphabet
letters_only = {}

[tabs]
# Reload a re-activated tab older than this many minutes
refresh_minutes = {}

[pomodoro]
duration_minutes = {}

[pages]
home_page = "{}"
# Default destination for captured bookmarks
bookmarks_page = "{}"
"#,
        v.api_url,
        v.periodic_api_url,
        v.api_key,
        v.timeout_secs,
        h.enabled,
        h.letters_only,
        config.tabs.refresh_minutes,
        config.pomodoro.duration_minutes,
        p.home_page,
        p.bookmarks_page,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_default_config_parses_back() {
        let default = Config::default();
        let content = generate_default_config(&default);
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.vault.api_url, default.vault.api_url);
        assert_eq!(parsed.vault.timeout_secs, 5);
        assert!(parsed.hotkeys.enabled);
        assert!(!parsed.hotkeys.letters_only);
        assert_eq!(parsed.pomodoro.duration_minutes, 25);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[hotkeys]\nletters_only = true\n").unwrap();
        assert!(parsed.hotkeys.letters_only);
        assert_eq!(parsed.tabs.refresh_minutes, 480);
        assert_eq!(parsed.pages.home_page, "index.md");
    }
}
