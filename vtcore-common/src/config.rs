// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use directories::BaseDirs;

/// ---------------------------------------------------------------------------------------------
///  Top-level config structure
/// ---------------------------------------------------------------------------------------------
/// Emulator-core settings only. Font rendering, theme palettes, and window
/// chrome live with the backend/frontend, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub version: u32,
    pub grid: GridConfig,
    pub keyboard: KeyboardConfig,
    pub identity: IdentityConfig,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            grid: GridConfig::default(),
            keyboard: KeyboardConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Grid
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub initial_columns: usize,
    pub initial_rows: usize,
    /// Number of simultaneous colors the backend can render: 16, 256, or
    /// 16,777,216 (true color). Anything else is rejected at validation.
    pub color_capability: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            initial_columns: 80,
            initial_rows: 24,
            color_capability: 16_777_216,
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Keyboard
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub repeat_delay_ms: u32,
    pub repeat_interval_ms: u32,
    pub default_layout: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            repeat_delay_ms: 250,
            repeat_interval_ms: 30,
            default_layout: "us-qwerty".to_string(),
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Identity (XTVERSION / DA replies)
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub id: String,
    pub version: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: "vtcore".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// ---------------------------------------------------------------------------------------------
///  Partial config (for layered merging)
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigPartial {
    pub version: Option<u32>,
    pub grid: Option<GridConfig>,
    pub keyboard: Option<KeyboardConfig>,
    pub identity: Option<IdentityConfig>,
}

impl EmulatorConfig {
    fn apply_partial(&mut self, partial: ConfigPartial) {
        if let Some(v) = partial.version {
            self.version = v;
        }
        if let Some(grid) = partial.grid {
            self.grid = grid;
        }
        if let Some(keyboard) = partial.keyboard {
            self.keyboard = keyboard;
        }
        if let Some(identity) = partial.identity {
            self.identity = identity;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.initial_columns == 0 || self.grid.initial_rows == 0 {
            return Err(ConfigError::Validation(
                "grid.initial_columns and grid.initial_rows must be >= 1".to_string(),
            ));
        }

        if !matches!(self.grid.color_capability, 16 | 256 | 16_777_216) {
            return Err(ConfigError::Validation(format!(
                "grid.color_capability={} must be one of 16, 256, 16777216",
                self.grid.color_capability
            )));
        }

        if self.version == 0 {
            return Err(ConfigError::Validation("version must be >= 1".to_string()));
        }

        Ok(())
    }
}

/// ---------------------------------------------------------------------------------------------
///  Errors
/// ---------------------------------------------------------------------------------------------
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// ---------------------------------------------------------------------------------------------
///  Public loader
/// ---------------------------------------------------------------------------------------------
/// Loads configuration by applying layers in order, each overriding the
/// last: built-in defaults, system config, user config, `VTCORE_CONFIG`
/// environment override, then an explicit caller-supplied path.
///
/// # Errors
/// Returns `ConfigError` if any config file cannot be read or parsed, or if
/// the final merged config fails validation.
pub fn load_config(explicit_path: Option<&Path>) -> Result<EmulatorConfig, ConfigError> {
    let mut cfg = EmulatorConfig::default();

    if let Some(system_path) = system_config_path() {
        if system_path.is_file() {
            debug!("loading system config layer from {}", system_path.display());
            let partial = load_partial(&system_path)?;
            cfg.apply_partial(partial);
        }
    }

    if let Some(user_path) = user_config_path() {
        if user_path.is_file() {
            debug!("loading user config layer from {}", user_path.display());
            let partial = load_partial(&user_path)?;
            cfg.apply_partial(partial);
        }
    }

    if let Ok(env_path) = env::var("VTCORE_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.is_file() {
            debug!("loading VTCORE_CONFIG layer from {}", path.display());
            let partial = load_partial(&path)?;
            cfg.apply_partial(partial);
        }
    }

    if let Some(path) = explicit_path {
        if path.is_file() {
            debug!("loading explicit config layer from {}", path.display());
            let partial = load_partial(path)?;
            cfg.apply_partial(partial);
        }
    }

    if let Err(e) = cfg.validate() {
        error!("merged config failed validation: {e}");
        return Err(e);
    }
    Ok(cfg)
}

fn load_partial(path: &Path) -> Result<ConfigPartial, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| {
        warn!("failed to parse config file {}: {source}", path.display());
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[allow(clippy::unnecessary_wraps)]
fn system_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        Some(PathBuf::from("/etc/vtcore/config.toml"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// User config paths:
///
/// Linux:   `$XDG_CONFIG_HOME/vtcore/config.toml`
/// macOS:   ~/Library/Application Support/vtcore/config.toml
/// Windows: %APPDATA%\vtcore\config.toml
#[allow(unreachable_code)]
fn user_config_path() -> Option<PathBuf> {
    let base = BaseDirs::new()?;

    #[cfg(target_os = "macos")]
    {
        let mut p = base.data_dir().join("vtcore");
        create_dir_if_missing(&p);
        p.push("config.toml");
        return Some(p);
    }

    #[cfg(target_os = "windows")]
    {
        let mut p = base.data_dir().join("vtcore");
        create_dir_if_missing(&p);
        p.push("config.toml");
        return Some(p);
    }

    #[cfg(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "dragonfly",
        target_os = "openbsd",
        target_os = "netbsd"
    ))]
    {
        let mut p = base.config_dir().join("vtcore");
        create_dir_if_missing(&p);
        p.push("config.toml");
        return Some(p);
    }

    None
}

#[allow(dead_code)]
fn create_dir_if_missing(path: &Path) {
    if !path.exists() {
        let _ = fs::create_dir_all(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let cfg = EmulatorConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let mut cfg = EmulatorConfig::default();
        cfg.grid.initial_columns = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unsupported_color_capability_is_rejected() {
        let mut cfg = EmulatorConfig::default();
        cfg.grid.color_capability = 42;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_merge_only_overrides_present_fields() {
        let mut cfg = EmulatorConfig::default();
        let partial = ConfigPartial {
            version: None,
            grid: Some(GridConfig {
                initial_columns: 132,
                ..GridConfig::default()
            }),
            keyboard: None,
            identity: None,
        };
        cfg.apply_partial(partial);
        assert_eq!(cfg.grid.initial_columns, 132);
        assert_eq!(cfg.grid.initial_rows, 24);
        assert_eq!(cfg.keyboard.repeat_delay_ms, 250);
    }

    #[test]
    fn explicit_path_overrides_defaults() {
        let dir = env::temp_dir().join(format!(
            "vtcore-config-test-{:?}",
            std::thread::current().id()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("config.toml");
        fs::write(&path, "[grid]\ninitial_columns = 100\n").expect("write temp config");

        let cfg = load_config(Some(&path)).expect("load should succeed");
        assert_eq!(cfg.grid.initial_columns, 100);

        let _ = fs::remove_dir_all(&dir);
    }
}
