//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/kvtree/kvtree.toml`
//! 3. Local config: `<data_dir>/.kvtree.toml` (directory of the data file)
//! 4. Environment variables: `KVTREE_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::DEFAULT_LANGUAGE;

/// Raw settings for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub fallback_language: Option<String>,
    pub localized_sections: Option<Vec<String>>,
}

/// Unified configuration for kvtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Data file used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Language searched when a translation is missing (default: "en")
    pub fallback_language: String,
    /// Sections whose children are stored under composite keys (default: ["no"])
    pub localized_sections: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: None,
            fallback_language: DEFAULT_LANGUAGE.to_string(),
            localized_sections: vec!["no".into()],
        }
    }
}

/// Get the XDG config directory for kvtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kvtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("kvtree.toml"))
}

/// Get the path to the local config file in a data directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".kvtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["no"], &["de"])        // → ["de", "no"]
    /// merge_array(&["no", "de"], &["!no"]) // → ["de"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for item in overlay {
            if let Some(negated) = item.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(item.clone());
            }
        }

        // sorted for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the data file path.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.data_file {
            let raw = path.to_string_lossy();
            let expanded = shellexpand::full(raw.as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.data_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Arrays: union merge with negation support
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay.data_file.clone().or_else(|| self.data_file.clone()),
            fallback_language: overlay
                .fallback_language
                .clone()
                .unwrap_or_else(|| self.fallback_language.clone()),
            localized_sections: overlay
                .localized_sections
                .as_ref()
                .map(|o| Self::merge_array(&self.localized_sections, o))
                .unwrap_or_else(|| self.localized_sections.clone()),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    pub fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            data_file: global.data_file.clone().or_else(|| self.data_file.clone()),
            fallback_language: global
                .fallback_language
                .clone()
                .unwrap_or_else(|| self.fallback_language.clone()),
            localized_sections: global
                .localized_sections
                .clone()
                .unwrap_or_else(|| self.localized_sections.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.kvtree.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply KVTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("KVTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("localized_sections")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("fallback_language") {
            settings.fallback_language = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("localized_sections") {
            settings.localized_sections = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# kvtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/kvtree/kvtree.toml   (defines your baseline)
#   Local:  <data_dir>/.kvtree.toml        (next to the data file)
#   Env:    KVTREE_* environment variables  (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     localized_sections = ["de", "!no"]

# Data file loaded when --file is not given
# data_file = "~/data/strings.txt"

# Language used when a translation is missing
# fallback_language = "en"

# Sections whose children are stored under composite keys (no.greeting -> nogreeting)
# localized_sections = ["no"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
