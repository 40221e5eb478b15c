//! Configuration loading and management
//!
//! Handles parsing of `bztj.toml` configuration files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE: &str = "bztj.toml";

/// Weight used when the priority table is empty (matches the lowest
/// default tier).
const FALLBACK_WEIGHT: u32 = 100;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Bugzilla installation, used to build per-bug URLs
    #[serde(default = "default_urlbase")]
    pub urlbase: String,

    /// Export behaviour
    #[serde(default)]
    pub export: ExportConfig,

    /// Priority code to TaskJuggler weight mapping
    #[serde(default = "default_priorities")]
    pub priorities: BTreeMap<String, u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urlbase: default_urlbase(),
            export: ExportConfig::default(),
            priorities: default_priorities(),
        }
    }
}

fn default_urlbase() -> String {
    "https://bugzilla.example.com/".to_string()
}

fn default_priorities() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("P1".to_string(), 900),
        ("P2".to_string(), 700),
        ("P3".to_string(), 500),
        ("P4".to_string(), 300),
        ("P5".to_string(), 100),
    ])
}

/// Export-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Summary prefix marking a bug as a grouping (META) bug
    #[serde(default = "default_meta_prefix")]
    pub meta_prefix: String,

    /// Priority code meaning "nobody has prioritized this yet"
    #[serde(default = "default_unprioritized")]
    pub unprioritized: String,

    /// Effort assigned to open bugs with no time estimate
    #[serde(default = "default_effort")]
    pub default_effort: String,

    /// File name of the flag-declaration document
    #[serde(default = "default_flags_file")]
    pub flags_file: String,

    /// File name of the task schema-extension document
    #[serde(default = "default_project_file")]
    pub project_file: String,

    /// File name of the date-macro document
    #[serde(default = "default_macros_file")]
    pub macros_file: String,
}

fn default_meta_prefix() -> String {
    "META: ".to_string()
}

fn default_unprioritized() -> String {
    "P5".to_string()
}

fn default_effort() -> String {
    "16.0h".to_string()
}

fn default_flags_file() -> String {
    "bugzilla_flags.tji".to_string()
}

fn default_project_file() -> String {
    "bugzilla_project.tji".to_string()
}

fn default_macros_file() -> String {
    "date_macros.tji".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            meta_prefix: default_meta_prefix(),
            unprioritized: default_unprioritized(),
            default_effort: default_effort(),
            flags_file: default_flags_file(),
            project_file: default_project_file(),
            macros_file: default_macros_file(),
        }
    }
}

impl Config {
    /// Load configuration from a `bztj.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, from `bztj.toml` in the current
    /// directory, or fall back to defaults when neither exists
    pub fn load_or_default(path: Option<&Path>) -> crate::error::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// TaskJuggler weight for a Bugzilla priority code
    ///
    /// Unknown codes map to the lowest weight in the table.
    pub fn weight_for(&self, code: &str) -> u32 {
        self.priorities
            .get(code)
            .copied()
            .unwrap_or_else(|| self.lowest_weight())
    }

    /// Lowest weight present in the priority table
    pub fn lowest_weight(&self) -> u32 {
        self.priorities
            .values()
            .copied()
            .min()
            .unwrap_or(FALLBACK_WEIGHT)
    }

    /// URL of a bug's page in the tracker
    pub fn bug_url(&self, bug_id: u32) -> String {
        let base = self.urlbase.trim_end_matches('/');
        format!("{base}/show_bug.cgi?id={bug_id}")
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.urlbase.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "urlbase cannot be empty".to_string(),
            ));
        }
        self.export.validate()?;

        if self.priorities.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "priorities table cannot be empty".to_string(),
            ));
        }
        for (code, weight) in &self.priorities {
            if code.trim().is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "priorities cannot include an empty code".to_string(),
                ));
            }
            // TaskJuggler accepts priorities 1..=1000.
            if !(1..=1000).contains(weight) {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "priorities.{code}: weight {weight} must be between 1 and 1000"
                )));
            }
        }

        Ok(())
    }
}

impl ExportConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.meta_prefix.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "export.meta_prefix cannot be empty".to_string(),
            ));
        }
        if self.unprioritized.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "export.unprioritized cannot be empty".to_string(),
            ));
        }
        if self.default_effort.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "export.default_effort cannot be empty".to_string(),
            ));
        }

        for (field, value) in [
            ("export.flags_file", &self.flags_file),
            ("export.project_file", &self.project_file),
            ("export.macros_file", &self.macros_file),
        ] {
            if value.trim().is_empty() {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field} cannot be empty"
                )));
            }
        }

        Ok(())
    }
}
