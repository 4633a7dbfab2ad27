//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/progtree/progtree.toml`
//! 3. Explicit config file given on the command line
//! 4. Environment variables: `PROGTREE_*` prefix

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// First month of an academic year.
const ACADEMIC_YEAR_START_MONTH: u32 = 9;

/// Initial value of a node field when the system creates the node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldRuleConfig {
    /// Node type name, e.g. `COMMON_CORE` or `PGRM_MASTER_120`
    pub node_type: String,
    /// Field name, e.g. `credits`, `constraint_type`, `title_fr`
    pub field: String,
    pub initial_value: String,
    /// Applies to nodes created for a specific version
    #[serde(default)]
    pub is_version: bool,
}

impl FieldRuleConfig {
    fn same_target(&self, other: &FieldRuleConfig) -> bool {
        self.node_type == other.node_type && self.field == other.field && self.is_version == other.is_version
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub year_limit_edg_modification: Option<u32>,
    pub postponement_delta: Option<u32>,
    pub current_academic_year: Option<u32>,
    pub first_generated_node_id: Option<i64>,
    pub field_rules: Option<Vec<FieldRuleConfig>>,
}

/// Unified configuration for progtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Trees of earlier years are read-only
    pub year_limit_edg_modification: u32,
    /// Years after the current academic year up to which postponement goes
    pub postponement_delta: u32,
    /// Current academic year (default: derived from the local clock)
    pub current_academic_year: Option<u32>,
    /// First id handed out to nodes created by the system
    pub first_generated_node_id: i64,
    /// Initial values of generated nodes
    pub field_rules: Vec<FieldRuleConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            year_limit_edg_modification: 2019,
            postponement_delta: 6,
            current_academic_year: None,
            first_generated_node_id: 1_000_000,
            field_rules: Vec::new(),
        }
    }
}

/// Get the XDG config directory for progtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "progtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("progtree.toml"))
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

/// Academic year running on `year-month`: it starts in September.
pub fn academic_year_of(year: i32, month: u32) -> u32 {
    let start = if month >= ACADEMIC_YEAR_START_MONTH { year } else { year - 1 };
    u32::try_from(start).unwrap_or_default()
}

impl Settings {
    /// Academic year used as "now".
    pub fn academic_year(&self) -> u32 {
        self.current_academic_year.unwrap_or_else(|| {
            let today = Local::now().date_naive();
            academic_year_of(today.year(), today.month())
        })
    }

    /// Last year reached by postponement.
    pub fn max_postponement_year(&self) -> u32 {
        self.academic_year() + self.postponement_delta
    }

    /// Overlay scalars win when set; field rules are merged, the overlay
    /// replacing a rule with the same target.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut field_rules = self.field_rules.clone();
        for rule in overlay.field_rules.iter().flatten() {
            match field_rules.iter_mut().find(|existing| existing.same_target(rule)) {
                Some(existing) => *existing = rule.clone(),
                None => field_rules.push(rule.clone()),
            }
        }
        Self {
            year_limit_edg_modification: overlay
                .year_limit_edg_modification
                .unwrap_or(self.year_limit_edg_modification),
            postponement_delta: overlay.postponement_delta.unwrap_or(self.postponement_delta),
            current_academic_year: overlay.current_academic_year.or(self.current_academic_year),
            first_generated_node_id: overlay
                .first_generated_node_id
                .unwrap_or(self.first_generated_node_id),
            field_rules,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/progtree/progtree.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `PROGTREE_*` prefix (scalars only)
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply PROGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("PROGTREE")
                .separator("__")
                .list_separator(","),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<u32>("year_limit_edg_modification") {
            settings.year_limit_edg_modification = val;
        }
        if let Ok(val) = config.get::<u32>("postponement_delta") {
            settings.postponement_delta = val;
        }
        if let Ok(val) = config.get::<u32>("current_academic_year") {
            settings.current_academic_year = Some(val);
        }
        if let Ok(val) = config.get::<i64>("first_generated_node_id") {
            settings.first_generated_node_id = val;
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
        r#"# progtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/progtree/progtree.toml
#   Explicit: progtree --config <FILE>
#   Env:      PROGTREE_* environment variables (scalars only)

# Trees of years before this one cannot be edited
# year_limit_edg_modification = 2019

# Postponement copies trees up to current_academic_year + postponement_delta
# postponement_delta = 6

# Academic year used as "now" (default: from the clock, starting in September)
# current_academic_year = 2024

# First id given to nodes created by progtree
# first_generated_node_id = 1000000

# Initial values of generated nodes; a later rule for the same
# (node_type, field, is_version) replaces the earlier one.
# [[field_rules]]
# node_type = "COMMON_CORE"
# field = "title_fr"
# initial_value = "Tronc commun "
#
# [[field_rules]]
# node_type = "PGRM_MASTER_120"
# field = "credits"
# initial_value = "120"
# is_version = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rule(field: &str, initial_value: &str) -> FieldRuleConfig {
        FieldRuleConfig {
            node_type: "COMMON_CORE".to_string(),
            field: field.to_string(),
            initial_value: initial_value.to_string(),
            is_version: false,
        }
    }

    #[test]
    fn given_no_overlay_when_merging_then_keeps_defaults() {
        let settings = Settings::default().merge_with(&RawSettings::default());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_overlay_rules_when_merging_then_same_target_is_replaced() {
        // Arrange
        let base = Settings {
            field_rules: vec![rule("title_fr", "Tronc commun "), rule("credits", "60")],
            ..Settings::default()
        };
        let overlay = RawSettings {
            postponement_delta: Some(3),
            field_rules: Some(vec![rule("credits", "30"), rule("remark_fr", "-")]),
            ..RawSettings::default()
        };

        // Act
        let merged = base.merge_with(&overlay);

        // Assert
        assert_eq!(merged.postponement_delta, 3);
        assert_eq!(merged.year_limit_edg_modification, 2019);
        assert_eq!(
            merged.field_rules,
            vec![rule("title_fr", "Tronc commun "), rule("credits", "30"), rule("remark_fr", "-")]
        );
    }

    #[rstest]
    #[case(2024, 9, 2024)]
    #[case(2024, 12, 2024)]
    #[case(2025, 1, 2024)]
    #[case(2025, 8, 2024)]
    fn given_date_when_computing_academic_year_then_starts_in_september(
        #[case] year: i32,
        #[case] month: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(academic_year_of(year, month), expected);
    }

    #[test]
    fn given_fixed_academic_year_when_computing_max_postponement_then_adds_delta() {
        let settings = Settings {
            current_academic_year: Some(2020),
            postponement_delta: 6,
            ..Settings::default()
        };
        assert_eq!(settings.max_postponement_year(), 2026);
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.field_rules.is_none());
    }

    #[test]
    fn given_settings_when_serializing_then_toml_contains_fields() {
        let toml = Settings::default().to_toml().expect("serialize");
        assert!(toml.contains("year_limit_edg_modification = 2019"));
        assert!(toml.contains("postponement_delta = 6"));
    }
}
