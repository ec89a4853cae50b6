//! TOML configuration for value-help enrichment.
//!
//! Every field is defaulted, so an empty document (or no document at all)
//! yields the stock behaviour.

use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Default name of the synthetic value-list entity.
pub const DEFAULT_VALUE_LIST_ENTITY: &str = "EnumValueHelpView";

/// Default schema meta key recording that enrichment already ran.
pub const DEFAULT_META_KEY: &str = "enum.value.help.enhanced";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// ValueHelpConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ValueHelpConfig {
    pub value_list: ValueListConfig,
    pub enrich: EnrichConfig,
}

impl ValueHelpConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(src)?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&src)
    }

    // names end up as schema definition keys, so they must stay single-segment
    fn validate(&self) -> Result<(), ConfigError> {
        let entity = &self.value_list.entity;
        if entity.is_empty() {
            return Err(ConfigError::Invalid("value_list.entity is empty".to_string()));
        }
        if entity.contains('.') {
            return Err(ConfigError::Invalid(format!(
                "value_list.entity '{entity}' must not contain '.'"
            )));
        }
        if self.enrich.meta_key.is_empty() {
            return Err(ConfigError::Invalid("enrich.meta_key is empty".to_string()));
        }

        Ok(())
    }
}

///
/// ValueListConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ValueListConfig {
    /// Name of the global entity; also the suffix of each service projection.
    pub entity: String,

    /// `@title` placed on the `value` column.
    pub title: String,

    pub doc: String,
}

impl Default for ValueListConfig {
    fn default() -> Self {
        Self {
            entity: DEFAULT_VALUE_LIST_ENTITY.to_string(),
            title: "Value".to_string(),
            doc: "Generic view that exposes enum values for any field annotated with @enumValueHelp"
                .to_string(),
        }
    }
}

///
/// EnrichConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichConfig {
    /// Stamp `@enumValueHelp.processed` on every eligible entity.
    pub mark_processed: bool,

    pub meta_key: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            mark_processed: true,
            meta_key: DEFAULT_META_KEY.to_string(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = ValueHelpConfig::from_toml_str("").unwrap();

        assert_eq!(cfg, ValueHelpConfig::default());
        assert_eq!(cfg.value_list.entity, DEFAULT_VALUE_LIST_ENTITY);
        assert!(cfg.enrich.mark_processed);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let cfg = ValueHelpConfig::from_toml_str(
            r#"
            [value_list]
            entity = "Picklist"

            [enrich]
            mark_processed = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.value_list.entity, "Picklist");
        assert_eq!(cfg.value_list.title, "Value");
        assert!(!cfg.enrich.mark_processed);
        assert_eq!(cfg.enrich.meta_key, DEFAULT_META_KEY);
    }

    #[test]
    fn qualified_entity_name_is_rejected() {
        let err = ValueHelpConfig::from_toml_str("[value_list]\nentity = \"a.B\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ValueHelpConfig::from_toml_str("[enrich]\nbogus = 1\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ValueHelpConfig::from_path("/definitely/not/here.toml").unwrap_err();

        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
