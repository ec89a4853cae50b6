use crate::Error;
use serde_json::Value as JsonValue;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::debug;
use valuehelp_config::ValueHelpConfig;
use valuehelp_core::service::{Service, register_handlers};
use valuehelp_schema::{
    build::{EnrichReport, Enricher},
    node::Schema,
};

///
/// ValueHelpPlugin
///
/// Lifecycle entry point. The host calls `on_loaded` once the schema is
/// loaded (before services are built from it) and `on_served` once the
/// services are up.
///

#[derive(Debug, Default)]
pub struct ValueHelpPlugin {
    config: ValueHelpConfig,
    served: AtomicBool,
}

impl ValueHelpPlugin {
    #[must_use]
    pub const fn new(config: ValueHelpConfig) -> Self {
        Self {
            config,
            served: AtomicBool::new(false),
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self, Error> {
        Ok(Self::new(ValueHelpConfig::from_toml_str(src)?))
    }

    #[must_use]
    pub const fn config(&self) -> &ValueHelpConfig {
        &self.config
    }

    /// Name of the value-list entity as exposed inside each service.
    #[must_use]
    pub fn value_list(&self) -> &str {
        &self.config.value_list.entity
    }

    /// Decode a JSON schema document and run the loaded hook over it.
    pub fn load_schema(&self, src: &str) -> Result<Schema, Error> {
        let mut schema = Schema::from_json_str(src)?;
        self.on_loaded(&mut schema);

        Ok(schema)
    }

    pub fn load_schema_value(&self, value: JsonValue) -> Result<Schema, Error> {
        let mut schema = Schema::from_json_value(value)?;
        self.on_loaded(&mut schema);

        Ok(schema)
    }

    /// Loaded hook: enrich the schema in place.
    pub fn on_loaded(&self, schema: &mut Schema) -> EnrichReport {
        Enricher::new(&self.config).enrich(schema)
    }

    /// Served hook: register read handlers on every eligible service.
    /// Only the first call does anything.
    pub fn on_served(&self, schema: Arc<Schema>, services: &mut [Service]) -> Vec<String> {
        if self.served.swap(true, Ordering::AcqRel) {
            debug!("served hook already ran, ignoring");
            return Vec::new();
        }

        debug!(services = services.len(), "registering value-list handlers");
        register_handlers(&schema, services, self.value_list())
    }
}
