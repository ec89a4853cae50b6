//! ## Crate layout
//! - `config`: TOML configuration for entity names and enrichment toggles.
//! - `schema`: schema graph, JSON load/save and the enrichment pass.
//! - `core`: filter trees, constant extraction, value resolution and the
//!   service read seam.
//!
//! `ValueHelpPlugin` ties them together for a host's loaded/served lifecycle.

pub use valuehelp_config as config;
pub use valuehelp_core as core;
pub use valuehelp_schema as schema;

mod error;
mod plugin;

pub use error::{ConfigErrorKind, Error, ErrorKind, ErrorOrigin, SchemaErrorKind};
pub use plugin::ValueHelpPlugin;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ValueHelpPlugin,
        config::ValueHelpConfig,
        core::{
            filter::Where,
            resolve::{ReadRequest, ValueHelpRow},
            service::{AfterRead, Service, ServiceKind},
        },
        schema::{build::EnrichReport, node::Schema, types::Literal},
    };
}
