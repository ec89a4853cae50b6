//! Schema graph for value-help enrichment: definitions, fields, enums and
//! annotations, plus the one-shot enrichment pass in `build`.

pub mod build;
pub mod error;
pub mod node;
pub mod types;

pub use error::SchemaError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{EnrichReport, Enricher, enrich},
        error::SchemaError,
        node::*,
        types::Literal,
    };
}
