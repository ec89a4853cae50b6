//! Load-time schema transformation.

mod enrich;


pub use enrich::{AnnotatedField, EnrichReport, Enricher, enrich};
