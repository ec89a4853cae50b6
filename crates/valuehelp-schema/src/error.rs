use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("failed to decode schema: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode schema: {0}")]
    Encode(#[source] serde_json::Error),
}
