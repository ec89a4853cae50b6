use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use valuehelp_config::ConfigError;
use valuehelp_schema::SchemaError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::Io { .. } => ConfigErrorKind::Io,
            ConfigError::Parse(_) => ConfigErrorKind::Parse,
            ConfigError::Invalid(_) => ConfigErrorKind::Invalid,
        };

        Self::new(ErrorKind::Config(kind), ErrorOrigin::Config, err.to_string())
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        let kind = match err {
            SchemaError::Decode(_) => SchemaErrorKind::Decode,
            SchemaError::Encode(_) => SchemaErrorKind::Encode,
        };

        Self::new(ErrorKind::Schema(kind), ErrorOrigin::Schema, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Schema(SchemaErrorKind),
}

///
/// ConfigErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ConfigErrorKind {
    /// Config file could not be read.
    Io,

    /// Not valid TOML, or unknown keys.
    Parse,

    /// Parsed, but names are unusable as definition keys.
    Invalid,
}

///
/// SchemaErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SchemaErrorKind {
    Decode,
    Encode,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Schema,
}

///
/// TESTS
///
