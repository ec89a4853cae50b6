use crate::node::{AnnotationKey, Annotations, EnumDef};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt, ops::Not};

/// Prefix shared by every builtin type name.
pub const BUILTIN_TYPE_PREFIX: &str = "cds.";

///
/// TypeRef
///
/// Reference to a builtin primitive (`cds.String`) or a named type
/// definition. Any other shape, such as a `{ "ref": [...] }` type-of
/// reference, is kept verbatim and never resolves to an enum.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypeRef {
    Named(String),
    Other(JsonValue),
}

impl TypeRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new("cds.String")
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.as_str()
            .is_some_and(|name| name.starts_with(BUILTIN_TYPE_PREFIX))
    }

    /// Type name, if this is a plain named reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

///
/// FieldList
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldList(BTreeMap<String, Field>);

impl FieldList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, field: Field) -> Self {
        self.0.insert(name.into(), field);
        self
    }

    /// Fields carrying either value-help marker, by name.
    pub fn enum_value_help_fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.0
            .iter()
            .filter(|(_, f)| f.has_enum_value_help())
            .map(|(name, f)| (name.as_str(), f))
    }
}

///
/// Field
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Not::not")]
    pub key: bool,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,

    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_def: Option<EnumDef>,

    #[serde(flatten)]
    pub annotations: Annotations,
}

impl Field {
    #[must_use]
    pub fn typed(ty: TypeRef) -> Self {
        Self {
            ty: Some(ty),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::typed(TypeRef::string())
    }

    #[must_use]
    pub fn as_key(mut self) -> Self {
        self.key = true;
        self
    }

    #[must_use]
    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.enum_def = Some(def);
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Presence of either marker counts, whatever its value.
    #[must_use]
    pub fn has_enum_value_help(&self) -> bool {
        self.annotations.contains(AnnotationKey::EnumValueHelp)
            || self.wants_fixed_values()
    }

    #[must_use]
    pub fn wants_fixed_values(&self) -> bool {
        self.annotations
            .contains(AnnotationKey::EnumValueHelpFixedValues)
    }
}
