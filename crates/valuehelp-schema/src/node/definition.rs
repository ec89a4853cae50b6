use crate::node::{AnnotationKey, Annotations, EnumDef, FieldList, Query, TypeRef};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// DefinitionKind
///

#[derive(Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    #[display("action")]
    Action,
    #[display("aspect")]
    Aspect,
    #[display("context")]
    Context,
    #[display("entity")]
    Entity,
    #[display("event")]
    Event,
    #[display("function")]
    Function,
    #[display("service")]
    Service,
    #[display("type")]
    Type,

    #[serde(untagged)]
    #[display("{_0}")]
    Other(String),
}

///
/// Definition
///
/// A named node of the schema graph. Entities carry `elements`; types may
/// carry an inline `enum`; services carry neither.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Definition {
    pub kind: DefinitionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,

    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_def: Option<EnumDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,

    #[serde(default, skip_serializing_if = "FieldList::is_empty")]
    pub elements: FieldList,

    #[serde(flatten)]
    pub annotations: Annotations,
}

impl Definition {
    #[must_use]
    pub fn new(kind: DefinitionKind) -> Self {
        Self {
            kind,
            doc: None,
            ty: None,
            enum_def: None,
            query: None,
            elements: FieldList::new(),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn entity(elements: FieldList) -> Self {
        Self {
            elements,
            ..Self::new(DefinitionKind::Entity)
        }
    }

    #[must_use]
    pub fn service() -> Self {
        Self::new(DefinitionKind::Service)
    }

    #[must_use]
    pub fn enum_type(ty: TypeRef, def: EnumDef) -> Self {
        Self {
            ty: Some(ty),
            enum_def: Some(def),
            ..Self::new(DefinitionKind::Type)
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn is_entity(&self) -> bool {
        self.kind == DefinitionKind::Entity
    }

    #[must_use]
    pub fn is_service(&self) -> bool {
        self.kind == DefinitionKind::Service
    }

    /// Projection derived by the framework rather than authored.
    #[must_use]
    pub fn is_autoexposed(&self) -> bool {
        self.annotations.is_truthy(AnnotationKey::Autoexposed)
    }

    #[must_use]
    pub fn is_union(&self) -> bool {
        self.query.as_ref().is_some_and(Query::is_union)
    }

    /// Entity-level marker (truthy) or any marked field, never for unions.
    #[must_use]
    pub fn wants_enum_value_help(&self) -> bool {
        if self.is_union() {
            return false;
        }

        self.annotations.is_truthy(AnnotationKey::EnumValueHelp)
            || self
                .annotations
                .is_truthy(AnnotationKey::EnumValueHelpFixedValues)
            || self.elements.values().any(|f| f.has_enum_value_help())
    }
}
