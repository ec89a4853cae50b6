mod annotation;
mod definition;
mod r#enum;
mod field;
mod query;

pub use annotation::*;
pub use definition::*;
pub use r#enum::*;
pub use field::*;
pub use query::*;

use crate::{error::SchemaError, types::json_is_truthy};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

///
/// Schema
///
/// The full set of definitions of a loaded model, keyed by qualified name.
/// Mutated once by enrichment, then shared read-only.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    #[serde(default)]
    pub definitions: BTreeMap<String, Definition>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(flatten)]
    pub other: BTreeMap<String, JsonValue>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(src).map_err(SchemaError::Decode)
    }

    pub fn from_json_value(value: JsonValue) -> Result<Self, SchemaError> {
        serde_json::from_value(value).map_err(SchemaError::Decode)
    }

    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(SchemaError::Encode)
    }

    pub fn to_json_value(&self) -> Result<JsonValue, SchemaError> {
        serde_json::to_value(self).map_err(SchemaError::Encode)
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, def: Definition) -> Self {
        self.definitions.insert(name.into(), def);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Definition> {
        self.definitions.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Insert only when nothing is registered under `name`.
    /// Returns whether the definition was inserted.
    pub fn insert_if_absent(&mut self, name: &str, def: Definition) -> bool {
        if self.contains(name) {
            return false;
        }
        self.definitions.insert(name.to_string(), def);

        true
    }

    /// Definitions of kind `entity`.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.definitions
            .iter()
            .filter(|(_, def)| def.is_entity())
            .map(|(name, def)| (name.as_str(), def))
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Definition> {
        self.get(name).filter(|def| def.is_entity())
    }

    #[must_use]
    pub fn field(&self, entity: &str, field: &str) -> Option<&Field> {
        self.get(entity)?.elements.get(field)
    }

    /// Enum of a field: inline first, then via its named type.
    #[must_use]
    pub fn enum_of<'a>(&'a self, field: &'a Field) -> Option<&'a EnumDef> {
        if let Some(def) = &field.enum_def {
            return Some(def);
        }

        let ty = field.ty.as_ref()?;
        self.get(ty.as_str()?)?.enum_def.as_ref()
    }

    /// Service owning a qualified name: the name minus its last segment,
    /// provided that prefix is itself defined as a service.
    #[must_use]
    pub fn owning_service<'a>(&self, name: &'a str) -> Option<&'a str> {
        let (parent, _) = name.rsplit_once('.')?;

        self.get(parent)
            .is_some_and(Definition::is_service)
            .then_some(parent)
    }
}

///
/// Meta
/// Free-form schema metadata; enrichment keeps its one-shot marker here.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Meta(BTreeMap<String, JsonValue>);

impl Meta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Any truthy value counts as set.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(json_is_truthy)
    }

    pub fn set_flag(&mut self, key: &str) {
        self.0.insert(key.to_string(), JsonValue::Bool(true));
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Literal;
    use serde_json::json;

    fn bookshop() -> Schema {
        Schema::from_json_value(json!({
            "definitions": {
                "CatalogService": { "kind": "service" },
                "CatalogService.Books": {
                    "kind": "entity",
                    "@readonly": true,
                    "elements": {
                        "ID": { "key": true, "type": "cds.Integer" },
                        "genre": { "type": "Genre", "@enumValueHelp": true },
                        "format": {
                            "type": "cds.String",
                            "enum": { "hardcover": {}, "paperback": { "val": "PB" } },
                            "@enumValueHelpFixedValues": true,
                            "@UI.Hidden": false
                        }
                    }
                },
                "Genre": { "kind": "type", "type": "cds.String", "enum": { "Fiction": {}, "Drama": {} } },
                "lonely.Thing": { "kind": "entity", "elements": {} }
            },
            "$version": "2.0"
        }))
        .unwrap()
    }

    #[test]
    fn decodes_recognized_and_passthrough_annotations() {
        let schema = bookshop();
        let books = schema.get("CatalogService.Books").unwrap();
        let format = books.elements.get("format").unwrap();

        assert!(books.annotations.is_truthy(AnnotationKey::Readonly));
        assert!(format.wants_fixed_values());
        assert_eq!(format.annotations.other().get("@UI.Hidden"), Some(&json!(false)));
        assert_eq!(schema.other.get("$version"), Some(&json!("2.0")));
    }

    #[test]
    fn enum_of_prefers_inline_then_named_type() {
        let schema = bookshop();
        let format = schema.field("CatalogService.Books", "format").unwrap();
        let genre = schema.field("CatalogService.Books", "genre").unwrap();
        let id = schema.field("CatalogService.Books", "ID").unwrap();

        assert_eq!(
            schema.enum_of(format).unwrap().values(),
            vec![Literal::text("hardcover"), Literal::text("PB")]
        );
        assert_eq!(
            schema.enum_of(genre).unwrap().values(),
            vec![Literal::text("Fiction"), Literal::text("Drama")]
        );
        assert!(schema.enum_of(id).is_none());
    }

    #[test]
    fn type_of_reference_decodes_without_an_enum() {
        let schema = Schema::from_json_value(json!({
            "definitions": {
                "S.Orders": {
                    "kind": "entity",
                    "elements": {
                        "copy": { "type": { "ref": ["S.Orders", "status"] } }
                    }
                }
            }
        }))
        .unwrap();
        let copy = schema.field("S.Orders", "copy").unwrap();

        assert_eq!(
            copy.ty,
            Some(TypeRef::Other(json!({ "ref": ["S.Orders", "status"] })))
        );
        assert!(!copy.ty.as_ref().unwrap().is_builtin());
        assert!(schema.enum_of(copy).is_none());
        assert_eq!(
            schema.to_json_value().unwrap()["definitions"]["S.Orders"]["elements"]["copy"]["type"],
            json!({ "ref": ["S.Orders", "status"] })
        );
    }

    #[test]
    fn meta_flag_accepts_any_truthy_value() {
        let mut meta = Meta::default();
        assert!(!meta.flag("done"));

        for (value, expected) in [
            (json!(true), true),
            (json!(1), true),
            (json!("yes"), true),
            (json!({}), true),
            (json!(false), false),
            (json!(0), false),
            (json!(""), false),
            (json!(null), false),
        ] {
            meta.insert("done".to_string(), value.clone());
            assert_eq!(meta.flag("done"), expected, "{value}");
        }
    }

    #[test]
    fn entity_lookup_ignores_other_kinds() {
        let schema = bookshop();

        assert!(schema.entity("CatalogService.Books").is_some());
        assert!(schema.entity("CatalogService").is_none());
        assert!(schema.entity("Genre").is_none());
    }

    #[test]
    fn enum_order_survives_value_decoding() {
        let schema = Schema::from_json_value(json!({
            "definitions": {
                "Status": { "kind": "type", "enum": { "OPEN": {}, "CLOSED": {}, "ARCHIVED": {} } }
            }
        }))
        .unwrap();

        let symbols: Vec<&str> = schema
            .get("Status")
            .and_then(|def| def.enum_def.as_ref())
            .unwrap()
            .iter()
            .map(|(symbol, _)| symbol)
            .collect();

        assert_eq!(symbols, vec!["OPEN", "CLOSED", "ARCHIVED"]);
    }

    #[test]
    fn dangling_named_type_has_no_enum() {
        let schema = Schema::new();
        let field = Field::typed(TypeRef::new("does.not.Exist"));

        assert!(schema.enum_of(&field).is_none());
    }

    #[test]
    fn owning_service_requires_a_service_parent() {
        let schema = bookshop();

        assert_eq!(
            schema.owning_service("CatalogService.Books"),
            Some("CatalogService")
        );
        assert_eq!(schema.owning_service("lonely.Thing"), None);
        assert_eq!(schema.owning_service("Genre"), None);
    }

    #[test]
    fn json_roundtrip_is_stable() {
        let schema = bookshop();
        let first = schema.to_json_string().unwrap();
        let second = Schema::from_json_str(&first)
            .unwrap()
            .to_json_string()
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_kind_is_a_decode_error() {
        let err = Schema::from_json_value(json!({ "definitions": { "X": {} } })).unwrap_err();

        assert!(matches!(err, SchemaError::Decode(_)));
    }
}
