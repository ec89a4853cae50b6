use crate::types::json_is_truthy;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt};

///
/// AnnotationKey
///
/// The annotation keys value-help enrichment reads or writes. Anything else
/// found on a definition or field is carried through untouched.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum AnnotationKey {
    Autoexpose,
    Autoexposed,
    CoreComputed,
    EnumValueHelp,
    EnumValueHelpFixedValues,
    EnumValueHelpProcessed,
    PersistenceSkip,
    Readonly,
    Title,
    ValueList,
    ValueListWithFixedValues,
}

impl AnnotationKey {
    pub const ALL: [Self; 11] = [
        Self::Autoexpose,
        Self::Autoexposed,
        Self::CoreComputed,
        Self::EnumValueHelp,
        Self::EnumValueHelpFixedValues,
        Self::EnumValueHelpProcessed,
        Self::PersistenceSkip,
        Self::Readonly,
        Self::Title,
        Self::ValueList,
        Self::ValueListWithFixedValues,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autoexpose => "@cds.autoexpose",
            Self::Autoexposed => "@cds.autoexposed",
            Self::CoreComputed => "@Core.Computed",
            Self::EnumValueHelp => "@enumValueHelp",
            Self::EnumValueHelpFixedValues => "@enumValueHelpFixedValues",
            Self::EnumValueHelpProcessed => "@enumValueHelp.processed",
            Self::PersistenceSkip => "@cds.persistence.skip",
            Self::Readonly => "@readonly",
            Self::Title => "@title",
            Self::ValueList => "@Common.ValueList",
            Self::ValueListWithFixedValues => "@Common.ValueListWithFixedValues",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Annotation
/// Typed payload of a recognized annotation.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Annotation {
    Flag(bool),
    Text(String),
    ValueList(ValueList),

    /// Anything that does not fit the typed shapes, kept verbatim.
    Value(JsonValue),
}

impl Annotation {
    fn decode(key: AnnotationKey, value: JsonValue) -> Self {
        match (key, value) {
            // typed only when that loses nothing; otherwise kept verbatim
            (AnnotationKey::ValueList, value @ JsonValue::Object(_)) => {
                match serde_json::from_value::<ValueList>(value.clone()) {
                    Ok(list) if serde_json::to_value(&list).is_ok_and(|out| out == value) => {
                        Self::ValueList(list)
                    }
                    _ => Self::Value(value),
                }
            }
            (_, JsonValue::Bool(b)) => Self::Flag(b),
            (_, JsonValue::String(s)) => Self::Text(s),
            (_, value) => Self::Value(value),
        }
    }

    fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        match self {
            Self::Flag(b) => Ok(JsonValue::Bool(*b)),
            Self::Text(s) => Ok(JsonValue::String(s.clone())),
            Self::ValueList(list) => serde_json::to_value(list),
            Self::Value(v) => Ok(v.clone()),
        }
    }

    /// Truthiness of the raw annotation value.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => !s.is_empty(),
            Self::ValueList(_) => true,
            Self::Value(v) => json_is_truthy(v),
        }
    }
}

///
/// Annotations
///
/// Recognized annotations keyed by `AnnotationKey`, plus a pass-through bag
/// for every other key on the node. Serialized flattened into the owning
/// definition or field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Annotations {
    known: BTreeMap<AnnotationKey, Annotation>,
    other: BTreeMap<String, JsonValue>,
}

impl Annotations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: AnnotationKey) -> Option<&Annotation> {
        self.known.get(&key)
    }

    /// Whether the key is present at all, whatever its value.
    #[must_use]
    pub fn contains(&self, key: AnnotationKey) -> bool {
        self.known.contains_key(&key)
    }

    #[must_use]
    pub fn is_truthy(&self, key: AnnotationKey) -> bool {
        self.get(key).is_some_and(Annotation::is_truthy)
    }

    #[must_use]
    pub fn value_list(&self) -> Option<&ValueList> {
        match self.get(AnnotationKey::ValueList) {
            Some(Annotation::ValueList(list)) => Some(list),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: AnnotationKey, annotation: Annotation) -> Option<Annotation> {
        self.known.insert(key, annotation)
    }

    pub fn set_flag(&mut self, key: AnnotationKey, flag: bool) {
        self.known.insert(key, Annotation::Flag(flag));
    }

    #[must_use]
    pub fn with_flag(mut self, key: AnnotationKey, flag: bool) -> Self {
        self.set_flag(key, flag);
        self
    }

    #[must_use]
    pub fn with_text(mut self, key: AnnotationKey, text: impl Into<String>) -> Self {
        self.known.insert(key, Annotation::Text(text.into()));
        self
    }

    /// Unrecognized keys, verbatim.
    #[must_use]
    pub const fn other(&self) -> &BTreeMap<String, JsonValue> {
        &self.other
    }

    pub fn insert_other(&mut self, key: impl Into<String>, value: JsonValue) {
        let key = key.into();
        match AnnotationKey::from_key(&key) {
            Some(known) => {
                self.known.insert(known, Annotation::decode(known, value));
            }
            None => {
                self.other.insert(key, value);
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.other.is_empty()
    }
}

impl Serialize for Annotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.known.len() + self.other.len()))?;
        for (key, annotation) in &self.known {
            let value = annotation.to_json().map_err(serde::ser::Error::custom)?;
            map.serialize_entry(key.as_str(), &value)?;
        }
        for (key, value) in &self.other {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Annotations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AnnotationsVisitor)
    }
}

struct AnnotationsVisitor;

impl<'de> Visitor<'de> for AnnotationsVisitor {
    type Value = Annotations;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of annotations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Annotations, A::Error> {
        let mut annotations = Annotations::new();
        while let Some((key, value)) = access.next_entry::<String, JsonValue>()? {
            annotations.insert_other(key, value);
        }

        Ok(annotations)
    }
}

///
/// ValueList
/// Cross-reference descriptor linking a field to a value-list collection.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ValueList {
    #[serde(rename = "CollectionPath")]
    pub collection_path: String,

    #[serde(rename = "Parameters", default)]
    pub parameters: Vec<ValueListParameter>,

    #[serde(flatten)]
    pub other: BTreeMap<String, JsonValue>,
}

impl ValueList {
    /// Descriptor binding `field` of `entity` to the generic value list.
    #[must_use]
    pub fn for_enum_field(collection_path: &str, entity: &str, field: &str) -> Self {
        Self {
            collection_path: collection_path.to_string(),
            parameters: vec![
                ValueListParameter::InOut {
                    local_data_property: field.to_string(),
                    value_list_property: "value".to_string(),
                },
                ValueListParameter::Constant {
                    value_list_property: "entityName".to_string(),
                    constant: entity.to_string(),
                },
                ValueListParameter::Constant {
                    value_list_property: "fieldName".to_string(),
                    constant: field.to_string(),
                },
            ],
            other: BTreeMap::new(),
        }
    }

    /// Constant bound to `property`, if any.
    #[must_use]
    pub fn constant(&self, property: &str) -> Option<&str> {
        self.parameters.iter().find_map(|p| match p {
            ValueListParameter::Constant {
                value_list_property,
                constant,
            } if value_list_property == property => Some(constant.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn in_out(&self) -> Option<(&str, &str)> {
        self.parameters.iter().find_map(|p| match p {
            ValueListParameter::InOut {
                local_data_property,
                value_list_property,
            } => Some((local_data_property.as_str(), value_list_property.as_str())),
            _ => None,
        })
    }
}

///
/// ValueListParameter
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "$Type")]
pub enum ValueListParameter {
    #[serde(rename = "Common.ValueListParameterInOut")]
    InOut {
        #[serde(rename = "LocalDataProperty")]
        local_data_property: String,
        #[serde(rename = "ValueListProperty")]
        value_list_property: String,
    },

    #[serde(rename = "Common.ValueListParameterIn")]
    In {
        #[serde(rename = "LocalDataProperty")]
        local_data_property: String,
        #[serde(rename = "ValueListProperty")]
        value_list_property: String,
    },

    #[serde(rename = "Common.ValueListParameterOut")]
    Out {
        #[serde(rename = "LocalDataProperty")]
        local_data_property: String,
        #[serde(rename = "ValueListProperty")]
        value_list_property: String,
    },

    #[serde(rename = "Common.ValueListParameterDisplayOnly")]
    DisplayOnly {
        #[serde(rename = "ValueListProperty")]
        value_list_property: String,
    },

    #[serde(rename = "Common.ValueListParameterConstant")]
    Constant {
        #[serde(rename = "ValueListProperty")]
        value_list_property: String,
        #[serde(rename = "Constant")]
        constant: String,
    },
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build::enrich, node::Schema};
    use serde_json::json;

    fn authored_descriptor() -> JsonValue {
        json!({
            "CollectionPath": "StatusCodes",
            "Parameters": [
                {
                    "$Type": "Common.ValueListParameterInOut",
                    "LocalDataProperty": "status",
                    "ValueListProperty": "code",
                    "![@UI.Importance]": "High"
                }
            ]
        })
    }

    #[test]
    fn plain_descriptor_is_typed() {
        let mut annotations = Annotations::new();
        annotations.insert_other(
            "@Common.ValueList",
            serde_json::to_value(ValueList::for_enum_field("View", "E", "f")).unwrap(),
        );

        let list = annotations.value_list().unwrap();
        assert_eq!(list.in_out(), Some(("f", "value")));
        assert_eq!(list.constant("entityName"), Some("E"));
    }

    #[test]
    fn descriptor_with_extra_parameter_keys_is_kept_verbatim() {
        let mut annotations = Annotations::new();
        annotations.insert_other("@Common.ValueList", authored_descriptor());

        assert_eq!(
            annotations.get(AnnotationKey::ValueList),
            Some(&Annotation::Value(authored_descriptor()))
        );
        assert!(annotations.is_truthy(AnnotationKey::ValueList));
        assert!(annotations.value_list().is_none());
    }

    #[test]
    fn authored_descriptor_survives_enrich_and_save() {
        let mut schema = Schema::from_json_value(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.Orders": {
                    "kind": "entity",
                    "elements": {
                        "status": {
                            "type": "cds.String",
                            "@enumValueHelp": true,
                            "@Common.ValueList": authored_descriptor()
                        }
                    }
                }
            }
        }))
        .unwrap();

        enrich(&mut schema);
        let saved = schema.to_json_value().unwrap();

        assert_eq!(
            saved["definitions"]["S.Orders"]["elements"]["status"]["@Common.ValueList"],
            authored_descriptor()
        );
    }

    #[test]
    fn raw_values_use_js_truthiness() {
        assert!(!Annotation::Value(json!(0)).is_truthy());
        assert!(!Annotation::Value(json!(null)).is_truthy());
        assert!(Annotation::Value(json!([])).is_truthy());
        assert!(Annotation::Value(json!("x")).is_truthy());
    }
}
