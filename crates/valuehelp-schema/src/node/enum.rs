use crate::types::Literal;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

///
/// EnumDef
///
/// Symbolic key → entry mapping. Declared order is significant: value lists
/// are materialized in it, so entries live in a `Vec` rather than a map.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnumDef {
    entries: Vec<(String, EnumEntry)>,
}

impl EnumDef {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an entry, replacing a same-named one in place.
    pub fn insert(&mut self, symbol: impl Into<String>, entry: EnumEntry) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((symbol, entry)),
        }
    }

    #[must_use]
    pub fn with(mut self, symbol: impl Into<String>, entry: EnumEntry) -> Self {
        self.insert(symbol, entry);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnumEntry)> {
        self.entries.iter().map(|(s, e)| (s.as_str(), e))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Literal value of every entry, in declared order.
    #[must_use]
    pub fn values(&self) -> Vec<Literal> {
        self.iter().map(|(symbol, entry)| entry.value(symbol)).collect()
    }
}

///
/// EnumEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnumEntry {
    /// Non-object entry; the symbol is its own value.
    Bare(JsonValue),

    /// Object entry, optionally carrying an explicit `val`.
    Described {
        val: Option<Literal>,
        other: Map<String, JsonValue>,
    },
}

impl EnumEntry {
    #[must_use]
    pub fn bare() -> Self {
        Self::Bare(JsonValue::Bool(true))
    }

    #[must_use]
    pub fn val(val: impl Into<Literal>) -> Self {
        Self::Described {
            val: Some(val.into()),
            other: Map::new(),
        }
    }

    /// Value of this entry: its explicit `val`, else the symbol.
    #[must_use]
    pub fn value(&self, symbol: &str) -> Literal {
        match self {
            Self::Described { val: Some(val), .. } => val.clone(),
            _ => Literal::text(symbol),
        }
    }

    fn from_json(value: JsonValue) -> Self {
        let JsonValue::Object(mut obj) = value else {
            return Self::Bare(value);
        };

        // a `val` that is null or not a scalar falls back to the symbol
        let val = match obj.get("val") {
            Some(JsonValue::Null) | None => None,
            Some(raw) => Literal::from_json(raw),
        };
        if val.is_some() {
            obj.remove("val");
        }

        Self::Described { val, other: obj }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            Self::Bare(v) => v.clone(),
            Self::Described { val, other } => {
                let mut obj = other.clone();
                if let Some(val) = val {
                    obj.insert("val".to_string(), val.to_json());
                }

                JsonValue::Object(obj)
            }
        }
    }
}

impl Serialize for EnumDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, entry) in &self.entries {
            map.serialize_entry(symbol, &entry.to_json())?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for EnumDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnumDefVisitor)
    }
}

struct EnumDefVisitor;

impl<'de> Visitor<'de> for EnumDefVisitor {
    type Value = EnumDef;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an enum definition map")
    }

    // MapAccess yields entries in document order, which is the declared order
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EnumDef, A::Error> {
        let mut def = EnumDef::new();
        while let Some((symbol, value)) = access.next_entry::<String, JsonValue>()? {
            def.insert(symbol, EnumEntry::from_json(value));
        }

        Ok(def)
    }
}

///
/// TESTS
///
