use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::ops::{BitAnd, BitOr};
use valuehelp_schema::types::Literal;

///
/// Filter AST
///
/// Token-level representation of a request's `where` clause, as handed over
/// by the host query layer. It is a flat, infix token sequence with nested
/// groups, not a normalized predicate tree: there is no precedence and no
/// validation. The only consumer is equality-constant extraction.
///

///
/// Operator
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operator {
    Eq,
    And,
    Or,

    /// Any other bare word: `<>`, `not`, `in`, `like`, function names, ...
    Word(String),
}

impl Operator {
    #[must_use]
    pub fn from_word(word: &str) -> Self {
        match word {
            "=" => Self::Eq,
            "and" => Self::And,
            "or" => Self::Or,
            other => Self::Word(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::And => "and",
            Self::Or => "or",
            Self::Word(word) => word,
        }
    }
}

///
/// RefSegment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RefSegment {
    Name(String),

    /// Non-name segment such as `{ "id": .., "where": .. }`.
    Other(JsonValue),
}

impl RefSegment {
    fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(name) => Self::Name(name.clone()),
            other => Self::Other(other.clone()),
        }
    }
}

///
/// FieldRef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldRef {
    pub path: Vec<RefSegment>,
}

impl FieldRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            path: vec![RefSegment::Name(name.into())],
        }
    }

    /// Leading name segment; a reference only ever names its first segment.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        match self.path.first()? {
            RefSegment::Name(name) => Some(name),
            RefSegment::Other(_) => None,
        }
    }
}

///
/// Token
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Ref(FieldRef),
    Val(Literal),
    Op(Operator),

    /// Scalar appearing without a `val` wrapper.
    Bare(Literal),

    /// Parenthesized sub-sequence.
    Group(Vec<Self>),

    /// Any other object (`xpr`, `func`/`args`, sub-selects, ...), entries
    /// in document order.
    Node(Vec<(String, Self)>),
}

impl Token {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Ref(FieldRef::new(name))
    }

    #[must_use]
    pub fn val(value: impl Into<Literal>) -> Self {
        Self::Val(value.into())
    }

    #[must_use]
    pub const fn eq() -> Self {
        Self::Op(Operator::Eq)
    }

    #[must_use]
    pub const fn and() -> Self {
        Self::Op(Operator::And)
    }

    #[must_use]
    pub const fn or() -> Self {
        Self::Op(Operator::Or)
    }

    #[must_use]
    pub fn word(word: &str) -> Self {
        Self::Op(Operator::from_word(word))
    }

    /// Decode one CXN-style JSON element.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => Self::Group(items.iter().map(Self::from_json).collect()),
            JsonValue::String(word) => Self::word(word),
            JsonValue::Object(obj) => {
                if let Some(JsonValue::Array(path)) = obj.get("ref") {
                    return Self::Ref(FieldRef {
                        path: path.iter().map(RefSegment::from_json).collect(),
                    });
                }
                if let Some(lit) = obj.get("val").and_then(Literal::from_json) {
                    return Self::Val(lit);
                }

                Self::Node(
                    obj.iter()
                        .map(|(key, value)| (key.clone(), Self::from_json(value)))
                        .collect(),
                )
            }
            scalar => Self::Bare(Literal::from_json(scalar).unwrap_or(Literal::Null)),
        }
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(|value| Self::from_json(&value))
    }
}

///
/// Where
/// A complete filter: the top-level token sequence.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Where(Vec<Token>);

impl Where {
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    /// `field = value`
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self(vec![Token::field(field), Token::eq(), Token::val(value)])
    }

    /// Decode a JSON filter; anything but an array is not a filter.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match Token::from_json(value) {
            Token::Group(tokens) => Some(Self(tokens)),
            _ => None,
        }
    }

    pub fn from_json_str(src: &str) -> Result<Option<Self>, serde_json::Error> {
        let value: JsonValue = serde_json::from_str(src)?;

        Ok(Self::from_json(&value))
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Where {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;

        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("filter must be a JSON array"))
    }
}

// `a & b` appends flat: `a and b`
impl BitAnd for Where {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self::Output {
        if self.0.is_empty() {
            return rhs;
        }
        if !rhs.0.is_empty() {
            self.0.push(Token::and());
            self.0.extend(rhs.0);
        }

        self
    }
}

// `a | b` parenthesizes both sides: `(a) or (b)`
impl BitOr for Where {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(vec![Token::Group(self.0), Token::or(), Token::Group(rhs.0)])
    }
}
