use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

///
/// Query
///
/// The backing query of a view-like entity. Only the set-operation shape is
/// typed; projections and selects pass through untouched.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Query {
    #[serde(default, rename = "SET", skip_serializing_if = "Option::is_none")]
    pub set: Option<SetQuery>,

    #[serde(flatten)]
    pub other: BTreeMap<String, JsonValue>,
}

impl Query {
    #[must_use]
    pub fn union(args: Vec<JsonValue>) -> Self {
        Self {
            set: Some(SetQuery {
                op: Some(SetOp::Union),
                other: BTreeMap::from([("args".to_string(), JsonValue::Array(args))]),
            }),
            other: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_union(&self) -> bool {
        self.set
            .as_ref()
            .is_some_and(|set| set.op == Some(SetOp::Union))
    }
}

///
/// SetQuery
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SetQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<SetOp>,

    #[serde(flatten)]
    pub other: BTreeMap<String, JsonValue>,
}

///
/// SetOp
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOp {
    Union,
    Intersect,
    Except,

    #[serde(untagged)]
    Other(String),
}
