use crate::filter::{Where, constant_in_where};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;
use valuehelp_schema::{node::Schema, types::Literal};

/// Column names of the value-list entity.
pub const VALUE: &str = "value";
pub const ENTITY_NAME: &str = "entityName";
pub const FIELD_NAME: &str = "fieldName";

///
/// ValueHelpRow
/// One row of a value-list result.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueHelpRow {
    pub value: Literal,
    pub entity_name: String,
    pub field_name: String,
}

///
/// ReadRequest
///
/// What the host hands to a read interceptor: the target entity, the parsed
/// filter (if any) and structured request parameters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReadRequest {
    pub target: String,
    pub filter: Option<Where>,
    pub data: BTreeMap<String, Literal>,
}

impl ReadRequest {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Where) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Truthy constant for `name`: from the filter first, else from the
    /// request parameters.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&Literal> {
        constant_in_where(self.filter.as_ref(), name)
            .filter(|lit| lit.is_truthy())
            .or_else(|| self.data.get(name))
            .filter(|lit| lit.is_truthy())
    }
}

///
/// Resolve the value-list rows a request asks for.
///
/// Returns `None` whenever the request cannot be answered: a missing
/// `entityName` / `fieldName`, an unknown entity or field, or a field with no
/// enum. Callers keep their default result in that case.
///
#[must_use]
pub fn resolve(schema: &Schema, request: &ReadRequest) -> Option<Vec<ValueHelpRow>> {
    let entity_name = request.constant(ENTITY_NAME)?.to_string();
    let field_name = request.constant(FIELD_NAME)?.to_string();

    let Some(field) = schema.field(&entity_name, &field_name) else {
        trace!(entity = %entity_name, field = %field_name, "no such field");
        return None;
    };
    let Some(enum_def) = schema.enum_of(field) else {
        trace!(entity = %entity_name, field = %field_name, "field has no enum");
        return None;
    };

    let mut rows: Vec<ValueHelpRow> = enum_def
        .values()
        .into_iter()
        .map(|value| ValueHelpRow {
            value,
            entity_name: entity_name.clone(),
            field_name: field_name.clone(),
        })
        .collect();

    let value_filter =
        constant_in_where(request.filter.as_ref(), VALUE).filter(|lit| lit.is_truthy());
    if let Some(wanted) = value_filter {
        rows.retain(|row| row.value.same_value(wanted));
    }

    Some(rows)
}

/// Replace `rows` in place with the resolved value list.
/// Leaves `rows` untouched and returns `false` when nothing resolves.
pub fn apply(schema: &Schema, rows: &mut Vec<ValueHelpRow>, request: &ReadRequest) -> bool {
    let Some(resolved) = resolve(schema, request) else {
        return false;
    };

    rows.clear();
    rows.extend(resolved);

    true
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use valuehelp_schema::node::{Definition, EnumDef, EnumEntry, Field, FieldList, TypeRef};

    fn schema() -> Schema {
        let status = EnumDef::new()
            .with("OPEN", EnumEntry::val("O"))
            .with("CLOSED", EnumEntry::val("C"));
        let tier = EnumDef::new()
            .with("gold", EnumEntry::bare())
            .with("silver", EnumEntry::bare());

        Schema::new()
            .with(
                "Order",
                Definition::entity(
                    FieldList::new()
                        .with("status", Field::string().with_enum(status))
                        .with("tier", Field::typed(TypeRef::new("Tier")))
                        .with("note", Field::string())
                        .with("broken", Field::typed(TypeRef::new("Nope"))),
                ),
            )
            .with("Tier", Definition::enum_type(TypeRef::string(), tier))
    }

    fn row(value: &str, field: &str) -> ValueHelpRow {
        ValueHelpRow {
            value: Literal::text(value),
            entity_name: "Order".to_string(),
            field_name: field.to_string(),
        }
    }

    fn order_status() -> Where {
        Where::eq(ENTITY_NAME, "Order") & Where::eq(FIELD_NAME, "status")
    }

    #[test]
    fn resolves_inline_enum_in_declared_order() {
        let req = ReadRequest::new("Sales.EnumValueHelpView").with_filter(order_status());

        assert_eq!(
            resolve(&schema(), &req),
            Some(vec![row("O", "status"), row("C", "status")])
        );
    }

    #[test]
    fn value_filter_narrows_to_one_row() {
        let req = ReadRequest::new("Sales.EnumValueHelpView")
            .with_filter(order_status() & Where::eq(VALUE, "C"));

        assert_eq!(resolve(&schema(), &req), Some(vec![row("C", "status")]));
    }

    #[test]
    fn value_filter_matches_numbers_by_value() {
        let schema = Schema::new().with(
            "Order",
            Definition::entity(FieldList::new().with(
                "level",
                Field::string().with_enum(
                    EnumDef::new()
                        .with("LOW", EnumEntry::val(1_i64))
                        .with("HIGH", EnumEntry::val(2_i64)),
                ),
            )),
        );
        let one_point_zero: Literal = serde_json::from_str("1.0").unwrap();
        let req = ReadRequest::new("v")
            .with_filter(Where::eq(VALUE, one_point_zero))
            .with_data(ENTITY_NAME, "Order")
            .with_data(FIELD_NAME, "level");

        let rows = resolve(&schema, &req).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, Literal::from(1_i64));
    }

    #[test]
    fn value_filter_without_match_yields_empty_list() {
        let req = ReadRequest::new("v").with_filter(order_status() & Where::eq(VALUE, "X"));

        assert_eq!(resolve(&schema(), &req), Some(vec![]));
    }

    #[test]
    fn empty_value_filter_is_ignored() {
        let req = ReadRequest::new("v").with_filter(order_status() & Where::eq(VALUE, ""));

        assert_eq!(resolve(&schema(), &req).map(|rows| rows.len()), Some(2));
    }

    #[test]
    fn named_type_enum_with_bare_keys() {
        let req = ReadRequest::new("v")
            .with_data(ENTITY_NAME, "Order")
            .with_data(FIELD_NAME, "tier");

        assert_eq!(
            resolve(&schema(), &req),
            Some(vec![row("gold", "tier"), row("silver", "tier")])
        );
    }

    #[test]
    fn parameters_fill_in_what_the_filter_lacks() {
        let req = ReadRequest::new("v")
            .with_filter(Where::eq(ENTITY_NAME, "Order"))
            .with_data(FIELD_NAME, "status");

        assert_eq!(resolve(&schema(), &req).map(|rows| rows.len()), Some(2));
    }

    #[test]
    fn falsy_filter_constant_falls_back_to_parameters() {
        let req = ReadRequest::new("v")
            .with_filter(Where::eq(ENTITY_NAME, "") & Where::eq(FIELD_NAME, "status"))
            .with_data(ENTITY_NAME, "Order");

        assert_eq!(resolve(&schema(), &req).map(|rows| rows.len()), Some(2));
    }

    #[test]
    fn unresolvable_requests_yield_none() {
        let s = schema();
        let cases = [
            ReadRequest::new("v"),
            ReadRequest::new("v").with_data(ENTITY_NAME, "Order"),
            ReadRequest::new("v")
                .with_data(ENTITY_NAME, "Nope")
                .with_data(FIELD_NAME, "status"),
            ReadRequest::new("v")
                .with_data(ENTITY_NAME, "Order")
                .with_data(FIELD_NAME, "nope"),
            ReadRequest::new("v")
                .with_data(ENTITY_NAME, "Order")
                .with_data(FIELD_NAME, "note"),
            ReadRequest::new("v")
                .with_data(ENTITY_NAME, "Order")
                .with_data(FIELD_NAME, "broken"),
        ];

        for req in &cases {
            assert_eq!(resolve(&s, req), None, "{req:?}");
        }
    }

    #[test]
    fn apply_replaces_or_leaves_buffer() {
        let s = schema();
        let stale = vec![row("stale", "x")];

        let mut rows = stale.clone();
        let unknown = ReadRequest::new("v")
            .with_data(ENTITY_NAME, "Unknown")
            .with_data(FIELD_NAME, "status");
        assert!(!apply(&s, &mut rows, &unknown));
        assert_eq!(rows, stale);

        let req = ReadRequest::new("v").with_filter(order_status());
        assert!(apply(&s, &mut rows, &req));
        assert_eq!(rows, vec![row("O", "status"), row("C", "status")]);
    }

    #[test]
    fn rows_serialize_with_camel_case_columns() {
        let json = serde_json::to_value(row("O", "status")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "value": "O", "entityName": "Order", "fieldName": "status" })
        );
    }
}
