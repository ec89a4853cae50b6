//! Host seam: bootstrapped services and read interception.
//!
//! A `Service` is the minimal view of a served service this crate needs: its
//! name, whether it is an application service, which entities it exposes,
//! and the after-read handlers registered against those entities.

use crate::resolve::{ReadRequest, ValueHelpRow, apply};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};
use tracing::debug;
use valuehelp_schema::node::Schema;

///
/// AfterRead
///
/// Post-processing hook for reads. Receives the in-progress result buffer
/// and must leave it holding the rows to return.
///

pub trait AfterRead: Send + Sync {
    fn after_read(&self, rows: &mut Vec<ValueHelpRow>, request: &ReadRequest);
}

impl<F> AfterRead for F
where
    F: Fn(&mut Vec<ValueHelpRow>, &ReadRequest) + Send + Sync,
{
    fn after_read(&self, rows: &mut Vec<ValueHelpRow>, request: &ReadRequest) {
        self(rows, request);
    }
}

///
/// ServiceKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServiceKind {
    Application,
    Other,
}

///
/// Service
///

pub struct Service {
    name: String,
    kind: ServiceKind,
    entities: BTreeSet<String>,
    handlers: BTreeMap<String, Vec<Arc<dyn AfterRead>>>,
}

impl Service {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ServiceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            entities: BTreeSet::new(),
            handlers: BTreeMap::new(),
        }
    }

    /// Build a service exposing every entity defined directly below `name`.
    #[must_use]
    pub fn from_schema(schema: &Schema, name: &str, kind: ServiceKind) -> Self {
        let prefix = format!("{name}.");
        let entities = schema
            .entities()
            .filter_map(|(qualified, _)| qualified.strip_prefix(&prefix))
            .filter(|short| !short.contains('.'))
            .map(str::to_string)
            .collect();

        Self {
            entities,
            ..Self::new(name, kind)
        }
    }

    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.insert(entity.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    #[must_use]
    pub fn exposes(&self, entity: &str) -> bool {
        self.entities.contains(entity)
    }

    #[must_use]
    pub fn qualified(&self, entity: &str) -> String {
        format!("{}.{entity}", self.name)
    }

    pub fn after_read(&mut self, entity: &str, handler: Arc<dyn AfterRead>) {
        self.handlers
            .entry(entity.to_string())
            .or_default()
            .push(handler);
    }

    #[must_use]
    pub fn handler_count(&self, entity: &str) -> usize {
        self.handlers.get(entity).map_or(0, Vec::len)
    }

    /// Run every after-read handler of `entity`, in registration order,
    /// over the default result `rows`.
    pub fn dispatch_read(&self, entity: &str, rows: &mut Vec<ValueHelpRow>, request: &ReadRequest) {
        let Some(handlers) = self.handlers.get(entity) else {
            return;
        };
        for handler in handlers {
            handler.after_read(rows, request);
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: BTreeMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(entity, list)| (entity.as_str(), list.len()))
            .collect();

        f.debug_struct("Service")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("entities", &self.entities)
            .field("handlers", &handlers)
            .finish()
    }
}

///
/// ValueHelpHandler
/// After-read handler answering value-list reads from schema enums.
///

#[derive(Clone, Debug)]
pub struct ValueHelpHandler {
    schema: Arc<Schema>,
}

impl ValueHelpHandler {
    #[must_use]
    pub const fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl AfterRead for ValueHelpHandler {
    fn after_read(&self, rows: &mut Vec<ValueHelpRow>, request: &ReadRequest) {
        debug!(target = %request.target, "value-list after-handler reached");

        if apply(&self.schema, rows, request) {
            debug!(target = %request.target, rows = rows.len(), "value-list rows replaced");
        }
    }
}

/// Attach a `ValueHelpHandler` to every application service exposing the
/// value-list entity. Returns the names of the services that got one.
pub fn register_handlers(
    schema: &Arc<Schema>,
    services: &mut [Service],
    value_list: &str,
) -> Vec<String> {
    let mut registered = Vec::new();

    for service in services.iter_mut() {
        if service.kind != ServiceKind::Application || !service.exposes(value_list) {
            continue;
        }

        debug!(
            service = %service.name,
            entity = %service.qualified(value_list),
            "adding value-list read handler"
        );
        service.after_read(value_list, Arc::new(ValueHelpHandler::new(Arc::clone(schema))));
        registered.push(service.name.clone());
    }

    registered
}

///
/// TESTS
///
