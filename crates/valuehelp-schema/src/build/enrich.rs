use crate::node::{
    Annotation, AnnotationKey, Annotations, Definition, Field, FieldList, Schema, ValueList,
};
use std::collections::BTreeSet;
use tracing::debug;
use valuehelp_config::ValueHelpConfig;

///
/// EnrichReport
/// What a single enrichment call changed.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnrichReport {
    /// The schema already carried the enriched marker; nothing was touched.
    pub skipped: bool,

    /// The global value-list entity was synthesized by this call.
    pub created_value_list: bool,

    /// Eligible entities, in definition order.
    pub entities: Vec<String>,

    pub annotated_fields: Vec<AnnotatedField>,

    /// Services that received a new value-list projection.
    pub exposed_services: Vec<String>,
}

///
/// AnnotatedField
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnnotatedField {
    pub entity: String,
    pub field: String,
    pub fixed_values: bool,
    pub value_list_added: bool,
}

/// Enrich with the default configuration.
pub fn enrich(schema: &mut Schema) -> EnrichReport {
    Enricher::new(&ValueHelpConfig::default()).enrich(schema)
}

///
/// Enricher
///
/// Wires the generic value-list entity into a schema: synthesizes it,
/// annotates every marked field with a cross-reference to it, and exposes a
/// projection of it in every service owning a marked entity.
///
/// Runs at most once per schema; the marker in `Schema::meta` short-circuits
/// later calls. Malformed input is skipped, never reported.
///

pub struct Enricher<'a> {
    config: &'a ValueHelpConfig,
}

impl<'a> Enricher<'a> {
    #[must_use]
    pub const fn new(config: &'a ValueHelpConfig) -> Self {
        Self { config }
    }

    pub fn enrich(&self, schema: &mut Schema) -> EnrichReport {
        let meta_key = self.config.enrich.meta_key.as_str();
        if schema.meta.flag(meta_key) {
            debug!(meta_key, "schema already enriched, skipping");

            return EnrichReport {
                skipped: true,
                ..EnrichReport::default()
            };
        }

        debug!("enriching schema for enum value help");
        let mut report = EnrichReport::default();
        let view = self.config.value_list.entity.as_str();

        // an authored definition under the same name always wins
        report.created_value_list = schema.insert_if_absent(view, self.value_list_entity());
        if report.created_value_list {
            debug!(entity = view, "created value-list entity");
        }

        // Phase 1: collect eligible entities.
        let eligible: Vec<String> = schema
            .entities()
            .filter(|(_, def)| !def.is_autoexposed() && def.wants_enum_value_help())
            .map(|(name, _)| name.to_string())
            .collect();

        // Phase 2: annotate fields and remember owning services.
        let mut services = BTreeSet::new();
        for name in &eligible {
            debug!(entity = %name, "found entity with enum value help");

            if let Some(def) = schema.get_mut(name) {
                let fields = self.annotate_entity(name, def);
                report.annotated_fields.extend(fields);
            }
            if let Some(service) = schema.owning_service(name) {
                services.insert(service.to_string());
            }
        }
        report.entities = eligible;

        // Phase 3: expose a projection per owning service.
        for service in services {
            let projection = format!("{service}.{view}");
            if schema.insert_if_absent(&projection, self.projection()) {
                debug!(service = %service, projection = %projection, "auto-exposed value list");
                report.exposed_services.push(service);
            }
        }

        schema.meta.set_flag(meta_key);

        report
    }

    // Attach value-list annotations to every marked field of one entity.
    fn annotate_entity(&self, entity: &str, def: &mut Definition) -> Vec<AnnotatedField> {
        let view = self.config.value_list.entity.as_str();
        let mut annotated = Vec::new();

        for (name, field) in def.elements.iter_mut() {
            if !field.has_enum_value_help() {
                continue;
            }

            let fixed_values = field.wants_fixed_values()
                && !field
                    .annotations
                    .is_truthy(AnnotationKey::ValueListWithFixedValues);
            if fixed_values {
                field
                    .annotations
                    .set_flag(AnnotationKey::ValueListWithFixedValues, true);
            }

            let value_list_added = !field.annotations.is_truthy(AnnotationKey::ValueList);
            if value_list_added {
                field.annotations.insert(
                    AnnotationKey::ValueList,
                    Annotation::ValueList(ValueList::for_enum_field(view, entity, name)),
                );
            }

            annotated.push(AnnotatedField {
                entity: entity.to_string(),
                field: name.clone(),
                fixed_values,
                value_list_added,
            });
        }

        if self.config.enrich.mark_processed {
            def.annotations
                .set_flag(AnnotationKey::EnumValueHelpProcessed, true);
        }

        annotated
    }

    fn value_list_entity(&self) -> Definition {
        let annotations = Annotations::new()
            .with_flag(AnnotationKey::Readonly, true)
            .with_flag(AnnotationKey::PersistenceSkip, true);

        let mut def = Definition::entity(self.value_list_fields(true)).with_annotations(annotations);
        def.doc = Some(self.config.value_list.doc.clone());

        def
    }

    fn projection(&self) -> Definition {
        let annotations = Annotations::new()
            .with_flag(AnnotationKey::Autoexpose, true)
            .with_flag(AnnotationKey::Readonly, true);

        Definition::entity(self.value_list_fields(false)).with_annotations(annotations)
    }

    // value (key), entityName, fieldName
    fn value_list_fields(&self, computed_flag: bool) -> FieldList {
        let column = |annotations: Annotations| {
            let annotations = if computed_flag {
                annotations.with_flag(AnnotationKey::CoreComputed, false)
            } else {
                annotations
            };

            Field::string().with_annotations(annotations)
        };

        let value_annotations =
            Annotations::new().with_text(AnnotationKey::Title, self.config.value_list.title.clone());

        FieldList::new()
            .with("value", column(value_annotations).as_key())
            .with("entityName", column(Annotations::new()))
            .with("fieldName", column(Annotations::new()))
    }
}
