//! Schema compiler.
//!
//! One pass over a record's declared fields turns their directives into a
//! [`SchemaPlan`]. Nested record types are not compiled here; the executor
//! asks the cache for them when it reaches a value, so self-referential
//! types compile fine.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::directive::{Check, Separator};
use crate::error::CompileError;
use crate::record::{Field, PresenceMarker, Record};
use crate::registry::{Predicate, Registry};
use crate::value::Kind;

/// A parsed check paired with its predicate.
#[derive(Clone)]
pub struct CompiledCheck {
    pub check: Check,
    pub predicate: Predicate,
}

impl fmt::Debug for CompiledCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCheck")
            .field("check", &self.check)
            .finish_non_exhaustive()
    }
}

/// Direct checks of one field.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub field: Arc<Field>,
    pub checks: Vec<CompiledCheck>,
    pub presence_slot: Option<usize>,
}

/// Per-element checks of a collection of scalars.
#[derive(Debug, Clone)]
pub struct ScalarCollectionPlan {
    pub field: Arc<Field>,
    pub element: Arc<Field>,
    pub checks: Vec<CompiledCheck>,
    pub presence_slot: Option<usize>,
}

/// Presence marker holder and the slot assigned to each tracked field.
#[derive(Debug, Clone)]
pub struct PresencePlan {
    pub holder: Arc<Field>,
    pub slots: BTreeMap<String, usize>,
}

impl PresencePlan {
    /// Supplied flags indexed by slot, read from the holder's marker.
    pub fn supplied(&self, marker: &PresenceMarker) -> Vec<bool> {
        let mut supplied = vec![false; self.slots.len()];
        for (name, &slot) in &self.slots {
            if let Some(flag) = supplied.get_mut(slot) {
                *flag = marker.is_marked(name);
            }
        }
        supplied
    }
}

/// Compiled, immutable validation plan of one record type.
#[derive(Debug, Clone)]
pub struct SchemaPlan {
    pub record_type: TypeId,
    pub name: String,
    pub fields: Vec<FieldPlan>,
    pub records: Vec<Arc<Field>>,
    pub collections: Vec<Arc<Field>>,
    pub scalars: Vec<ScalarCollectionPlan>,
    pub presence: Option<PresencePlan>,
    index: HashMap<String, usize>,
}

impl SchemaPlan {
    /// Declaration index of a field by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn check_count(&self) -> usize {
        self.fields.iter().map(|plan| plan.checks.len()).sum::<usize>()
            + self.scalars.iter().map(|plan| plan.checks.len()).sum::<usize>()
    }
}

pub struct Compiler<'r> {
    registry: &'r Registry,
    separator: Separator,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r Registry, separator: Separator) -> Self {
        Self {
            registry,
            separator,
        }
    }

    pub fn compile(&self, record: &dyn Record) -> Result<SchemaPlan, CompileError> {
        let schema = record.schema();
        let fields: Vec<Arc<Field>> = schema
            .fields
            .iter()
            .enumerate()
            .map(|(index, spec)| Arc::new(Field::from_spec(&schema.name, index, spec, self.separator)))
            .collect();

        let holder = find_holder(&schema.name, &fields)?;

        let mut plan = SchemaPlan {
            record_type: record.record_type(),
            name: schema.name.clone(),
            fields: Vec::new(),
            records: Vec::new(),
            collections: Vec::new(),
            scalars: Vec::new(),
            presence: None,
            index: fields
                .iter()
                .map(|field| (field.name.clone(), field.index))
                .collect(),
        };
        let mut slots = BTreeMap::new();

        for field in &fields {
            if matches!(field.kind(), Kind::Marker) {
                continue;
            }

            let presence_slot = if field.tag.presence && holder.is_some() {
                let slot = slots.len();
                slots.insert(field.name.clone(), slot);
                Some(slot)
            } else {
                None
            };

            match field.kind() {
                Kind::Record => {
                    plan.records.push(field.clone());
                    self.push_field_plan(&mut plan, field, presence_slot)?;
                }
                Kind::List(element) if element.is_record() => {
                    plan.collections.push(field.clone());
                    self.push_field_plan(&mut plan, field, presence_slot)?;
                }
                Kind::List(_) => {
                    if field.tag.checks.is_empty() {
                        continue;
                    }
                    let element = Arc::new(field.element());
                    let checks = self.compile_checks(&schema.name, &element)?;
                    plan.scalars.push(ScalarCollectionPlan {
                        field: field.clone(),
                        element,
                        checks,
                        presence_slot,
                    });
                }
                _ => self.push_field_plan(&mut plan, field, presence_slot)?,
            }
        }

        if let Some(holder) = holder
            && !slots.is_empty()
        {
            plan.presence = Some(PresencePlan { holder, slots });
        }

        debug!(
            record = %plan.name,
            fields = plan.fields.len(),
            records = plan.records.len(),
            collections = plan.collections.len(),
            scalars = plan.scalars.len(),
            checks = plan.check_count(),
            presence_slots = plan.presence.as_ref().map(|p| p.slots.len()).unwrap_or(0),
            "compiled schema plan"
        );

        Ok(plan)
    }

    fn push_field_plan(
        &self,
        plan: &mut SchemaPlan,
        field: &Arc<Field>,
        presence_slot: Option<usize>,
    ) -> Result<(), CompileError> {
        if field.tag.checks.is_empty() {
            return Ok(());
        }
        let checks = self.compile_checks(&plan.name, field)?;
        plan.fields.push(FieldPlan {
            field: field.clone(),
            checks,
            presence_slot,
        });
        Ok(())
    }

    fn compile_checks(&self, record: &str, field: &Field) -> Result<Vec<CompiledCheck>, CompileError> {
        let mut compiled = Vec::with_capacity(field.tag.checks.len());
        for check in &field.tag.checks {
            let factory =
                self.registry
                    .resolve(&check.name)
                    .ok_or_else(|| CompileError::UnknownCheck {
                        record: record.to_string(),
                        field: field.name.clone(),
                        check: check.name.clone(),
                    })?;
            let predicate = factory(field, check)?;
            compiled.push(CompiledCheck {
                check: check.clone(),
                predicate,
            });
        }
        Ok(compiled)
    }
}

fn find_holder(record: &str, fields: &[Arc<Field>]) -> Result<Option<Arc<Field>>, CompileError> {
    let mut holder: Option<Arc<Field>> = None;
    for field in fields {
        match field.kind() {
            Kind::Marker => {
                if let Some(existing) = &holder {
                    return Err(CompileError::Marker {
                        record: record.to_string(),
                        field: field.name.clone(),
                        reason: format!("record already declares marker holder '{}'", existing.name),
                    });
                }
                holder = Some(field.clone());
            }
            Kind::List(element) if matches!(**element, Kind::Marker) => {
                return Err(CompileError::Marker {
                    record: record.to_string(),
                    field: field.name.clone(),
                    reason: "a collection of markers cannot track presence".to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(holder)
}
