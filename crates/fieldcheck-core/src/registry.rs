//! Check registry.
//!
//! Maps case-insensitive check names to [`CheckFactory`]s. Registration is
//! setup work done once per process; lookups happen concurrently afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::directive::Check;
use crate::error::{CompileError, ExecutionError};
use crate::record::Field;
use crate::session::Session;
use crate::value::Value;

/// Executable form of a check: `Ok(false)` is a violation, `Err` aborts the call.
pub type Predicate =
    Arc<dyn Fn(&Session<'_>, &Value<'_>) -> Result<bool, ExecutionError> + Send + Sync>;

/// Turns a field descriptor and a parsed check into a predicate, or rejects
/// the field's kind.
pub type CheckFactory = Arc<dyn Fn(&Field, &Check) -> Result<Predicate, CompileError> + Send + Sync>;

pub fn predicate<F>(check: F) -> Predicate
where
    F: Fn(&Session<'_>, &Value<'_>) -> Result<bool, ExecutionError> + Send + Sync + 'static,
{
    Arc::new(check)
}

pub fn factory<F>(build: F) -> CheckFactory
where
    F: Fn(&Field, &Check) -> Result<Predicate, CompileError> + Send + Sync + 'static,
{
    Arc::new(build)
}

#[derive(Default)]
struct RegistryState {
    factories: HashMap<String, CheckFactory>,
    aliases: HashMap<String, Vec<String>>,
}

#[derive(Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, factory: CheckFactory) {
        let key = name.to_ascii_lowercase();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.factories.insert(key, factory);
        debug!(check = name, "registered check factory");
    }

    /// Registers `name` as an alias resolving to each of `targets`, tried in order.
    pub fn register_alias<I, S>(&self, name: &str, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets: Vec<String> = targets
            .into_iter()
            .map(|target| target.as_ref().to_ascii_lowercase())
            .collect();
        debug!(alias = name, targets = ?targets, "registered check alias");
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.aliases.insert(name.to_ascii_lowercase(), targets);
    }

    /// Direct registration only; aliases are not followed.
    pub fn lookup(&self, name: &str) -> Option<CheckFactory> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.factories.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Registered check and alias names, sorted.
    pub fn names(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = state
            .factories
            .keys()
            .chain(state.aliases.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Resolves a name to a factory, following aliases.
    ///
    /// An alias with several targets yields a composite factory whose
    /// predicate accepts on the first target that passes. An alias with any
    /// unresolvable target, or an alias cycle, resolves to `None`.
    pub fn resolve(&self, name: &str) -> Option<CheckFactory> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut visiting = HashSet::new();
        resolve_in(&state, &name.to_ascii_lowercase(), &mut visiting)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

fn resolve_in(
    state: &RegistryState,
    key: &str,
    visiting: &mut HashSet<String>,
) -> Option<CheckFactory> {
    if let Some(factory) = state.factories.get(key) {
        return Some(factory.clone());
    }
    let targets = state.aliases.get(key)?;
    if !visiting.insert(key.to_string()) {
        return None;
    }

    let mut resolved = Vec::with_capacity(targets.len());
    for target in targets {
        resolved.push(resolve_in(state, target, visiting)?);
    }
    visiting.remove(key);

    match resolved.len() {
        0 => None,
        1 => resolved.pop(),
        _ => Some(any_of(resolved)),
    }
}

/// Composite factory: targets that reject the field kind are dropped, the
/// rest are evaluated in order at runtime.
fn any_of(factories: Vec<CheckFactory>) -> CheckFactory {
    factory(move |field, check| {
        let mut predicates = Vec::with_capacity(factories.len());
        let mut first_error = None;
        for build in &factories {
            match build(field, check) {
                Ok(predicate) => predicates.push(predicate),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if predicates.is_empty()
            && let Some(err) = first_error
        {
            return Err(err);
        }
        Ok(predicate(move |session, value| {
            for candidate in &predicates {
                if candidate(session, value)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }))
    })
}
