use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::compiler::{Compiler, SchemaPlan};
use crate::error::CompileError;
use crate::record::Record;

/// Compiled plans keyed by record type.
///
/// Plans are compiled outside the lock and published whole; a failed
/// compilation is never cached.
#[derive(Debug, Default)]
pub struct SchemaCache {
    plans: RwLock<HashMap<TypeId, Arc<SchemaPlan>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &self,
        record: &dyn Record,
        compiler: &Compiler<'_>,
    ) -> Result<Arc<SchemaPlan>, CompileError> {
        let key = record.record_type();
        if let Some(plan) = self.cached(key) {
            return Ok(plan);
        }

        let plan = match compiler.compile(record) {
            Ok(plan) => Arc::new(plan),
            Err(err) => {
                warn!(record = record.type_name(), error = %err, "schema compilation failed");
                return Err(err);
            }
        };

        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        Ok(plans.entry(key).or_insert(plan).clone())
    }

    pub fn contains(&self, record_type: TypeId) -> bool {
        self.cached(record_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, record_type: TypeId) -> Option<Arc<SchemaPlan>> {
        let plans = self.plans.read().unwrap_or_else(PoisonError::into_inner);
        plans.get(&record_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Separator;
    use crate::record::RecordSchema;
    use crate::registry::{Registry, factory, predicate};
    use crate::value::{Inspect, Value};

    struct Sample {
        value: i64,
    }

    impl Record for Sample {
        fn schema(&self) -> RecordSchema {
            RecordSchema::new("Sample").field::<i64>("value", "ok")
        }

        fn field_value(&self, index: usize) -> Value<'_> {
            match index {
                0 => self.value.to_value(),
                _ => Value::Nil,
            }
        }
    }

    #[test]
    fn compiles_once_per_type() {
        let registry = Registry::new();
        registry.register("ok", factory(|_, _| Ok(predicate(|_, _| Ok(true)))));
        let compiler = Compiler::new(&registry, Separator::Comma);
        let cache = SchemaCache::new();

        let first = cache
            .get_or_compile(&Sample { value: 1 }, &compiler)
            .expect("compiles");
        let second = cache
            .get_or_compile(&Sample { value: 2 }, &compiler)
            .expect("cached");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(TypeId::of::<Sample>()));
    }

    #[test]
    fn failures_are_not_cached() {
        let registry = Registry::new();
        let compiler = Compiler::new(&registry, Separator::Comma);
        let cache = SchemaCache::new();

        for _ in 0..2 {
            let err = cache
                .get_or_compile(&Sample { value: 1 }, &compiler)
                .expect_err("unknown check");
            assert!(matches!(err, CompileError::UnknownCheck { .. }));
        }
        assert!(cache.is_empty());

        registry.register("ok", factory(|_, _| Ok(predicate(|_, _| Ok(true)))));
        cache
            .get_or_compile(&Sample { value: 1 }, &compiler)
            .expect("compiles once the check exists");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn poisoned_lock_still_serves_cached_plans() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let compiled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&compiled);
        let registry = Registry::new();
        registry.register(
            "ok",
            factory(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(predicate(|_, _| Ok(true)))
            }),
        );
        let compiler = Compiler::new(&registry, Separator::Comma);
        let cache = Arc::new(SchemaCache::new());
        cache
            .get_or_compile(&Sample { value: 1 }, &compiler)
            .expect("first compile");

        let poisoner = Arc::clone(&cache);
        let outcome = std::thread::spawn(move || {
            let _guard = poisoner.plans.write().expect("write lock");
            panic!("poison the cache lock");
        })
        .join();
        assert!(outcome.is_err());
        assert!(cache.plans.is_poisoned());

        assert!(cache.contains(TypeId::of::<Sample>()));
        cache
            .get_or_compile(&Sample { value: 2 }, &compiler)
            .expect("served from cache");
        assert_eq!(compiled.load(Ordering::SeqCst), 1);
    }
}
