use std::{any::TypeId, sync::Arc};

use dashmap::DashMap;

use crate::plan::{InjectTarget, InjectionPlan};

/// Per-type plan cache.
///
/// The first request for a type runs its metadata discovery and stores the
/// plan; every later request is a map hit. The cache is append-only: once a
/// `TypeId` has a plan it never changes, and no caller can observe a partial
/// plan because the `Arc` is inserted only after discovery completes. Two
/// threads racing the first analysis of one type serialize on the map entry
/// and both receive the same plan; first analyses of distinct types do not
/// block each other.
#[derive(Default)]
pub struct TypeAnalyzer {
    plans: DashMap<TypeId, Arc<InjectionPlan>>,
}

impl TypeAnalyzer {
    pub fn new() -> Self {
        TypeAnalyzer {
            plans: DashMap::new(),
        }
    }

    pub fn analyze_with_cache<T: InjectTarget>(&self) -> Arc<InjectionPlan> {
        self.plans
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!("Analyzing injection plan for {}", std::any::type_name::<T>());
                Arc::new(T::injection_metadata())
            })
            .clone()
    }

    /// Number of types analyzed so far
    pub fn analyzed_types(&self) -> usize {
        self.plans.len()
    }
}
