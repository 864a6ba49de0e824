use std::sync::Arc;

use crate::{
    analyzer::TypeAnalyzer,
    errors::InjectError,
    injector::ReflectiveInjector,
    plan::InjectTarget,
    pool::CappedBufferPool,
    resolver::{InjectParameter, Resolver},
    types::Value,
};

/// Argument buffers cover this many parameters before falling back to plain
/// allocation
const ARGUMENT_BUFFER_LENGTH: usize = 8;

/// Explicit owner of the plan cache and the shared argument pool.
///
/// Create one per process (or per engine host) and keep it alive: plans are
/// analyzed once and reused for the context's lifetime, and there is no
/// ambient global to initialize or tear down. The context is `Send + Sync`;
/// independent construction requests may run concurrently on it.
pub struct InjectionContext {
    analyzer: TypeAnalyzer,
    pool: Arc<CappedBufferPool<Value>>,
}

impl Default for InjectionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectionContext {
    pub fn new() -> Self {
        InjectionContext {
            analyzer: TypeAnalyzer::new(),
            pool: Arc::new(CappedBufferPool::new(ARGUMENT_BUFFER_LENGTH)),
        }
    }

    /// An injector executing `T`'s cached plan
    pub fn injector_for<T: InjectTarget>(&self) -> ReflectiveInjector {
        ReflectiveInjector::new(self.analyzer.analyze_with_cache::<T>(), self.pool.clone())
    }

    /// Constructs a `T`, resolving its constructor parameters and injecting
    /// its members
    pub fn create_instance<T: InjectTarget>(
        &self,
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
    ) -> Result<T, InjectError> {
        let injector = self.injector_for::<T>();
        let instance = injector.create_instance(resolver, overrides)?;

        match instance.downcast::<T>() {
            Ok(instance) => Ok(*instance),
            // The plan for T constructs a T; anything else is a broken plan
            Err(_) => Err(InjectError::InstanceMismatch {
                expected: injector.target(),
            }),
        }
    }

    /// Performs member injection on an instance constructed elsewhere
    /// (e.g. an engine-managed object)
    pub fn inject<T: InjectTarget>(
        &self,
        instance: &mut T,
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
    ) -> Result<(), InjectError> {
        self.injector_for::<T>()
            .inject(instance, resolver, overrides)
    }

    /// The shared argument pool, for custom injector implementations
    pub fn argument_pool(&self) -> &Arc<CappedBufferPool<Value>> {
        &self.pool
    }

    /// The plan cache
    pub fn analyzer(&self) -> &TypeAnalyzer {
        &self.analyzer
    }
}
