use std::sync::Arc;

use crate::{
    errors::{InjectError, RequireError},
    plan::InjectMarker,
    types::{Injectable, TypeInfo, Value},
};

pub mod parameters;

pub use parameters::{InjectParameter, NamedParameter, TypedParameter};

/// The resolver abstraction the injector talks to.
///
/// Registration, lifetimes and scoping live behind this trait - the injector
/// never inspects them.
pub trait Resolver: Send + Sync {
    /// Resolves a value or fails with [`RequireError::TypeMissing`]
    fn resolve_value(&self, type_info: TypeInfo) -> Result<Value, RequireError> {
        self.try_resolve_value(type_info)
            .ok_or(RequireError::TypeMissing(type_info))
    }

    /// Resolves a value, returning `None` for an ordinary missing
    /// registration instead of an error
    fn try_resolve_value(&self, type_info: TypeInfo) -> Option<Value>;
}

/// Typed convenience surface over [`Resolver`]
pub trait ResolverExt: Resolver {
    /// Resolves `T` or fails if it is unregistered
    fn resolve<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        self.resolve_value(TypeInfo::of::<T>())?
            .downcast::<T>()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: TypeInfo::of::<T>(),
                actual_type,
            })
    }

    /// Resolves `T`, returning `None` when it is unregistered
    fn try_resolve<T: Injectable>(&self) -> Option<Arc<T>> {
        self.try_resolve_value(TypeInfo::of::<T>())?.downcast().ok()
    }

    /// Resolves `T`, falling back to `default` when it is unregistered
    fn resolve_or_default<T: Injectable>(&self, default: Arc<T>) -> Arc<T> {
        self.try_resolve::<T>().unwrap_or(default)
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// Decides the value for one parameter or member, in strict order:
///
/// 1. the first matching override wins;
/// 2. no marker, or a force-required marker: resolve, a miss is an error;
/// 3. otherwise best-effort: a miss is `Ok(None)` and never an error.
///
/// Used internally by the injector and public for custom injector
/// implementations.
pub fn resolve_or_parameter(
    resolver: &dyn Resolver,
    marker: Option<&InjectMarker>,
    parameter_type: TypeInfo,
    parameter_name: &'static str,
    overrides: &[&dyn InjectParameter],
) -> Result<Option<Value>, InjectError> {
    for parameter in overrides {
        if parameter.matches(parameter_type, parameter_name) {
            return Ok(Some(parameter.value(resolver)));
        }
    }

    let forced = match marker {
        None => true,
        Some(marker) => marker.force_require,
    };

    if forced {
        return match resolver.resolve_value(parameter_type) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                if matches!(error, RequireError::TypeMissing(_)) {
                    tracing::error!("Tried to require an unregistered type: {}", parameter_type);
                }
                Err(error.into())
            }
        };
    }

    Ok(resolver.try_resolve_value(parameter_type))
}

#[cfg(test)]
mod tests {
    use std::{any::TypeId, collections::HashMap};

    use super::*;

    /// Map-backed resolver, enough for exercising the policy
    #[derive(Default)]
    struct MapResolver {
        values: HashMap<TypeId, Value>,
    }

    impl MapResolver {
        fn with<T: Injectable>(mut self, value: T) -> Self {
            self.values.insert(TypeId::of::<T>(), Value::new(value));
            self
        }
    }

    impl Resolver for MapResolver {
        fn try_resolve_value(&self, type_info: TypeInfo) -> Option<Value> {
            self.values.get(&type_info.type_id).cloned()
        }
    }

    #[test]
    fn resolve_surfaces_a_missing_registration() {
        let resolver = MapResolver::default();

        let result = resolver.resolve::<String>();
        assert!(matches!(
            result,
            Err(RequireError::TypeMissing(info)) if info == TypeInfo::of::<String>()
        ));
    }

    #[test]
    fn try_resolve_is_silent_on_a_miss() {
        let resolver = MapResolver::default().with(7_u32);

        assert_eq!(resolver.try_resolve::<u32>().as_deref(), Some(&7));
        assert_eq!(resolver.try_resolve::<String>(), None);
    }

    #[test]
    fn resolve_or_default_falls_back() {
        let resolver = MapResolver::default();

        let value = resolver.resolve_or_default(Arc::new("fallback".to_string()));
        assert_eq!(*value, "fallback");
    }

    #[test]
    fn override_wins_over_an_existing_registration() {
        let resolver = MapResolver::default().with("registered".to_string());
        let with_override = TypedParameter::new("overridden".to_string());
        let overrides: [&dyn InjectParameter; 1] = [&with_override];

        let value = resolve_or_parameter(
            &resolver,
            None,
            TypeInfo::of::<String>(),
            "name",
            &overrides,
        )
        .unwrap()
        .unwrap();

        assert_eq!(*value.downcast::<String>().unwrap(), "overridden");
    }

    #[test]
    fn first_matching_override_wins() {
        let resolver = MapResolver::default();
        let first = TypedParameter::new(1_u32);
        let second = TypedParameter::new(2_u32);
        let overrides: [&dyn InjectParameter; 2] = [&first, &second];

        let value =
            resolve_or_parameter(&resolver, None, TypeInfo::of::<u32>(), "count", &overrides)
                .unwrap()
                .unwrap();

        assert_eq!(*value.downcast::<u32>().unwrap(), 1);
    }

    #[test]
    fn forced_resolution_errors_on_a_miss() {
        let resolver = MapResolver::default();
        let marker = InjectMarker::required();

        let result = resolve_or_parameter(
            &resolver,
            Some(&marker),
            TypeInfo::of::<String>(),
            "name",
            &[],
        );

        assert!(matches!(
            result,
            Err(InjectError::Require(RequireError::TypeMissing(_)))
        ));
    }

    #[test]
    fn best_effort_resolution_tolerates_a_miss() {
        let resolver = MapResolver::default();
        let marker = InjectMarker::optional();

        let result = resolve_or_parameter(
            &resolver,
            Some(&marker),
            TypeInfo::of::<String>(),
            "name",
            &[],
        )
        .unwrap();

        assert!(result.is_none());
    }
}
