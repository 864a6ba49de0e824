use std::{any::TypeId, sync::Arc};

use crate::{
    resolver::Resolver,
    types::{Injectable, TypeInfo, Value},
};

/// A caller-supplied override for a single parameter or member.
///
/// Matched against the declared type and name before the resolver is
/// consulted; the first match in the override list wins. Overrides are
/// read-only to the injector and never retained beyond the call.
pub trait InjectParameter: Send + Sync {
    fn matches(&self, parameter_type: TypeInfo, parameter_name: &str) -> bool;

    /// The value to use when matched.
    ///
    /// Receives the live resolver so overrides can derive their value from
    /// other registrations.
    fn value(&self, resolver: &dyn Resolver) -> Value;
}

/// Override matching every parameter of type `T`
pub struct TypedParameter<T: Injectable> {
    value: Arc<T>,
}

impl<T: Injectable> TypedParameter<T> {
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc(value: Arc<T>) -> Self {
        TypedParameter { value }
    }
}

impl<T: Injectable> InjectParameter for TypedParameter<T> {
    fn matches(&self, parameter_type: TypeInfo, _parameter_name: &str) -> bool {
        parameter_type.type_id == TypeId::of::<T>()
    }

    fn value(&self, _resolver: &dyn Resolver) -> Value {
        Value::from_arc(self.value.clone())
    }
}

/// Override matching a parameter of type `T` with a specific name
pub struct NamedParameter<T: Injectable> {
    name: &'static str,
    value: Arc<T>,
}

impl<T: Injectable> NamedParameter<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        NamedParameter {
            name,
            value: Arc::new(value),
        }
    }
}

impl<T: Injectable> InjectParameter for NamedParameter<T> {
    fn matches(&self, parameter_type: TypeInfo, parameter_name: &str) -> bool {
        parameter_type.type_id == TypeId::of::<T>() && parameter_name == self.name
    }

    fn value(&self, _resolver: &dyn Resolver) -> Value {
        Value::from_arc(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_parameter_matches_by_type_only() {
        let parameter = TypedParameter::new(1_u32);

        assert!(parameter.matches(TypeInfo::of::<u32>(), "anything"));
        assert!(!parameter.matches(TypeInfo::of::<u64>(), "anything"));
    }

    #[test]
    fn named_parameter_requires_both_type_and_name() {
        let parameter = NamedParameter::new("port", 8080_u16);

        assert!(parameter.matches(TypeInfo::of::<u16>(), "port"));
        assert!(!parameter.matches(TypeInfo::of::<u16>(), "host"));
        assert!(!parameter.matches(TypeInfo::of::<u32>(), "port"));
    }
}
