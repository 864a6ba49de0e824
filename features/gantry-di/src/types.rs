use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All errors must be Send + Sync so injection can run on any thread
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything crossing the injection boundary may be shared across threads
/// So anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A freshly constructed, not-yet-downcast instance.
///
/// Owned (as opposed to [`Value`]) because member injection needs `&mut`.
pub type BoxedInstance = Box<dyn Any + Send + Sync + 'static>;

/// Type-erased value handed out by a [`Resolver`](crate::resolver::Resolver)
/// and consumed by plan setters and invokers
#[derive(Clone)]
pub struct Value {
    pub info: TypeInfo,
    value: Arc<dyn Any + Send + Sync + 'static>,
}

impl Value {
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared instance without cloning it
    pub fn from_arc<T: Injectable>(value: Arc<T>) -> Self {
        Value {
            info: TypeInfo::of::<T>(),
            value,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
