use std::{any::Any, marker::PhantomData, sync::Arc};

use crate::{
    errors::{InjectError, RequireError},
    types::{BoxedInstance, DynError, Injectable, TypeInfo, Value},
};

/// Marker data attached to an injectable member or method.
///
/// `force_require` switches the member from best-effort resolution (a miss
/// leaves the member untouched) to forced resolution (a miss is an error).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectMarker {
    pub force_require: bool,
}

impl InjectMarker {
    pub fn optional() -> Self {
        InjectMarker {
            force_require: false,
        }
    }

    pub fn required() -> Self {
        InjectMarker {
            force_require: true,
        }
    }
}

/// A single constructor or method parameter
#[derive(Debug, Clone, Copy)]
pub struct ParameterPlan {
    pub type_info: TypeInfo,
    pub name: &'static str,
}

impl ParameterPlan {
    pub fn of<T: Injectable>(name: &'static str) -> Self {
        ParameterPlan {
            type_info: TypeInfo::of::<T>(),
            name,
        }
    }
}

/// View over a filled argument buffer, handed to constructor and method
/// invokers
pub struct Arguments<'a> {
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(values: &'a [Value]) -> Self {
        Arguments { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Takes the argument at `index` as an `Arc<T>`
    ///
    /// # Panics
    /// - If `index` is outside the declared parameter list
    pub fn get<T: Injectable>(&self, index: usize) -> Result<Arc<T>, RequireError> {
        self.values[index]
            .downcast::<T>()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: TypeInfo::of::<T>(),
                actual_type,
            })
    }
}

pub(crate) type ConstructorFn =
    Box<dyn Fn(Arguments<'_>) -> Result<BoxedInstance, DynError> + Send + Sync>;
pub(crate) type SetterFn = Box<dyn Fn(&mut dyn Any, Value) -> Result<(), InjectError> + Send + Sync>;
pub(crate) type MethodFn =
    Box<dyn Fn(&mut dyn Any, Arguments<'_>) -> Result<(), DynError> + Send + Sync>;

/// The selected constructor: parameter descriptors plus the invoker producing
/// the instance
pub struct ConstructorPlan {
    pub parameters: Box<[ParameterPlan]>,
    pub(crate) invoke: ConstructorFn,
}

/// An injectable field or property
pub struct MemberPlan {
    pub type_info: TypeInfo,
    pub name: &'static str,
    pub marker: Option<InjectMarker>,
    pub(crate) set: SetterFn,
}

/// An injectable method
pub struct MethodPlan {
    pub name: &'static str,
    pub parameters: Box<[ParameterPlan]>,
    pub marker: Option<InjectMarker>,
    pub(crate) invoke: MethodFn,
}

/// Immutable, per-type description of which constructor, fields, properties
/// and methods receive injected values.
///
/// Computed once by the [`TypeAnalyzer`](crate::analyzer::TypeAnalyzer) and
/// shared for the lifetime of the owning
/// [`InjectionContext`](crate::context::InjectionContext).
pub struct InjectionPlan {
    pub type_info: TypeInfo,
    pub constructor: ConstructorPlan,
    pub fields: Box<[MemberPlan]>,
    pub properties: Box<[MemberPlan]>,
    pub methods: Box<[MethodPlan]>,
}

/// A type that can describe its own injection points.
///
/// Normally implemented by a derive macro; the declaration syntax is not part
/// of this crate. `injection_metadata` must be self-contained - it is invoked
/// while the plan cache holds the slot for this type, so it must not resolve
/// or analyze other types.
pub trait InjectTarget: Injectable + Sized {
    fn injection_metadata() -> InjectionPlan;
}

/// Builds an [`InjectionPlan`] for `T`.
///
/// A plan always holds exactly one constructor, so a builder can only be
/// created through [`PlanBuilder::with_constructor`] or
/// [`PlanBuilder::with_default`].
pub struct PlanBuilder<T: Injectable> {
    constructor: ConstructorPlan,
    fields: Vec<MemberPlan>,
    properties: Vec<MemberPlan>,
    methods: Vec<MethodPlan>,
    _target: PhantomData<fn() -> T>,
}

impl<T: Injectable> PlanBuilder<T> {
    pub fn with_constructor<F>(parameters: Vec<ParameterPlan>, construct: F) -> Self
    where
        F: Fn(Arguments<'_>) -> Result<T, DynError> + Send + Sync + 'static,
    {
        let invoke: ConstructorFn = Box::new(move |arguments| {
            construct(arguments).map(|instance| Box::new(instance) as BoxedInstance)
        });

        PlanBuilder {
            constructor: ConstructorPlan {
                parameters: parameters.into_boxed_slice(),
                invoke,
            },
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            _target: PhantomData,
        }
    }

    /// Plan with a parameterless constructor
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::with_constructor(Vec::new(), |_| Ok(T::default()))
    }

    pub fn field<V: Injectable>(
        mut self,
        name: &'static str,
        marker: Option<InjectMarker>,
        set: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(Self::member(name, marker, set));
        self
    }

    pub fn property<V: Injectable>(
        mut self,
        name: &'static str,
        marker: Option<InjectMarker>,
        set: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> Self {
        self.properties.push(Self::member(name, marker, set));
        self
    }

    pub fn method<F>(
        mut self,
        name: &'static str,
        marker: Option<InjectMarker>,
        parameters: Vec<ParameterPlan>,
        invoke: F,
    ) -> Self
    where
        F: Fn(&mut T, Arguments<'_>) -> Result<(), DynError> + Send + Sync + 'static,
    {
        let erased: MethodFn = Box::new(move |instance, arguments| {
            let target = instance
                .downcast_mut::<T>()
                .ok_or_else(|| -> DynError {
                    Box::new(InjectError::InstanceMismatch {
                        expected: TypeInfo::of::<T>(),
                    })
                })?;
            invoke(target, arguments)
        });

        self.methods.push(MethodPlan {
            name,
            parameters: parameters.into_boxed_slice(),
            marker,
            invoke: erased,
        });
        self
    }

    pub fn build(self) -> InjectionPlan {
        InjectionPlan {
            type_info: TypeInfo::of::<T>(),
            constructor: self.constructor,
            fields: self.fields.into_boxed_slice(),
            properties: self.properties.into_boxed_slice(),
            methods: self.methods.into_boxed_slice(),
        }
    }

    fn member<V: Injectable>(
        name: &'static str,
        marker: Option<InjectMarker>,
        set: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> MemberPlan {
        let erased: SetterFn = Box::new(move |instance, value| {
            let target =
                instance
                    .downcast_mut::<T>()
                    .ok_or(InjectError::InstanceMismatch {
                        expected: TypeInfo::of::<T>(),
                    })?;

            let value = value
                .downcast::<V>()
                .map_err(|actual_type| RequireError::DowncastFailed {
                    required_type: TypeInfo::of::<V>(),
                    actual_type,
                })?;

            set(target, value);
            Ok(())
        });

        MemberPlan {
            type_info: TypeInfo::of::<V>(),
            name,
            marker,
            set: erased,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Widget {
        label: Option<Arc<String>>,
    }

    fn widget_plan() -> InjectionPlan {
        PlanBuilder::<Widget>::with_default()
            .field::<String>("label", Some(InjectMarker::optional()), |w, v| {
                w.label = Some(v)
            })
            .build()
    }

    #[test]
    fn builder_records_declared_members() {
        let plan = widget_plan();

        assert_eq!(plan.type_info, TypeInfo::of::<Widget>());
        assert!(plan.constructor.parameters.is_empty());
        assert_eq!(plan.fields.len(), 1);
        assert_eq!(plan.fields[0].type_info, TypeInfo::of::<String>());
        assert_eq!(plan.fields[0].name, "label");
        assert!(plan.properties.is_empty());
        assert!(plan.methods.is_empty());
    }

    #[test]
    fn setter_rejects_a_foreign_instance() {
        let plan = widget_plan();
        let mut not_a_widget = 7_u32;

        let result = (plan.fields[0].set)(&mut not_a_widget, Value::new("x".to_string()));
        assert!(matches!(
            result,
            Err(InjectError::InstanceMismatch { expected }) if expected == TypeInfo::of::<Widget>()
        ));
    }

    #[test]
    fn setter_rejects_a_value_of_the_wrong_type() {
        let plan = widget_plan();
        let mut widget = Widget::default();

        let result = (plan.fields[0].set)(&mut widget, Value::new(42_u32));
        assert!(matches!(
            result,
            Err(InjectError::Require(RequireError::DowncastFailed { .. }))
        ));
    }

    #[test]
    fn arguments_downcast_to_the_declared_type() {
        let values = vec![Value::new("hello".to_string()), Value::new(3_u32)];
        let arguments = Arguments::new(&values);

        assert_eq!(*arguments.get::<String>(0).unwrap(), "hello");
        assert_eq!(*arguments.get::<u32>(1).unwrap(), 3);
        assert!(arguments.get::<u64>(1).is_err());
    }
}
