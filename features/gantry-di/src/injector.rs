use std::{any::Any, sync::Arc};

use crate::{
    errors::{InjectError, RequireError},
    plan::{Arguments, InjectMarker, InjectionPlan, MemberPlan, ParameterPlan},
    pool::CappedBufferPool,
    resolver::{resolve_or_parameter, InjectParameter, Resolver},
    types::{BoxedInstance, TypeInfo, Value},
};

/// Executes an [`InjectionPlan`] against a resolver and optional parameter
/// overrides.
///
/// Built per call by
/// [`InjectionContext::injector_for`](crate::context::InjectionContext::injector_for);
/// the plan and the argument pool it carries are the shared, cached state.
pub struct ReflectiveInjector {
    plan: Arc<InjectionPlan>,
    pool: Arc<CappedBufferPool<Value>>,
}

impl ReflectiveInjector {
    pub(crate) fn new(plan: Arc<InjectionPlan>, pool: Arc<CappedBufferPool<Value>>) -> Self {
        ReflectiveInjector { plan, pool }
    }

    /// The type this injector builds
    pub fn target(&self) -> TypeInfo {
        self.plan.type_info
    }

    /// Resolves every constructor parameter, invokes the planned constructor,
    /// then performs full member injection on the new instance.
    pub fn create_instance(
        &self,
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
    ) -> Result<BoxedInstance, InjectError> {
        let constructor = &self.plan.constructor;

        let mut instance = {
            let mut arguments = self.pool.rent(constructor.parameters.len());
            if !self.resolve_arguments(
                None,
                &constructor.parameters,
                resolver,
                overrides,
                &mut arguments,
            )? {
                // Constructor parameters never carry a best-effort marker, so
                // this is unreachable through the policy. Abort rather than
                // invoke with a hole in the argument list.
                let missing = constructor.parameters[arguments.len()].type_info;
                return Err(
                    InjectError::from(RequireError::TypeMissing(missing))
                        .wrapped(self.plan.type_info),
                );
            }

            (constructor.invoke)(Arguments::new(&arguments)).map_err(|error| {
                InjectError::InvocationFailed {
                    target: self.plan.type_info,
                    error: Arc::new(error),
                }
            })?
            // Lease dropped here - the buffer goes back before member injection
        };

        self.inject(instance.as_mut(), resolver, overrides)?;

        tracing::debug!("Constructed instance of {}", self.plan.type_info);
        Ok(instance)
    }

    /// Performs field, property and method injection, in that fixed order,
    /// on an already-existing instance.
    pub fn inject(
        &self,
        instance: &mut dyn Any,
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
    ) -> Result<(), InjectError> {
        if (*instance).type_id() != self.plan.type_info.type_id {
            return Err(InjectError::InstanceMismatch {
                expected: self.plan.type_info,
            });
        }

        self.inject_members(&self.plan.fields, instance, resolver, overrides)?;
        self.inject_members(&self.plan.properties, instance, resolver, overrides)?;
        self.inject_methods(instance, resolver, overrides)?;
        Ok(())
    }

    fn inject_members(
        &self,
        members: &[MemberPlan],
        instance: &mut dyn Any,
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
    ) -> Result<(), InjectError> {
        for member in members {
            let resolved = resolve_or_parameter(
                resolver,
                member.marker.as_ref(),
                member.type_info,
                member.name,
                overrides,
            )
            .map_err(|error| error.wrapped(self.plan.type_info))?;

            match resolved {
                Some(value) => {
                    (member.set)(instance, value)
                        .map_err(|error| error.wrapped(self.plan.type_info))?;
                }
                // Best-effort miss: the member keeps whatever value the
                // constructor gave it
                None => {}
            }
        }

        Ok(())
    }

    fn inject_methods(
        &self,
        instance: &mut dyn Any,
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
    ) -> Result<(), InjectError> {
        for method in self.plan.methods.iter() {
            let mut arguments = self.pool.rent(method.parameters.len());
            if !self.resolve_arguments(
                method.marker.as_ref(),
                &method.parameters,
                resolver,
                overrides,
                &mut arguments,
            )? {
                tracing::debug!(
                    "Skipping method '{}' on {} - optional dependency missing",
                    method.name,
                    self.plan.type_info
                );
                continue;
            }

            (method.invoke)(instance, Arguments::new(&arguments)).map_err(|error| {
                InjectError::InvocationFailed {
                    target: self.plan.type_info,
                    error: Arc::new(error),
                }
            })?;
            // Lease dropped at the end of each iteration, on error paths too
        }

        Ok(())
    }

    /// Resolves `parameters` into `buffer`.
    ///
    /// Returns `false` when a best-effort parameter had no registration;
    /// hard misses and override/setter failures propagate as errors wrapped
    /// with this injector's target type.
    fn resolve_arguments(
        &self,
        marker: Option<&InjectMarker>,
        parameters: &[ParameterPlan],
        resolver: &dyn Resolver,
        overrides: &[&dyn InjectParameter],
        buffer: &mut Vec<Value>,
    ) -> Result<bool, InjectError> {
        for parameter in parameters {
            let resolved = resolve_or_parameter(
                resolver,
                marker,
                parameter.type_info,
                parameter.name,
                overrides,
            )
            .map_err(|error| error.wrapped(self.plan.type_info))?;

            match resolved {
                Some(value) => buffer.push(value),
                None => return Ok(false),
            }
        }

        Ok(true)
    }
}
