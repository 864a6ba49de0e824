use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Errors when trying to require a certain type from a resolver
#[derive(thiserror::Error, Debug, Clone)]
pub enum RequireError {
    /// The required type has no registration
    #[error("The required type is not registered: '{0}'")]
    TypeMissing(TypeInfo),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: TypeInfo,
        actual_type: &'static str,
    },

    /// The resolver constructed the value on demand and that construction
    /// failed further down the chain
    #[error(transparent)]
    Construction(#[from] Box<InjectError>),
}

/// Errors raised while constructing or injecting an instance
#[derive(Error, Debug, Clone)]
pub enum InjectError {
    /// Could not require a type from the resolver
    #[error(transparent)]
    Require(#[from] RequireError),

    /// A failure from a nested frame, rewrapped with the type that was being
    /// built when it surfaced. `invalid_type` stays the root cause so callers
    /// can inspect it without parsing messages.
    #[error("Failed to resolve '{target}': {source}")]
    ConstructionFailed {
        target: TypeInfo,
        invalid_type: TypeInfo,
        source: Box<InjectError>,
    },

    /// The planned constructor or injection method itself failed
    #[error("Invocation on '{target}' failed - error: {error:?}")]
    InvocationFailed {
        target: TypeInfo,
        error: Arc<DynError>,
    },

    /// An instance handed to `inject` was not of the plan's target type
    #[error("Injection target is not an instance of '{expected}'")]
    InstanceMismatch { expected: TypeInfo },
}

impl InjectError {
    /// The type at the root of this failure.
    ///
    /// For chained construction failures this is the innermost offending
    /// type, not the type of the frame that reported the error.
    pub fn invalid_type(&self) -> TypeInfo {
        match self {
            InjectError::Require(RequireError::TypeMissing(info)) => *info,
            InjectError::Require(RequireError::DowncastFailed { required_type, .. }) => {
                *required_type
            }
            InjectError::Require(RequireError::Construction(inner)) => inner.invalid_type(),
            InjectError::ConstructionFailed { invalid_type, .. } => *invalid_type,
            InjectError::InvocationFailed { target, .. } => *target,
            InjectError::InstanceMismatch { expected } => *expected,
        }
    }

    /// Rewraps this error with the type the enclosing injector was building
    pub(crate) fn wrapped(self, target: TypeInfo) -> InjectError {
        let invalid_type = self.invalid_type();
        InjectError::ConstructionFailed {
            target,
            invalid_type,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ServiceA;
    struct ServiceB;
    struct ServiceC;

    #[test]
    fn wrapping_preserves_the_root_cause_type() {
        let missing = InjectError::from(RequireError::TypeMissing(TypeInfo::of::<ServiceC>()));
        let wrapped = missing
            .wrapped(TypeInfo::of::<ServiceB>())
            .wrapped(TypeInfo::of::<ServiceA>());

        assert_eq!(wrapped.invalid_type(), TypeInfo::of::<ServiceC>());
    }

    #[test]
    fn wrapping_chains_every_enclosing_type_in_the_message() {
        let missing = InjectError::from(RequireError::TypeMissing(TypeInfo::of::<ServiceC>()));
        let wrapped = missing
            .wrapped(TypeInfo::of::<ServiceB>())
            .wrapped(TypeInfo::of::<ServiceA>());

        let message = wrapped.to_string();
        assert!(message.contains("ServiceA"));
        assert!(message.contains("ServiceB"));
        assert!(message.contains("ServiceC"));
    }
}
