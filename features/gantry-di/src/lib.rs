//! Gantry DI is the injection engine behind the container: given a type and a
//! live resolver, it works out how to populate that type's dependencies
//! (constructor arguments, fields, properties and methods marked for
//! injection) and produces a fully wired instance.
//!
//! The plan for a type is computed once, cached for the lifetime of the
//! [`InjectionContext`], and repeatedly executed against different
//! resolver/override combinations. Registration, lifetimes and scoping are
//! not part of this crate - they live behind the [`Resolver`] trait.
//!
//! # Examples
//!
//! ```rust
//! use std::{any::TypeId, collections::HashMap, sync::Arc};
//!
//! use gantry_di::{
//!     Arguments, InjectTarget, InjectionContext, InjectionPlan, ParameterPlan,
//!     PlanBuilder, Resolver, TypeInfo, Value,
//! };
//!
//! struct Greeter {
//!     greeting: Arc<String>,
//! }
//!
//! impl InjectTarget for Greeter {
//!     fn injection_metadata() -> InjectionPlan {
//!         PlanBuilder::<Greeter>::with_constructor(
//!             vec![ParameterPlan::of::<String>("greeting")],
//!             |args: Arguments<'_>| {
//!                 Ok(Greeter {
//!                     greeting: args.get::<String>(0)?,
//!                 })
//!             },
//!         )
//!         .build()
//!     }
//! }
//!
//! struct MapResolver(HashMap<TypeId, Value>);
//!
//! impl Resolver for MapResolver {
//!     fn try_resolve_value(&self, type_info: TypeInfo) -> Option<Value> {
//!         self.0.get(&type_info.type_id).cloned()
//!     }
//! }
//!
//! let mut registrations = HashMap::new();
//! registrations.insert(TypeId::of::<String>(), Value::new("hello".to_string()));
//! let resolver = MapResolver(registrations);
//!
//! let context = InjectionContext::new();
//! let greeter: Greeter = context.create_instance(&resolver, &[]).unwrap();
//! assert_eq!(*greeter.greeting, "hello");
//! ```
//!
//! Gantry DI consists of the following components:
//!
//! 1. Plan - the immutable per-type description of every injection point
//! 2. Analyzer - computes and caches one plan per type
//! 3. Injector - executes a plan against a resolver and overrides
//! 4. Pool - reusable argument buffers for constructor/method invocation
//! 5. Resolver - the thin surface through which values are looked up
//! 6. Errors - typed resolution failures with per-frame chain context

pub mod analyzer;
pub mod context;
pub mod errors;
pub mod injector;
pub mod plan;
pub mod pool;
pub mod resolver;
pub mod types;

pub use analyzer::TypeAnalyzer;
pub use context::InjectionContext;
pub use errors::{InjectError, RequireError};
pub use injector::ReflectiveInjector;
pub use plan::{
    Arguments, InjectMarker, InjectTarget, InjectionPlan, ParameterPlan, PlanBuilder,
};
pub use pool::{BufferLease, CappedBufferPool};
pub use resolver::{
    resolve_or_parameter, InjectParameter, NamedParameter, Resolver, ResolverExt, TypedParameter,
};
pub use types::{BoxedInstance, DynError, Injectable, TypeInfo, Value};
