use std::{any::TypeId, collections::HashMap, sync::Arc};

use gantry_di::{
    Arguments, InjectMarker, InjectTarget, InjectionContext, InjectionPlan, NamedParameter,
    ParameterPlan, PlanBuilder, Resolver, TypeInfo, Value,
};

fn main() {
    let mut registry = MapResolver::default();
    registry.add(Database {
        url: "postgres://localhost".to_string(),
    });
    registry.add(Logger { prefix: "demo" });

    let context = InjectionContext::new();

    let port_override = NamedParameter::new("port", 5432_u16);
    let service: Service = context
        .create_instance(&registry, &[&port_override])
        .unwrap();

    println!(
        "service wired: db={} port={} logger={:?}",
        service.database.url,
        service.port,
        service.logger.as_ref().map(|l| l.prefix),
    );
}

#[derive(Debug)]
struct Database {
    url: String,
}

#[derive(Debug)]
struct Logger {
    prefix: &'static str,
}

struct Service {
    database: Arc<Database>,
    port: u16,
    logger: Option<Arc<Logger>>,
}

impl InjectTarget for Service {
    fn injection_metadata() -> InjectionPlan {
        PlanBuilder::<Service>::with_constructor(
            vec![
                ParameterPlan::of::<Database>("database"),
                ParameterPlan::of::<u16>("port"),
            ],
            |args: Arguments<'_>| {
                Ok(Service {
                    database: args.get::<Database>(0)?,
                    port: *args.get::<u16>(1)?,
                    logger: None,
                })
            },
        )
        .field::<Logger>("logger", Some(InjectMarker::optional()), |service, logger| {
            service.logger = Some(logger)
        })
        .build()
    }
}

/// Toy resolver backed by a map - stands in for the container
#[derive(Default)]
struct MapResolver {
    values: HashMap<TypeId, Value>,
}

impl MapResolver {
    fn add<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Value::new(value));
    }
}

impl Resolver for MapResolver {
    fn try_resolve_value(&self, type_info: TypeInfo) -> Option<Value> {
        self.values.get(&type_info.type_id).cloned()
    }
}
