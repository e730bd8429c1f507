use graphqlize::engine::config::Catalog;
use graphqlize::engine::database::memory::MemoryStore;
use graphqlize::engine::database::Record;
use graphqlize::engine::value::Value;
use graphqlize::Engine;
use maplit::hashmap;
use std::sync::Arc;

#[allow(dead_code)]
pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub(crate) fn load_catalog(path: &str) -> Catalog {
    Catalog::from_file(path).expect("Could not load test model catalog file.")
}

/// One factory machine, two widgets built on it, one widget with no machine, and one gauge
#[allow(dead_code)]
pub(crate) fn widget_store() -> MemoryStore {
    let store = MemoryStore::new();

    store
        .insert(Record::new(
            "FactoryMachine",
            hashmap! {
                "id".to_string() => Value::Int64(1),
                "name".to_string() => Value::from("Green Machine"),
                "installed".to_string() => Value::from("2020-01-01T00:00:00Z"),
            },
        ))
        .expect("Expected insert to succeed.");

    for (id, size, color, machine) in &[
        (7, 3, "green", Value::Int64(1)),
        (8, 5, "blue", Value::Int64(1)),
        (9, 3, "green", Value::Null),
    ] {
        store
            .insert(Record::new(
                "Widget",
                hashmap! {
                    "id".to_string() => Value::Int64(*id),
                    "size".to_string() => Value::Int64(*size),
                    "color".to_string() => Value::from(*color),
                    "constructed_with".to_string() => machine.clone(),
                },
            ))
            .expect("Expected insert to succeed.");
    }

    store
        .insert(Record::new(
            "Gauge",
            hashmap! {
                "id".to_string() => Value::from("g-1"),
                "serial".to_string() => Value::from("936da01f-9abd-4d9d-80c7-02af85c822a8"),
                "reading".to_string() => Value::Float64(2.5),
                "ticks".to_string() => Value::Int64(42),
                "firmware".to_string() => Value::from("deadbeef"),
            },
        ))
        .expect("Expected insert to succeed.");

    store
}

#[allow(dead_code)]
pub(crate) fn widget_engine() -> Engine {
    Engine::from_catalog(
        load_catalog("./tests/fixtures/widgets.yml"),
        Arc::new(widget_store()),
    )
    .expect("Expected engine to build.")
}

/// An owner and a pet that point at each other
#[allow(dead_code)]
pub(crate) fn cycle_store() -> MemoryStore {
    let store = MemoryStore::new();

    store
        .insert(Record::new(
            "Owner",
            hashmap! {
                "id".to_string() => Value::Int64(1),
                "name".to_string() => Value::from("Ada"),
                "pet".to_string() => Value::Int64(2),
            },
        ))
        .expect("Expected insert to succeed.");
    store
        .insert(Record::new(
            "Pet",
            hashmap! {
                "id".to_string() => Value::Int64(2),
                "name".to_string() => Value::from("Rex"),
                "owner".to_string() => Value::Int64(1),
            },
        ))
        .expect("Expected insert to succeed.");

    store
}
