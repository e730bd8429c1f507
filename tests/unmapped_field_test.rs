mod setup;

use graphqlize::engine::database::memory::MemoryStore;
use graphqlize::Engine;
use log::{Level, LevelFilter, Log, Metadata, Record};
use setup::load_catalog;
use std::sync::{Arc, Mutex};

/// Keeps every warning logged while the test binary runs
struct WarningLog {
    lines: Mutex<Vec<String>>,
}

impl Log for WarningLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(record.args().to_string());
            }
        }
    }

    fn flush(&self) {}
}

static WARNINGS: WarningLog = WarningLog {
    lines: Mutex::new(Vec::new()),
};

/// Passes if every field without a GraphQL representation is reported with a warning naming it
#[test]
fn unmapped_field_warning() {
    log::set_logger(&WARNINGS).unwrap();
    log::set_max_level(LevelFilter::Warn);

    Engine::from_catalog(
        load_catalog("./tests/fixtures/widgets.yml"),
        Arc::new(MemoryStore::new()),
    )
    .unwrap();

    let lines = WARNINGS.lines.lock().unwrap();
    assert!(lines
        .iter()
        .any(|l| l == "Unable to map field firmware to a GraphQL field"));
    assert!(lines
        .iter()
        .any(|l| l == "Unable to map field installed to a GraphQL field"));
    assert!(!lines.iter().any(|l| l.contains("field serial")));
}
