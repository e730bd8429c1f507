//! An in-memory [`Store`], holding records in insertion order per model.
//!
//! [`Store`]: ../trait.Store.html

use crate::engine::config::Model;
use crate::engine::database::{Predicate, Record, Records, Store};
use crate::error::Error;
use log::trace;
use std::collections::HashMap;
use std::sync::RwLock;

/// A [`Store`] that keeps every record in memory.
///
/// [`Store`]: ../trait.Store.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::database::memory::MemoryStore;
/// use graphqlize::engine::database::Record;
/// use graphqlize::engine::value::Value;
/// use std::collections::HashMap;
///
/// let store = MemoryStore::new();
///
/// let mut fields = HashMap::new();
/// fields.insert("id".to_string(), Value::Int64(1));
/// store.insert(Record::new("FactoryMachine", fields)).unwrap();
///
/// assert_eq!(store.len("FactoryMachine").unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Appends a record to the table of its model
    pub fn insert(&self, record: Record) -> Result<(), Error> {
        trace!("MemoryStore::insert called -- record: {:#?}", record);
        let mut tables = self.tables.write().map_err(|_| Error::StorePoisoned)?;
        tables
            .entry(record.model().to_string())
            .or_insert_with(Vec::new)
            .push(record);
        Ok(())
    }

    /// Number of records stored for the model named `model`
    pub fn len(&self, model: &str) -> Result<usize, Error> {
        let tables = self.tables.read().map_err(|_| Error::StorePoisoned)?;
        Ok(tables.get(model).map_or(0, Vec::len))
    }

    fn rows(&self, model: &Model) -> Result<Vec<Record>, Error> {
        let tables = self.tables.read().map_err(|_| Error::StorePoisoned)?;
        Ok(tables.get(model.name()).cloned().unwrap_or_default())
    }
}

impl Store for MemoryStore {
    fn fetch_one(&self, model: &Model, predicates: &[Predicate]) -> Result<Record, Error> {
        trace!(
            "MemoryStore::fetch_one called -- model: {}, predicates: {:#?}",
            model.name(),
            predicates
        );

        self.rows(model)?
            .into_iter()
            .find(|r| predicates.iter().all(|p| p.matches(r)))
            .ok_or_else(|| Error::NotFound {
                model: model.name().to_string(),
            })
    }

    fn fetch_many(&self, model: &Model, predicates: &[Predicate]) -> Result<Records, Error> {
        trace!(
            "MemoryStore::fetch_many called -- model: {}, predicates: {:#?}",
            model.name(),
            predicates
        );

        let predicates = predicates.to_vec();
        Ok(Box::new(
            self.rows(model)?
                .into_iter()
                .filter(move |r| predicates.iter().all(|p| p.matches(r))),
        ))
    }
}
