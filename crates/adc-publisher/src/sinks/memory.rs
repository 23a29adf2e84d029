use std::cell::RefCell;
use std::rc::Rc;

use adc_builder::EnvSource;

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;

/// Records each serialized document; clones share one record.
///
/// Not registered with the factory; construct it directly for tests and
/// in-process consumers.
#[derive(Debug, Clone, Default)]
pub struct MemoryDelivery {
    records: Rc<RefCell<Vec<String>>>,
}

impl MemoryDelivery {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents delivered so far, oldest first.
    pub fn records(&self) -> Vec<String> {
        self.records.borrow().clone()
    }

    /// Number of documents delivered so far.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Whether nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl Delivery for MemoryDelivery {
    const NAME: &'static str = "memory";

    fn options() -> &'static [OptionSpec] {
        &[]
    }

    fn apply(&mut self, _: &ResolvedOptions, _: &dyn EnvSource) -> Result<(), PublishError> {
        Ok(())
    }

    fn open(&mut self) -> Result<(), PublishError> {
        Ok(())
    }

    fn deliver(&mut self, payload: &str) -> Result<(), PublishError> {
        self.records.borrow_mut().push(payload.to_string());
        Ok(())
    }

    fn close(&mut self) {}
}
