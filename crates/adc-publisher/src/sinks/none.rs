use adc_builder::EnvSource;

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;

/// Accepts every document and drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneDelivery;

impl Delivery for NoneDelivery {
    const NAME: &'static str = "none";

    fn options() -> &'static [OptionSpec] {
        &[]
    }

    fn apply(&mut self, _: &ResolvedOptions, _: &dyn EnvSource) -> Result<(), PublishError> {
        Ok(())
    }

    fn open(&mut self) -> Result<(), PublishError> {
        Ok(())
    }

    fn deliver(&mut self, _: &str) -> Result<(), PublishError> {
        Ok(())
    }

    fn close(&mut self) {}
}
