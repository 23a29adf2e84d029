use std::io::{self, Write};

use adc_builder::EnvSource;

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;

/// Prints each document as one line on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutDelivery;

impl Delivery for StdoutDelivery {
    const NAME: &'static str = "stdout";

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
        write_line(&mut io::stdout().lock(), payload)
            .map_err(|e| PublishError::resource("writing to stdout", e))
    }

    fn close(&mut self) {}
}

fn write_line(out: &mut impl Write, payload: &str) -> io::Result<()> {
    writeln!(out, "{payload}")?;
    out.flush()
}
