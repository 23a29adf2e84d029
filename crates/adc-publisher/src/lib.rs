//! Delivery of ADC telemetry documents.
//!
//! This crate provides:
//! - The [`Sink`] lifecycle contract and the [`Publisher`] state machine
//!   every built-in sink shares
//! - Built-in sinks: `none`, `stdout`, `file`, `multifile`, `syslog`, `script`
//! - [`FanOut`], which broadcasts one document to many sinks
//! - [`Factory`], which builds sinks by name and fan-outs from the environment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use adc_publisher::{Factory, Sink};
//!
//! let factory = Factory::new();
//! let doc = factory.builder();
//! doc.add("step", 3u32);
//!
//! let options = BTreeMap::from([("DIRECTORY".to_string(), "/tmp/adc".to_string())]);
//! if let Some(sink) = factory.create_with_options("file", &options)? {
//!     let mut sink = sink.borrow_mut();
//!     sink.initialize()?;
//!     sink.publish(&doc)?;
//!     sink.finalize();
//! }
//! # Ok::<(), adc_publisher::PublishError>(())
//! ```

#![deny(missing_docs)]

/// Error types for sink lifecycle operations.
pub mod error;
/// Sink registry and fan-out construction.
pub mod factory;
/// Broadcasting to many sinks.
pub mod fanout;
/// Sink option tables and their resolution.
pub mod options;
/// The sink contract and lifecycle state machine.
pub mod publisher;
/// Built-in sinks.
pub mod sinks;

pub use error::PublishError;
pub use factory::{Factory, MULTI_PUBLISHER_NAMES_VAR};
pub use fanout::{FanOut, FANOUT_VERSION};
pub use options::{default_prefix, OptionSpec, ResolvedOptions};
pub use publisher::{handle, Delivery, Phase, Publisher, Sink, SinkHandle, SINK_VERSION};
