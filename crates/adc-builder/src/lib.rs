//! Hierarchical, strongly typed telemetry documents.
//!
//! This crate provides:
//! - [`Document`], a named tree of typed fields and child sections
//! - The merge that flattens a tree into one JSON wire document
//! - Builders for the conventional sections (`header`, `host`, `code`, ...)
//!
//! ## Quick Start
//!
//! ```rust
//! use adc_builder::{Document, HostSections, ProcessEnv};
//!
//! let doc = Document::new();
//! doc.add_header_section("solver", &ProcessEnv);
//! doc.add_host_section(HostSections::OS, &ProcessEnv);
//!
//! let app = Document::new();
//! app.add("iterations", 42u32);
//! app.add_array("residuals", [1.0e-3, 4.0e-5], Some("vector"));
//! doc.add_app_data_section(&app);
//!
//! let wire = doc.serialize();
//! assert!(wire.contains(r#""iterations":{"type":"uint32","value":42}"#));
//! ```

#![deny(missing_docs)]

/// The document tree and its flatten/serialize merge.
pub mod document;
/// Environment access used by section builders and sink options.
pub mod env;
/// Conventional section builders.
pub mod sections;
/// Host facts: host name, kernel, user, memory.
pub mod system;

pub use document::Document;
pub use env::{split_list, EnvSource, ProcessEnv};
pub use sections::{HostSections, HOST_ENV_LIST_VAR};

/// Version of the document API, recorded as `header.builder_version`.
pub const API_VERSION: &str = "1.0.0";
