//! Built-in sinks. Each module supplies a [`Delivery`](crate::Delivery);
//! [`Publisher`](crate::Publisher) wraps it in the shared lifecycle.

/// Appends documents to one file.
pub mod file;
/// Records documents in memory.
pub mod memory;
/// Writes each sink instance's documents to its own file in a per-user tree.
pub mod multifile;
/// Discards documents.
pub mod none;
/// Hands each document to a helper program.
pub mod script;
/// Writes documents to stdout.
pub mod stdout;
/// Sends documents to the system log.
pub mod syslog;

use crate::publisher::Publisher;

pub use file::FileDelivery;
pub use memory::MemoryDelivery;
pub use multifile::MultiFileDelivery;
pub use none::NoneDelivery;
pub use script::ScriptDelivery;
pub use stdout::StdoutDelivery;
pub use syslog::SyslogDelivery;

/// Sink that accepts and discards every document.
pub type NoneSink = Publisher<NoneDelivery>;
/// Sink that prints one document per line to stdout.
pub type StdoutSink = Publisher<StdoutDelivery>;
/// Sink that appends one document per line to a file.
pub type FileSink = Publisher<FileDelivery>;
/// Sink that writes to a per-instance file under a user/workflow tree.
pub type MultiFileSink = Publisher<MultiFileDelivery>;
/// Sink that logs each document through syslog.
pub type SyslogSink = Publisher<SyslogDelivery>;
/// Sink that launches a helper program per document.
pub type ScriptSink = Publisher<ScriptDelivery>;
/// Sink that keeps documents in memory.
pub type MemorySink = Publisher<MemoryDelivery>;
