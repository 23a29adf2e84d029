use adc_builder::Document;
use tracing::{debug, warn};

use crate::publisher::{Sink, SinkHandle};

/// Version reported by [`FanOut`].
pub const FANOUT_VERSION: &str = "0.0.0";

/// Broadcasts each document to an ordered list of sinks.
///
/// Members are shared handles: the same sink may be listed more than once,
/// and callers may keep their own handles to drive members directly.
#[derive(Default)]
pub struct FanOut {
    members: Vec<SinkHandle>,
}

impl FanOut {
    /// An empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Version string of the fan-out.
    pub fn version(&self) -> &'static str {
        FANOUT_VERSION
    }

    /// Appends a member; duplicates are kept.
    pub fn add(&mut self, sink: SinkHandle) {
        self.members.push(sink);
    }

    /// Publishes to every member and returns how many failed.
    ///
    /// A failing member never stops delivery to the rest. A member that is
    /// already borrowed (re-entrant publish) counts as failed.
    pub fn publish(&self, document: &Document) -> usize {
        let mut failures = 0;
        for (index, member) in self.members.iter().enumerate() {
            let Ok(mut sink) = member.try_borrow_mut() else {
                warn!(index, "fan-out member busy; skipped");
                failures += 1;
                continue;
            };
            if let Err(error) = sink.publish(document) {
                warn!(index, sink = sink.name(), %error, "fan-out member failed to publish");
                failures += 1;
            }
        }
        if failures > 0 {
            debug!(failures, members = self.members.len(), "fan-out publish incomplete");
        }
        failures
    }

    /// Pauses every member.
    pub fn pause(&self) {
        self.each("pause", |sink| sink.pause());
    }

    /// Resumes every member.
    pub fn resume(&self) {
        self.each("resume", |sink| sink.resume());
    }

    /// Finalizes every member, then empties the list.
    ///
    /// The fan-out stays usable; new members may be added afterwards.
    pub fn terminate(&mut self) {
        self.each("finalize", |sink| sink.finalize());
        self.members.clear();
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn each(&self, operation: &'static str, mut apply: impl FnMut(&mut dyn Sink)) {
        for (index, member) in self.members.iter().enumerate() {
            match member.try_borrow_mut() {
                Ok(mut sink) => apply(&mut *sink),
                Err(_) => warn!(index, operation, "fan-out member busy; skipped"),
            }
        }
    }
}
