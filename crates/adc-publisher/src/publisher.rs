//! The sink contract and the lifecycle state machine shared by every sink.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use adc_builder::{Document, EnvSource, ProcessEnv};
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::options::{default_prefix, OptionSpec, ResolvedOptions};

/// Lifecycle phase of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fresh or finalized; accepts `configure`.
    Unconfigured,
    /// Options applied; accepts `initialize`.
    Configured,
    /// Resource acquired; accepts `publish`.
    Ready,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Unconfigured => "unconfigured",
            Phase::Configured => "configured",
            Phase::Ready => "ready",
        })
    }
}

/// Uniform contract every sink presents to an orchestrator.
///
/// Lifecycle: `configure` → `initialize` → `publish`* → `finalize`, repeatable.
/// `pause`/`resume` are valid in any phase; a paused sink accepts and drops
/// every document.
pub trait Sink {
    /// Registry name of the sink.
    fn name(&self) -> &str;

    /// Version of the sink implementation.
    fn version(&self) -> &str;

    /// Option keys the sink understands, with their defaults.
    fn option_defaults(&self) -> &'static [OptionSpec];

    /// Applies options, reading unset keys from `ADC_<NAME>_PLUGIN_<KEY>`.
    fn configure(&mut self, options: &BTreeMap<String, String>) -> Result<(), PublishError>;

    /// Applies options, reading unset keys from `<prefix><KEY>`.
    fn configure_with_prefix(
        &mut self,
        options: &BTreeMap<String, String>,
        prefix: &str,
    ) -> Result<(), PublishError>;

    /// Acquires the sink's resource, configuring with defaults first if needed.
    fn initialize(&mut self) -> Result<(), PublishError>;

    /// Serializes and delivers one document.
    fn publish(&mut self, document: &Document) -> Result<(), PublishError>;

    /// Drops documents until [`Sink::resume`].
    fn pause(&mut self);

    /// Resumes delivery.
    fn resume(&mut self);

    /// Releases the resource and returns to [`Phase::Unconfigured`].
    fn finalize(&mut self);

    /// Current phase.
    fn phase(&self) -> Phase;

    /// Whether a failed `initialize` is pending a `finalize`.
    fn is_faulted(&self) -> bool;

    /// Whether the sink is paused.
    fn is_paused(&self) -> bool;
}

/// Shared handle to a type-erased sink.
pub type SinkHandle = Rc<RefCell<dyn Sink>>;

/// Wraps a sink in a [`SinkHandle`].
pub fn handle<S: Sink + 'static>(sink: S) -> SinkHandle {
    Rc::new(RefCell::new(sink))
}

/// The transport half of a sink: what it needs, how it opens, how it writes.
///
/// [`Publisher`] supplies the lifecycle around it, so an implementation never
/// sees a call out of order: `apply` before `open`, `deliver` only while open,
/// `close` after `open` was attempted.
pub trait Delivery {
    /// Registry name; also forms the default option prefix.
    const NAME: &'static str;

    /// Option table with built-in defaults.
    fn options() -> &'static [OptionSpec];

    /// Takes resolved option values.
    fn apply(&mut self, options: &ResolvedOptions, env: &dyn EnvSource)
        -> Result<(), PublishError>;

    /// Acquires the resource.
    fn open(&mut self) -> Result<(), PublishError>;

    /// Writes one serialized document.
    fn deliver(&mut self, payload: &str) -> Result<(), PublishError>;

    /// Releases the resource; must tolerate a failed or missing `open`.
    fn close(&mut self);
}

/// Version reported by every built-in sink.
pub const SINK_VERSION: &str = "1.0.0";

/// A [`Delivery`] driven through the sink lifecycle.
pub struct Publisher<D: Delivery> {
    delivery: D,
    phase: Phase,
    faulted: bool,
    paused: bool,
    env: Box<dyn EnvSource>,
}

impl<D: Delivery + Default> Default for Publisher<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: Delivery> Publisher<D> {
    /// A fresh sink reading option overrides from the process environment.
    pub fn new(delivery: D) -> Self {
        Self::with_env(delivery, ProcessEnv)
    }

    /// A fresh sink reading option overrides from `env`.
    pub fn with_env(delivery: D, env: impl EnvSource + 'static) -> Self {
        Self {
            delivery,
            phase: Phase::Unconfigured,
            faulted: false,
            paused: false,
            env: Box::new(env),
        }
    }

    /// The transport.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    fn not_ready(&self, operation: &'static str) -> PublishError {
        PublishError::NotReady {
            sink: D::NAME.to_string(),
            operation,
            phase: self.phase,
        }
    }
}

impl<D: Delivery> Sink for Publisher<D> {
    fn name(&self) -> &str {
        D::NAME
    }

    fn version(&self) -> &str {
        SINK_VERSION
    }

    fn option_defaults(&self) -> &'static [OptionSpec] {
        D::options()
    }

    fn configure(&mut self, options: &BTreeMap<String, String>) -> Result<(), PublishError> {
        self.configure_with_prefix(options, &default_prefix(D::NAME))
    }

    fn configure_with_prefix(
        &mut self,
        options: &BTreeMap<String, String>,
        prefix: &str,
    ) -> Result<(), PublishError> {
        if self.phase != Phase::Unconfigured {
            warn!(sink = D::NAME, phase = %self.phase, "configure rejected");
            return Err(PublishError::AlreadyConfigured(D::NAME.to_string()));
        }
        let resolved = ResolvedOptions::resolve(D::options(), options, prefix, self.env.as_ref());
        self.delivery.apply(&resolved, self.env.as_ref())?;
        self.phase = Phase::Configured;
        debug!(sink = D::NAME, "configured");
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), PublishError> {
        if self.faulted {
            warn!(sink = D::NAME, "initialize rejected; sink is faulted");
            return Err(PublishError::Faulted(D::NAME.to_string()));
        }
        if self.phase == Phase::Unconfigured {
            if let Err(error) = self.configure(&BTreeMap::new()) {
                self.faulted = true;
                warn!(sink = D::NAME, %error, "implicit configure failed; sink faulted");
                return Err(error);
            }
        }
        if self.phase != Phase::Configured {
            warn!(sink = D::NAME, phase = %self.phase, "initialize rejected");
            return Err(self.not_ready("initialize"));
        }
        match self.delivery.open() {
            Ok(()) => {
                self.phase = Phase::Ready;
                debug!(sink = D::NAME, "ready");
                Ok(())
            }
            Err(error) => {
                self.faulted = true;
                warn!(sink = D::NAME, %error, "initialize failed; sink faulted");
                Err(error)
            }
        }
    }

    fn publish(&mut self, document: &Document) -> Result<(), PublishError> {
        if self.paused {
            return Ok(());
        }
        if self.faulted {
            warn!(sink = D::NAME, "publish rejected; sink is faulted");
            return Err(PublishError::Faulted(D::NAME.to_string()));
        }
        if self.phase != Phase::Ready {
            warn!(sink = D::NAME, phase = %self.phase, "publish rejected");
            return Err(self.not_ready("publish"));
        }
        self.delivery.deliver(&document.serialize())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn finalize(&mut self) {
        if self.phase != Phase::Ready && !self.faulted {
            debug!(sink = D::NAME, phase = %self.phase, "finalize ignored");
            return;
        }
        self.delivery.close();
        self.phase = Phase::Unconfigured;
        self.faulted = false;
        self.paused = false;
        debug!(sink = D::NAME, "finalized");
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_faulted(&self) -> bool {
        self.faulted
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flaky {
        fail_open: bool,
        opened: u32,
        closed: u32,
        delivered: Vec<String>,
    }

    impl Delivery for Flaky {
        const NAME: &'static str = "flaky";

        fn options() -> &'static [OptionSpec] {
            &[OptionSpec {
                key: "FAIL",
                default: "false",
                description: "fail every open",
            }]
        }

        fn apply(
            &mut self,
            options: &ResolvedOptions,
            _env: &dyn EnvSource,
        ) -> Result<(), PublishError> {
            self.fail_open = options.get_bool("FAIL")?;
            Ok(())
        }

        fn open(&mut self) -> Result<(), PublishError> {
            self.opened += 1;
            if self.fail_open {
                return Err(PublishError::Delivery("refused".into()));
            }
            Ok(())
        }

        fn deliver(&mut self, payload: &str) -> Result<(), PublishError> {
            self.delivered.push(payload.to_string());
            Ok(())
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn failing() -> BTreeMap<String, String> {
        BTreeMap::from([("FAIL".to_string(), "true".to_string())])
    }

    #[test]
    fn initialize_configures_implicitly() {
        let mut sink = Publisher::new(Flaky::default());
        sink.initialize().unwrap();
        assert_eq!(sink.phase(), Phase::Ready);
        assert_eq!(sink.delivery().opened, 1);
    }

    #[test]
    fn second_configure_is_rejected() {
        let mut sink = Publisher::new(Flaky::default());
        sink.configure(&BTreeMap::new()).unwrap();
        let err = sink.configure(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, PublishError::AlreadyConfigured(_)));
        assert_eq!(sink.phase(), Phase::Configured);
    }

    #[test]
    fn failed_initialize_faults_until_finalize() {
        let mut sink = Publisher::new(Flaky::default());
        sink.configure(&failing()).unwrap();
        assert!(sink.initialize().is_err());
        assert!(sink.is_faulted());
        assert_eq!(sink.phase(), Phase::Configured);

        assert!(matches!(sink.initialize(), Err(PublishError::Faulted(_))));
        assert!(matches!(
            sink.publish(&Document::new()),
            Err(PublishError::Faulted(_))
        ));
        assert_eq!(sink.delivery().opened, 1);

        sink.finalize();
        assert!(!sink.is_faulted());
        assert_eq!(sink.phase(), Phase::Unconfigured);
        assert_eq!(sink.delivery().closed, 1);

        sink.initialize().unwrap();
        assert_eq!(sink.phase(), Phase::Ready);
    }

    #[test]
    fn failed_implicit_configure_faults_until_finalize() {
        let env = BTreeMap::from([("ADC_FLAKY_PLUGIN_FAIL".to_string(), "maybe".to_string())]);
        let mut sink = Publisher::with_env(Flaky::default(), env);
        assert!(matches!(
            sink.initialize(),
            Err(PublishError::InvalidOption { .. })
        ));
        assert!(sink.is_faulted());
        assert_eq!(sink.phase(), Phase::Unconfigured);

        assert!(matches!(sink.initialize(), Err(PublishError::Faulted(_))));
        assert!(matches!(
            sink.publish(&Document::new()),
            Err(PublishError::Faulted(_))
        ));
        assert_eq!(sink.delivery().opened, 0);

        sink.finalize();
        assert!(!sink.is_faulted());
        assert_eq!(sink.phase(), Phase::Unconfigured);
    }

    #[test]
    fn paused_sink_accepts_in_any_phase() {
        let mut sink = Publisher::new(Flaky::default());
        sink.pause();
        sink.pause();
        assert!(sink.publish(&Document::new()).is_ok());
        sink.resume();
        assert!(matches!(
            sink.publish(&Document::new()),
            Err(PublishError::NotReady { phase: Phase::Unconfigured, .. })
        ));
        assert!(sink.delivery().delivered.is_empty());
    }

    #[test]
    fn finalize_outside_ready_is_a_no_op() {
        let mut sink = Publisher::new(Flaky::default());
        sink.finalize();
        sink.configure(&BTreeMap::new()).unwrap();
        sink.finalize();
        assert_eq!(sink.phase(), Phase::Configured);
        assert_eq!(sink.delivery().closed, 0);
    }

    #[test]
    fn finalize_clears_pause() {
        let mut sink = Publisher::new(Flaky::default());
        sink.initialize().unwrap();
        sink.pause();
        sink.finalize();
        assert!(!sink.is_paused());
    }

    #[test]
    fn repeat_initialize_while_ready_is_rejected() {
        let mut sink = Publisher::new(Flaky::default());
        sink.initialize().unwrap();
        assert!(matches!(
            sink.initialize(),
            Err(PublishError::NotReady { operation: "initialize", phase: Phase::Ready, .. })
        ));
    }
}
