use std::collections::{BTreeMap, BTreeSet};

use adc_builder::{split_list, Document, EnvSource, ProcessEnv};
use tracing::warn;

use crate::error::PublishError;
use crate::fanout::FanOut;
use crate::publisher::{handle, Delivery, Publisher, SinkHandle};
use crate::sinks::{
    FileDelivery, MultiFileDelivery, NoneDelivery, ScriptDelivery, StdoutDelivery, SyslogDelivery,
};

/// Variable naming (colon-separated) the sinks of [`Factory::multi_publisher_from`]
/// when it is given no names.
pub const MULTI_PUBLISHER_NAMES_VAR: &str = "ADC_MULTI_PUBLISHER_NAMES";

const SINK_NAMES: [&str; 6] = [
    NoneDelivery::NAME,
    StdoutDelivery::NAME,
    FileDelivery::NAME,
    MultiFileDelivery::NAME,
    SyslogDelivery::NAME,
    ScriptDelivery::NAME,
];

/// Creates documents, named sinks, and fan-outs.
///
/// Sinks built here read option overrides from the factory's environment,
/// which is the process environment unless [`Factory::with_env`] says
/// otherwise.
pub struct Factory<E = ProcessEnv> {
    names: BTreeSet<String>,
    env: E,
}

impl Default for Factory<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory<ProcessEnv> {
    /// A factory reading the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }
}

impl<E: EnvSource + Clone + 'static> Factory<E> {
    /// A factory whose sinks read option overrides from `env`.
    pub fn with_env(env: E) -> Self {
        Self {
            names: SINK_NAMES.iter().map(|name| name.to_string()).collect(),
            env,
        }
    }

    /// Names accepted by [`Factory::create`].
    pub fn publisher_names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// A fresh, unconfigured sink, or `None` for an unknown name.
    pub fn create(&self, name: &str) -> Option<SinkHandle> {
        let sink = match name {
            "none" => self.wrap(NoneDelivery),
            "stdout" => self.wrap(StdoutDelivery),
            "file" => self.wrap(FileDelivery::default()),
            "multifile" => self.wrap(MultiFileDelivery::default()),
            "syslog" => self.wrap(SyslogDelivery::default()),
            "script" => self.wrap(ScriptDelivery::default()),
            _ => return None,
        };
        Some(sink)
    }

    /// A sink already configured with `options`.
    ///
    /// Returns `Ok(None)` for an unknown name.
    pub fn create_with_options(
        &self,
        name: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<Option<SinkHandle>, PublishError> {
        let Some(sink) = self.create(name) else {
            return Ok(None);
        };
        sink.borrow_mut().configure(options)?;
        Ok(Some(sink))
    }

    /// An empty fan-out.
    pub fn multi_publisher(&self) -> FanOut {
        FanOut::new()
    }

    /// A fan-out of ready sinks.
    ///
    /// With no `names`, the list is read from `ADC_MULTI_PUBLISHER_NAMES`.
    /// Each sink is configured from defaults and its environment overrides,
    /// then initialized. Unknown names are skipped; sinks that fail to
    /// initialize are still added, and stay faulted.
    pub fn multi_publisher_from(&self, names: &[String]) -> FanOut {
        let names = if names.is_empty() {
            split_list(&self.env.var(MULTI_PUBLISHER_NAMES_VAR).unwrap_or_default())
        } else {
            names.to_vec()
        };
        let mut fanout = FanOut::new();
        for name in names {
            let Some(sink) = self.create(&name) else {
                warn!(sink = %name, "unknown publisher name; skipped");
                continue;
            };
            if let Err(error) = sink.borrow_mut().initialize() {
                warn!(sink = %name, %error, "publisher not ready");
            }
            fanout.add(sink);
        }
        fanout
    }

    /// An empty document.
    pub fn builder(&self) -> Document {
        Document::new()
    }

    fn wrap<D: Delivery + 'static>(&self, delivery: D) -> SinkHandle {
        handle(Publisher::with_env(delivery, self.env.clone()))
    }
}
