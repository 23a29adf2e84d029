use std::collections::BTreeMap;
use std::path::PathBuf;

use adc_builder::EnvSource;
use tracing::{debug, warn};

use crate::error::PublishError;

/// One configuration key a sink understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Key, upper-case by convention.
    pub key: &'static str,
    /// Value used when neither the caller nor the environment sets one.
    pub default: &'static str,
    /// Human-readable meaning.
    pub description: &'static str,
}

/// Environment prefix for a sink's options: `ADC_<NAME>_PLUGIN_`.
pub fn default_prefix(sink: &str) -> String {
    format!("ADC_{}_PLUGIN_", sink.to_uppercase())
}

/// Option values after explicit, environment, and default resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, String>,
}

impl ResolvedOptions {
    /// Resolves every key in `specs`.
    ///
    /// Each key takes the first of: the entry in `explicit`, the environment
    /// variable `<prefix><KEY>`, the built-in default. Explicit keys not in
    /// `specs` are ignored.
    pub fn resolve(
        specs: &[OptionSpec],
        explicit: &BTreeMap<String, String>,
        prefix: &str,
        env: &dyn EnvSource,
    ) -> Self {
        for key in explicit.keys() {
            if !specs.iter().any(|spec| spec.key == key.as_str()) {
                warn!(key = %key, "ignoring unknown option");
            }
        }
        let values = specs
            .iter()
            .map(|spec| {
                let value = match explicit.get(spec.key) {
                    Some(value) => value.clone(),
                    None => {
                        let var = format!("{prefix}{}", spec.key);
                        env.var(&var).unwrap_or_else(|| spec.default.to_string())
                    }
                };
                debug!(key = spec.key, value = %value, "option resolved");
                (spec.key.to_string(), value)
            })
            .collect();
        Self { values }
    }

    /// Resolved value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Resolved value of `key` read as a flag.
    ///
    /// Accepts `true/false`, `yes/no`, `on/off`, and `1/0`, ignoring case.
    pub fn get_bool(&self, key: &str) -> Result<bool, PublishError> {
        let raw = self.get(key).unwrap_or_default();
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(PublishError::InvalidOption {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Resolved value of `key` as a path; empty values read as unset.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Resolved pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_builder::ProcessEnv;

    const SPECS: &[OptionSpec] = &[
        OptionSpec {
            key: "DIRECTORY",
            default: ".",
            description: "where",
        },
        OptionSpec {
            key: "APPEND",
            default: "true",
            description: "append or truncate",
        },
    ];

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn explicit_then_environment_then_default() {
        let env = map(&[
            ("ADC_FILE_PLUGIN_DIRECTORY", "/from/env"),
            ("ADC_FILE_PLUGIN_APPEND", "false"),
        ]);
        let explicit = map(&[("APPEND", "no")]);
        let resolved = ResolvedOptions::resolve(SPECS, &explicit, &default_prefix("file"), &env);
        assert_eq!(resolved.get("DIRECTORY"), Some("/from/env"));
        assert!(!resolved.get_bool("APPEND").unwrap());

        let defaults = ResolvedOptions::resolve(SPECS, &BTreeMap::new(), "X_", &env);
        assert_eq!(defaults.get("DIRECTORY"), Some("."));
        assert!(defaults.get_bool("APPEND").unwrap());
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let explicit = map(&[("COLOR", "blue")]);
        let resolved = ResolvedOptions::resolve(SPECS, &explicit, "X_", &ProcessEnv);
        assert_eq!(resolved.get("COLOR"), None);
        assert_eq!(resolved.iter().count(), 2);
    }

    #[test]
    fn malformed_flags_are_rejected() {
        let explicit = map(&[("APPEND", "sometimes")]);
        let resolved = ResolvedOptions::resolve(SPECS, &explicit, "X_", &ProcessEnv);
        let err = resolved.get_bool("APPEND").unwrap_err();
        assert!(matches!(err, PublishError::InvalidOption { ref value, .. } if value == "sometimes"));
    }

    #[test]
    fn prefix_is_upper_cased() {
        assert_eq!(default_prefix("multifile"), "ADC_MULTIFILE_PLUGIN_");
    }
}
