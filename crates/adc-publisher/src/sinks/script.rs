use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use adc_builder::EnvSource;
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;

const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        key: "PROGRAM",
        default: "adc_publish_script",
        description: "program run as `PROGRAM <file>` for each document",
    },
    OptionSpec {
        key: "DIRECTORY",
        default: "",
        description: "scratch directory for document files; empty means the system temp dir",
    },
];

/// Hands each document to a helper program.
///
/// The document is written to a fresh scratch file and `PROGRAM <file>` is
/// launched without waiting for it; the helper owns the file afterwards.
#[derive(Debug, Default)]
pub struct ScriptDelivery {
    program: PathBuf,
    directory: PathBuf,
}

impl Delivery for ScriptDelivery {
    const NAME: &'static str = "script";

    fn options() -> &'static [OptionSpec] {
        OPTIONS
    }

    fn apply(&mut self, options: &ResolvedOptions, _: &dyn EnvSource) -> Result<(), PublishError> {
        self.program = options
            .get_path("PROGRAM")
            .ok_or_else(|| PublishError::InvalidOption {
                key: "PROGRAM".to_string(),
                value: String::new(),
            })?;
        self.directory = options
            .get_path("DIRECTORY")
            .unwrap_or_else(std::env::temp_dir);
        Ok(())
    }

    fn open(&mut self) -> Result<(), PublishError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            PublishError::resource(format!("creating {}", self.directory.display()), e)
        })
    }

    fn deliver(&mut self, payload: &str) -> Result<(), PublishError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("adc-")
            .suffix(".json")
            .tempfile_in(&self.directory)
            .map_err(|e| PublishError::resource("creating scratch file", e))?;
        writeln!(scratch, "{payload}")
            .and_then(|()| scratch.flush())
            .map_err(|e| PublishError::resource("writing scratch file", e))?;
        // From here on the file outlives this call; the helper removes it.
        let (_, path) = scratch
            .keep()
            .map_err(|e| PublishError::resource("keeping scratch file", e.error))?;

        let spawned = Command::new(&self.program)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_file(&path) {
                    debug!(path = %path.display(), error = %cleanup, "scratch file not removed");
                }
                return Err(PublishError::resource(
                    format!("launching {}", self.program.display()),
                    e,
                ));
            }
        };

        let program = self.program.display().to_string();
        let reaper = thread::Builder::new()
            .name("adc-script-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => debug!(program = %program, %status, "helper exited"),
                Err(error) => warn!(program = %program, %error, "helper wait failed"),
            });
        if let Err(error) = reaper {
            // Without a reaper the child lingers as a zombie until this process exits.
            warn!(%error, "could not start helper reaper thread");
        }
        Ok(())
    }

    fn close(&mut self) {}
}
