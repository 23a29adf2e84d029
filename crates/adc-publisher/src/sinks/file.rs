use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use adc_builder::EnvSource;
use tracing::debug;

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;

const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        key: "DIRECTORY",
        default: ".",
        description: "directory holding the log file; created if missing",
    },
    OptionSpec {
        key: "FILE",
        default: "adc.file_plugin.log",
        description: "log file name",
    },
    OptionSpec {
        key: "APPEND",
        default: "true",
        description: "append to an existing file instead of truncating it",
    },
];

/// Appends each document as one line to a single file, flushing per line.
#[derive(Debug, Default)]
pub struct FileDelivery {
    path: PathBuf,
    append: bool,
    file: Option<File>,
}

impl FileDelivery {
    /// Target file, once configured.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Delivery for FileDelivery {
    const NAME: &'static str = "file";

    fn options() -> &'static [OptionSpec] {
        OPTIONS
    }

    fn apply(&mut self, options: &ResolvedOptions, _: &dyn EnvSource) -> Result<(), PublishError> {
        let directory = options.get_path("DIRECTORY").unwrap_or_else(|| PathBuf::from("."));
        let file = options.get("FILE").unwrap_or_default();
        if file.is_empty() {
            return Err(PublishError::InvalidOption {
                key: "FILE".to_string(),
                value: String::new(),
            });
        }
        self.path = directory.join(file);
        self.append = options.get_bool("APPEND")?;
        Ok(())
    }

    fn open(&mut self) -> Result<(), PublishError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PublishError::resource(format!("creating {}", parent.display()), e)
            })?;
        }
        let mut open = OpenOptions::new();
        if self.append {
            open.create(true).append(true);
        } else {
            open.create(true).write(true).truncate(true);
        }
        let file = open
            .open(&self.path)
            .map_err(|e| PublishError::resource(format!("opening {}", self.path.display()), e))?;
        debug!(path = %self.path.display(), append = self.append, "file sink opened");
        self.file = Some(file);
        Ok(())
    }

    fn deliver(&mut self, payload: &str) -> Result<(), PublishError> {
        write_line(self.file.as_mut(), &self.path, payload)
    }

    fn close(&mut self) {
        self.file = None;
    }
}

/// Writes `payload` and a newline to `file`, then flushes.
pub(crate) fn write_line(
    file: Option<&mut File>,
    path: &Path,
    payload: &str,
) -> Result<(), PublishError> {
    let file = file.ok_or_else(|| PublishError::Delivery(format!("{} is not open", path.display())))?;
    writeln!(file, "{payload}")
        .and_then(|()| file.flush())
        .map_err(|e| PublishError::resource(format!("writing {}", path.display()), e))
}
