use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use adc_builder::{system, EnvSource};
use tracing::debug;

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;
use crate::sinks::file::write_line;

const OPTIONS: &[OptionSpec] = &[OptionSpec {
    key: "DIRECTORY",
    default: "./adc.multifile.d",
    description: "root of the per-user log tree; created if missing",
}];

/// Workflow directory used when `ADC_WFID` is unset.
pub const NO_WFID: &str = "no_wfid";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Writes to a file of its own under `DIRECTORY/<user>/<wfid>/`.
///
/// Each `open` picks a fresh `<host>-<pid>_<start>-<seq>.log`, so concurrent
/// processes and repeated lifecycles never share a file.
#[derive(Debug, Default)]
pub struct MultiFileDelivery {
    root: PathBuf,
    user: String,
    wfid: String,
    path: Option<PathBuf>,
    file: Option<File>,
}

impl MultiFileDelivery {
    /// File currently being written, if open.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Delivery for MultiFileDelivery {
    const NAME: &'static str = "multifile";

    fn options() -> &'static [OptionSpec] {
        OPTIONS
    }

    fn apply(&mut self, options: &ResolvedOptions, env: &dyn EnvSource) -> Result<(), PublishError> {
        self.root = options
            .get_path("DIRECTORY")
            .unwrap_or_else(|| PathBuf::from(OPTIONS[0].default));
        self.user = system::user_name(env).unwrap_or_else(|| system::uid().to_string());
        self.wfid = env
            .var("ADC_WFID")
            .filter(|wfid| !wfid.is_empty())
            .unwrap_or_else(|| NO_WFID.to_string());
        Ok(())
    }

    fn open(&mut self) -> Result<(), PublishError> {
        let directory = self.root.join(&self.user).join(&self.wfid);
        fs::create_dir_all(&directory).map_err(|e| {
            PublishError::resource(format!("creating {}", directory.display()), e)
        })?;
        let start = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let name = format!(
            "{}-{}_{}-{}.log",
            system::hostname().unwrap_or_else(|| "localhost".to_string()),
            std::process::id(),
            start,
            SEQUENCE.fetch_add(1, Ordering::Relaxed),
        );
        let path = directory.join(name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PublishError::resource(format!("opening {}", path.display()), e))?;
        debug!(path = %path.display(), "multifile sink opened");
        self.file = Some(file);
        self.path = Some(path);
        Ok(())
    }

    fn deliver(&mut self, payload: &str) -> Result<(), PublishError> {
        let path = self.path.as_deref().unwrap_or(Path::new(""));
        write_line(self.file.as_mut(), path, payload)
    }

    fn close(&mut self) {
        self.file = None;
        self.path = None;
    }
}
