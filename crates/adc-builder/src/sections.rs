use std::collections::BTreeMap;
use std::ops::{BitOr, BitOrAssign};

use adc_types::TimePair;
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::document::Document;
use crate::env::{split_list, EnvSource};
use crate::system;
use crate::API_VERSION;

/// Environment variable listing (colon-separated) the variables copied into
/// `host.env`.
pub const HOST_ENV_LIST_VAR: &str = "ADC_HOST_SECTION_ENV";

const WORKFLOW_SECTION: &str = "adc_workflow";
const WORKFLOW_CHILDREN: &str = "wfid_children";

const SLURM_VARS: [(&str, &str); 4] = [
    ("cluster", "SLURM_CLUSTER_NAME"),
    ("job_id", "SLURM_JOB_ID"),
    ("num_nodes", "SLURM_JOB_NUM_NODES"),
    ("dependency", "SLURM_JOB_DEPENDENCY"),
];

const GITLAB_CI_VARS: [&str; 12] = [
    "CI_RUNNER_ID",
    "CI_RUNNER_VERSION",
    "CI_PROJECT_ID",
    "CI_PROJECT_NAME",
    "CI_SERVER_FQDN",
    "CI_SERVER_VERSION",
    "CI_JOB_ID",
    "CI_JOB_STARTED_AT",
    "CI_PIPELINE_ID",
    "CI_PIPELINE_SOURCE",
    "CI_COMMIT_SHA",
    "GITLAB_USER_LOGIN",
];

/// Subsections of `host` to collect, combined with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HostSections(u32);

impl HostSections {
    /// Host name only.
    pub const BASE: HostSections = HostSections(0);
    /// Kernel family, version, release, and architecture.
    pub const OS: HostSections = HostSections(0x1);
    /// Total installed memory.
    pub const RAMSIZE: HostSections = HostSections(0x2);
    /// Variables named in `ADC_HOST_SECTION_ENV`.
    pub const ENV: HostSections = HostSections(0x4);
    /// Everything above.
    pub const ALL: HostSections = HostSections(0x7);

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: HostSections) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for HostSections {
    type Output = HostSections;

    fn bitor(self, rhs: HostSections) -> HostSections {
        HostSections(self.0 | rhs.0)
    }
}

impl BitOrAssign for HostSections {
    fn bitor_assign(&mut self, rhs: HostSections) {
        self.0 |= rhs.0;
    }
}

impl Document {
    /// Adds `header`: application name, builder version, timestamps, and user.
    pub fn add_header_section(&self, application: &str, env: &dyn EnvSource) {
        let header = Document::new();
        header.add("application", application);
        header.add("builder_version", API_VERSION);
        header.add(
            "datestr",
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        );
        header.add_timespec("time", TimePair::timespec_now());
        header.add("uid", system::uid());
        if let Some(user) = system::user_name(env) {
            header.add("user", user);
        }
        self.add_section("header", &header);
    }

    /// Adds `host` with the subsections selected by `flags`.
    pub fn add_host_section(&self, flags: HostSections, env: &dyn EnvSource) {
        let host = Document::new();
        if let Some(name) = system::hostname() {
            host.add("name", name);
        }
        if flags.contains(HostSections::OS) {
            if let Some(os) = system::uname() {
                host.add("os_family", os.sysname);
                host.add("os_version", os.version);
                host.add("os_release", os.release);
                host.add("os_arch", os.machine);
            }
        }
        if flags.contains(HostSections::RAMSIZE) {
            if let Some(total) = system::read_meminfo().and_then(|m| m.get("MemTotal").copied()) {
                host.add("mem_total", total);
            }
        }
        if flags.contains(HostSections::ENV) {
            let vars = Document::new();
            let listed = env.var(HOST_ENV_LIST_VAR).unwrap_or_default();
            for key in split_list(&listed) {
                if let Some(value) = env.var(&key) {
                    vars.add(&key, value);
                }
            }
            host.add_section("env", &vars);
        }
        self.add_section("host", &host);
    }

    /// Attaches caller-defined data as `app_data`.
    pub fn add_app_data_section(&self, app_data: &Document) {
        self.add_section("app_data", app_data);
    }

    /// Attaches run-time model configuration as `model_data`.
    pub fn add_model_data_section(&self, model_data: &Document) {
        self.add_section("model_data", model_data);
    }

    /// Attaches build or install options as `code_configuration`.
    pub fn add_code_configuration_section(&self, build_details: &Document) {
        self.add_section("code_configuration", build_details);
    }

    /// Adds `code`: the caller's tag, this executable, its pid, and the
    /// `version` and `code_details` children.
    pub fn add_code_section(&self, tag: &str, version: &Document, details: &Document) {
        let code = Document::new();
        code.add("tag", tag);
        if let Some(program) = system::executable_path() {
            code.add_path("program", program);
        }
        code.add("pid", std::process::id());
        code.add_section("version", version);
        code.add_section("code_details", details);
        self.add_section("code", &code);
    }

    /// Adds `exit_data` with the return code, a status line, and details.
    pub fn add_exit_data_section(&self, return_code: i32, status: &str, details: &Document) {
        let exit = Document::new();
        exit.add("return_code", return_code);
        exit.add("status", status);
        exit.add_section("status_details", details);
        self.add_section("exit_data", &exit);
    }

    /// Adds `memory_usage` from `/proc/meminfo`, in the style of `free(1)`.
    ///
    /// The section is added empty when the file cannot be read.
    pub fn add_memory_usage_section(&self) {
        let usage = Document::new();
        match system::read_meminfo() {
            Some(meminfo) => fill_memory_usage(&usage, &meminfo),
            None => debug!(path = system::MEMINFO_PATH, "memory statistics unavailable"),
        }
        self.add_section("memory_usage", &usage);
    }

    /// Adds `adc_workflow` from `ADC_WFID`, `ADC_WFID_PARENT`, and `ADC_WFID_PATH`.
    pub fn add_workflow_section(&self, env: &dyn EnvSource) {
        let workflow = Document::new();
        for (field, var) in [
            ("wfid", "ADC_WFID"),
            ("wfid_parent", "ADC_WFID_PARENT"),
            ("wfid_path", "ADC_WFID_PATH"),
        ] {
            if let Some(value) = env.var(var) {
                workflow.add(field, value);
            }
        }
        self.add_section(WORKFLOW_SECTION, &workflow);
    }

    /// Appends ids to `adc_workflow.wfid_children`, skipping ones already listed.
    ///
    /// Does nothing unless [`Document::add_workflow_section`] ran first.
    pub fn add_workflow_children<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(workflow) = self.get_section(WORKFLOW_SECTION) else {
            debug!("no adc_workflow section; workflow children dropped");
            return;
        };
        let mut children: Vec<String> = workflow
            .get_value(WORKFLOW_CHILDREN)
            .get_array::<String>()
            .unwrap_or_default();
        for id in ids {
            let id = id.into();
            if !children.contains(&id) {
                children.push(id);
            }
        }
        workflow.add_array(WORKFLOW_CHILDREN, children, Some("vector"));
    }

    /// Adds `slurm` from the standard job variables plus `extra` ones.
    ///
    /// Extra variables are stored under their lower-cased names; unset
    /// variables are omitted.
    pub fn add_slurm_section(&self, env: &dyn EnvSource, extra: &[&str]) {
        let slurm = Document::new();
        for (field, var) in SLURM_VARS {
            if let Some(value) = env.var(var) {
                slurm.add(field, value);
            }
        }
        for var in extra {
            if let Some(value) = env.var(var) {
                slurm.add(&var.to_lowercase(), value);
            }
        }
        self.add_section("slurm", &slurm);
    }

    /// Adds `gitlab_ci` from the runner, project, job, and pipeline variables.
    pub fn add_gitlab_ci_section(&self, env: &dyn EnvSource) {
        let ci = Document::new();
        for var in GITLAB_CI_VARS {
            if let Some(value) = env.var(var) {
                ci.add(&var.to_lowercase(), value);
            }
        }
        self.add_section("gitlab_ci", &ci);
    }
}

fn fill_memory_usage(usage: &Document, meminfo: &BTreeMap<String, u64>) {
    let get = |key: &str| meminfo.get(key).copied();
    let total = get("MemTotal");
    let free = get("MemFree");
    let buffers = get("Buffers");
    let cache = get("Cached").map(|c| c + get("SReclaimable").unwrap_or(0));
    let swap_total = get("SwapTotal");
    let swap_free = get("SwapFree");

    let used = match (total, free) {
        (Some(total), Some(free)) => Some(
            total
                .saturating_sub(free)
                .saturating_sub(buffers.unwrap_or(0))
                .saturating_sub(cache.unwrap_or(0)),
        ),
        _ => None,
    };
    let swap_used = match (swap_total, swap_free) {
        (Some(total), Some(free)) => Some(total.saturating_sub(free)),
        _ => None,
    };

    for (name, value) in [
        ("mem_total", total),
        ("mem_used", used),
        ("mem_free", free),
        ("mem_shared", get("Shmem")),
        ("mem_buffers", buffers),
        ("mem_cache", cache),
        ("mem_available", get("MemAvailable")),
        ("swap_total", swap_total),
        ("swap_used", swap_used),
        ("swap_free", swap_free),
    ] {
        if let Some(kib) = value {
            usage.add(name, kib);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_flags_combine() {
        let flags = HostSections::OS | HostSections::ENV;
        assert!(flags.contains(HostSections::OS));
        assert!(!flags.contains(HostSections::RAMSIZE));
        assert!(HostSections::ALL.contains(flags));
    }

    #[test]
    fn memory_usage_follows_free() {
        let meminfo = system::parse_meminfo(
            "MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 200 kB\n\
             SReclaimable: 50 kB\nShmem: 10 kB\nMemAvailable: 600 kB\n\
             SwapTotal: 400 kB\nSwapFree: 300 kB\n",
        );
        let usage = Document::new();
        fill_memory_usage(&usage, &meminfo);
        assert_eq!(usage.get_value("mem_cache").get::<u64>(), Some(250));
        assert_eq!(usage.get_value("mem_used").get::<u64>(), Some(600));
        assert_eq!(usage.get_value("swap_used").get::<u64>(), Some(100));
        assert_eq!(usage.get_field_names().len(), 10);
    }

    #[test]
    fn memory_usage_omits_what_is_missing() {
        let meminfo = BTreeMap::from([("MemTotal".to_string(), 8u64)]);
        let usage = Document::new();
        fill_memory_usage(&usage, &meminfo);
        assert_eq!(usage.get_field_names(), vec!["mem_total"]);
    }
}
