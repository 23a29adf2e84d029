//! Thin wrappers over the host facts the conventional sections record.
//!
//! Every probe returns `Option`; a missing fact omits its field and never
//! fails the section.

use std::collections::BTreeMap;
use std::ffi::CStr;

use crate::env::EnvSource;

/// Path of the kernel memory statistics file.
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Kernel identification from `uname(2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uname {
    /// Operating system name, e.g. `Linux`.
    pub sysname: String,
    /// Kernel release.
    pub release: String,
    /// Kernel build version.
    pub version: String,
    /// Hardware architecture.
    pub machine: String,
}

/// Network name of this host.
pub fn hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: buf is writable for buf.len() bytes for the duration of the call.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8(buf[..end].to_vec())
        .ok()
        .filter(|name| !name.is_empty())
}

/// Kernel identification, if `uname(2)` succeeds.
pub fn uname() -> Option<Uname> {
    // SAFETY: utsname is plain old data; an all-zero value is valid.
    let mut raw: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: raw is a valid, exclusively borrowed utsname.
    if unsafe { libc::uname(&mut raw) } != 0 {
        return None;
    }
    Some(Uname {
        sysname: c_chars(&raw.sysname),
        release: c_chars(&raw.release),
        version: c_chars(&raw.version),
        machine: c_chars(&raw.machine),
    })
}

fn c_chars(chars: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Real user id of this process.
pub fn uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Login name of the user running this process.
///
/// Prefers `USER`, then `LOGNAME`, then the password database.
pub fn user_name(env: &dyn EnvSource) -> Option<String> {
    env.var("USER")
        .or_else(|| env.var("LOGNAME"))
        .filter(|name| !name.is_empty())
        .or_else(passwd_name)
}

fn passwd_name() -> Option<String> {
    // SAFETY: getpwuid returns null or a pointer to static storage that stays
    // valid until the next getpw* call; the name is copied out immediately.
    unsafe {
        let entry = libc::getpwuid(libc::getuid());
        if entry.is_null() || (*entry).pw_name.is_null() {
            return None;
        }
        CStr::from_ptr((*entry).pw_name)
            .to_str()
            .ok()
            .map(str::to_string)
    }
}

/// Absolute path of the running executable.
pub fn executable_path() -> Option<String> {
    std::env::current_exe()
        .ok()
        .map(|path| path.to_string_lossy().into_owned())
}

/// Parses `/proc/meminfo` text into `key -> KiB`.
///
/// Lines that do not have the `Key: <number> [kB]` shape are skipped.
pub fn parse_meminfo(text: &str) -> BTreeMap<String, u64> {
    text.lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let amount = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim().to_string(), amount))
        })
        .collect()
}

/// Current memory statistics, or `None` when the file is unreadable.
pub fn read_meminfo() -> Option<BTreeMap<String, u64>> {
    std::fs::read_to_string(MEMINFO_PATH)
        .ok()
        .map(|text| parse_meminfo(&text))
}
