use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::sync::{Mutex, OnceLock};

use adc_builder::EnvSource;
use tracing::debug;

use crate::error::PublishError;
use crate::options::{OptionSpec, ResolvedOptions};
use crate::publisher::Delivery;

const OPTIONS: &[OptionSpec] = &[OptionSpec {
    key: "IDENT",
    default: "adc",
    description: "identifier prefixed to each syslog message",
}];

// openlog keeps the ident pointer in process-global state that outlives any
// one sink, so idents are interned for the life of the process.
fn intern(ident: CString) -> &'static CStr {
    static IDENTS: OnceLock<Mutex<BTreeMap<CString, &'static CStr>>> = OnceLock::new();
    let mut idents = IDENTS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *idents
        .entry(ident.clone())
        .or_insert_with(|| &*Box::leak(ident.into_boxed_c_str()))
}

/// Sends each document as one `LOG_USER | LOG_INFO` syslog message.
#[derive(Debug, Default)]
pub struct SyslogDelivery {
    ident: Option<&'static CStr>,
    open: bool,
}

impl Delivery for SyslogDelivery {
    const NAME: &'static str = "syslog";

    fn options() -> &'static [OptionSpec] {
        OPTIONS
    }

    fn apply(&mut self, options: &ResolvedOptions, _: &dyn EnvSource) -> Result<(), PublishError> {
        let ident = options.get("IDENT").unwrap_or_default();
        let ident = CString::new(ident).map_err(|_| PublishError::InvalidOption {
            key: "IDENT".to_string(),
            value: ident.to_string(),
        })?;
        self.ident = Some(intern(ident));
        Ok(())
    }

    fn open(&mut self) -> Result<(), PublishError> {
        let ident = self.ident.map_or(std::ptr::null(), CStr::as_ptr);
        // SAFETY: ident is null or an interned string that is never freed.
        unsafe { libc::openlog(ident, libc::LOG_PID, libc::LOG_USER) };
        self.open = true;
        debug!("syslog sink opened");
        Ok(())
    }

    fn deliver(&mut self, payload: &str) -> Result<(), PublishError> {
        let message = CString::new(payload)
            .map_err(|_| PublishError::Delivery("document contains a NUL byte".to_string()))?;
        // SAFETY: both pointers are valid NUL-terminated strings; the "%s"
        // format consumes exactly one string argument.
        unsafe {
            libc::syslog(
                libc::LOG_USER | libc::LOG_INFO,
                b"%s\0".as_ptr().cast(),
                message.as_ptr(),
            )
        };
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            // SAFETY: closelog has no preconditions.
            unsafe { libc::closelog() };
            self.open = false;
        }
    }
}

impl Drop for SyslogDelivery {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idents_are_interned_once() {
        let first = intern(CString::new("adc-intern").unwrap());
        let second = intern(CString::new("adc-intern").unwrap());
        assert_eq!(first.as_ptr(), second.as_ptr());
        assert_eq!(first.to_str(), Ok("adc-intern"));
    }

    #[test]
    fn dropping_an_open_delivery_closes_it() {
        let mut delivery = SyslogDelivery {
            ident: Some(intern(CString::new("adc-drop").unwrap())),
            open: false,
        };
        delivery.open().unwrap();
        assert!(delivery.open);
        let ident = delivery.ident;
        drop(delivery);
        assert_eq!(ident.map(CStr::to_bytes), Some(&b"adc-drop"[..]));
    }
}
