//! Typed startup configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::DomainError;

/// Validated startup parameters for a [`Server`](crate::Server).
///
/// Constructed once by the composition root (typically from environment
/// variables, which are the caller's concern) and passed into
/// [`Server::new`](crate::Server::new). Read-only from that point on — there
/// is no process-wide mutable default to fall back to.
#[derive(Clone, Debug)]
pub struct Config {
    /// TCP port to listen on. Required.
    pub port: String,

    /// Read/write/drain timeout in seconds. Required, must be non-zero.
    /// Also bounds the graceful-shutdown drain.
    pub timeout_secs: u64,

    /// Directory to serve static files from under `/static`.
    /// `None` disables static serving.
    pub static_dir: Option<PathBuf>,

    /// Enables debug-level logging in [`logging::init`](crate::logging::init).
    pub debug: bool,
}

impl Config {
    /// Precondition check run before the listening socket is opened.
    ///
    /// Names every missing field at once (`port`, `timeout`) rather than
    /// failing on the first, so a misconfigured deployment needs a single
    /// round-trip to fix.
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        let mut missing = Vec::new();

        if self.port.is_empty() {
            missing.push("port");
        }
        if self.timeout_secs == 0 {
            missing.push("timeout");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::required_args(&missing))
        }
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::REQUIRED_ARGUMENT;

    fn base() -> Config {
        Config {
            port: "3000".to_owned(),
            timeout_secs: 30,
            static_dir: None,
            debug: false,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn missing_port_is_named() {
        let cfg = Config { port: String::new(), ..base() };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), REQUIRED_ARGUMENT);
        assert_eq!(err.message(), "missing required argument(s): port");
    }

    #[test]
    fn zero_timeout_is_named() {
        let cfg = Config { timeout_secs: 0, ..base() };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.message(), "missing required argument(s): timeout");
    }

    #[test]
    fn both_missing_fields_are_named_together() {
        let cfg = Config { port: String::new(), timeout_secs: 0, ..base() };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.message(), "missing required argument(s): port, timeout");
    }
}
