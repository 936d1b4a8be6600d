// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for the TAICLOCK server.
//!
//! Public APIs return `io::Result<T>`. Internally, startup failures are
//! constructed as [`TaiServerError`] variants and converted to `io::Error`
//! via `From<TaiServerError> for io::Error`, so callers that need to tell a
//! bind failure from a configuration problem can downcast:
//!
//! ```no_run
//! use tai_server::error::TaiServerError;
//!
//! # fn example(result: std::io::Result<()>) {
//! if let Err(e) = result {
//!     match e.get_ref().and_then(|inner| inner.downcast_ref::<TaiServerError>()) {
//!         Some(TaiServerError::Bind { addr, .. }) => eprintln!("cannot bind {addr}"),
//!         Some(other) => eprintln!("server error: {other}"),
//!         None => eprintln!("I/O error: {e}"),
//!     }
//! }
//! # }
//! ```

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Errors that can stop the TAICLOCK server from starting.
///
/// Nothing on the per-packet path produces one of these: malformed,
/// unauthorized, or rate-limited datagrams are dropped silently.
#[derive(Debug)]
pub enum TaiServerError {
    /// Invalid configuration.
    Config(ConfigError),
    /// The listening socket could not be bound.
    Bind {
        /// Address the server tried to bind.
        addr: SocketAddr,
        /// Underlying socket error.
        source: io::Error,
    },
    /// Underlying I/O error.
    Io(io::Error),
}

/// Server configuration errors.
#[derive(Clone, Debug)]
pub enum ConfigError {
    /// The configured ACL path is missing or is not a directory.
    NotADirectory {
        /// The configured path.
        path: String,
    },
}

impl fmt::Display for TaiServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaiServerError::Config(e) => write!(f, "TAICLOCK server config error: {e}"),
            TaiServerError::Bind { addr, source } => {
                write!(f, "failed to bind {addr}: {source}")?;
                if source.kind() == io::ErrorKind::PermissionDenied {
                    write!(
                        f,
                        " (try running as root or use a port >= 1024; \
                         the port can be set in the 'port' file of the ACL directory)"
                    )?;
                }
                Ok(())
            }
            TaiServerError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotADirectory { path } => {
                write!(f, "ACL path '{path}' is missing or not a directory")
            }
        }
    }
}

impl std::error::Error for TaiServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaiServerError::Bind { source, .. } => Some(source),
            TaiServerError::Io(e) => Some(e),
            TaiServerError::Config(_) => None,
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<TaiServerError> for io::Error {
    fn from(err: TaiServerError) -> io::Error {
        let kind = match &err {
            TaiServerError::Config(_) => io::ErrorKind::InvalidInput,
            TaiServerError::Bind { source, .. } => source.kind(),
            TaiServerError::Io(e) => e.kind(),
        };
        if let TaiServerError::Io(e) = err {
            return e;
        }
        io::Error::new(kind, err)
    }
}

impl From<io::Error> for TaiServerError {
    fn from(err: io::Error) -> TaiServerError {
        TaiServerError::Io(err)
    }
}

impl From<ConfigError> for TaiServerError {
    fn from(err: ConfigError) -> TaiServerError {
        TaiServerError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "0.0.0.0:4014".parse().unwrap()
    }

    #[test]
    fn test_bind_permission_denied_has_hint() {
        let err = TaiServerError::Bind {
            addr: addr(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to bind 0.0.0.0:4014"));
        assert!(msg.contains("port >= 1024"));
    }

    #[test]
    fn test_bind_in_use_has_no_hint() {
        let err = TaiServerError::Bind {
            addr: addr(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(!err.to_string().contains("root"));
    }

    #[test]
    fn test_config_error_display() {
        let err = TaiServerError::from(ConfigError::NotADirectory {
            path: "/etc/passwd".into(),
        });
        assert_eq!(
            err.to_string(),
            "TAICLOCK server config error: ACL path '/etc/passwd' is missing or not a directory"
        );
    }

    #[test]
    fn test_into_io_error_preserves_kind_and_downcasts() {
        let err = TaiServerError::Bind {
            addr: addr(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::AddrInUse);
        let inner = io_err
            .get_ref()
            .and_then(|e| e.downcast_ref::<TaiServerError>());
        assert!(matches!(inner, Some(TaiServerError::Bind { .. })));

        let io_err: io::Error = TaiServerError::Config(ConfigError::NotADirectory {
            path: "/nonexistent".into(),
        })
        .into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_io_variant_unwraps() {
        let original = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let io_err: io::Error = TaiServerError::Io(original).into();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionReset);
        assert!(io_err.get_ref().is_some_and(|e| e.downcast_ref::<TaiServerError>().is_none()));
    }
}
