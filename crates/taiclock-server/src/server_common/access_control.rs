// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Name of the optional file holding the listen port.
pub const PORT_FILE: &str = "port";
/// Marker that authorizes every source.
pub const ALLOW_ALL_MARKER: &str = "0";

/// Filesystem-marker access control.
///
/// With no directory configured every source is authorized. Otherwise a
/// source is authorized if the directory holds a file named `0`, one of its
/// IPv4 network prefixes (`a`, `a.b`, `a.b.c`), or its exact address string.
/// Marker files are looked up on every check; nothing is cached.
#[derive(Clone, Debug, Default)]
pub struct AccessControl {
    dir: Option<PathBuf>,
}

impl AccessControl {
    /// Create an access control rooted at `dir`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        AccessControl { dir }
    }

    /// The configured ACL directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Resolve the listen port from the `port` file, falling back to
    /// `default_port` on any problem.
    ///
    /// The file holds one decimal number in `1..=65535`, optionally preceded
    /// by `:`; surrounding whitespace is ignored.
    pub fn resolve_port(&self, default_port: u16) -> u16 {
        let Some(dir) = &self.dir else {
            return default_port;
        };
        let Some(path) = resolve_inside(dir, PORT_FILE) else {
            debug!(dir = %dir.display(), "no usable port file, using default {default_port}");
            return default_port;
        };
        match fs::read_to_string(&path) {
            Ok(contents) => parse_port(&contents).unwrap_or_else(|| {
                debug!(path = %path.display(), "invalid port file, using default {default_port}");
                default_port
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read port file");
                default_port
            }
        }
    }

    /// Check whether `source` may receive responses.
    ///
    /// IPv4-mapped IPv6 addresses are treated as IPv4.
    pub fn is_authorized(&self, source: IpAddr) -> bool {
        let Some(dir) = &self.dir else {
            return true;
        };
        if marker_exists(dir, ALLOW_ALL_MARKER) {
            return true;
        }
        let source = source.to_canonical();
        if let IpAddr::V4(v4) = source {
            let [a, b, c, _] = v4.octets();
            let prefixes = [
                a.to_string(),
                format!("{a}.{b}"),
                format!("{a}.{b}.{c}"),
            ];
            if prefixes.iter().any(|p| marker_exists(dir, p)) {
                return true;
            }
        }
        let allowed = marker_exists(dir, &source.to_string());
        if !allowed {
            trace!(%source, "no ACL marker for source");
        }
        allowed
    }
}

/// Marker names may only contain characters that appear in textual IP
/// addresses.
fn is_valid_marker_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '.' || c == ':')
}

fn marker_exists(dir: &Path, name: &str) -> bool {
    is_valid_marker_name(name) && resolve_inside(dir, name).is_some()
}

/// Canonicalize `dir/name` and return it only if it exists and stays
/// inside `dir`.
fn resolve_inside(dir: &Path, name: &str) -> Option<PathBuf> {
    let root = dir.canonicalize().ok()?;
    let path = root.join(name).canonicalize().ok()?;
    path.starts_with(&root).then_some(path)
}

fn parse_port(contents: &str) -> Option<u16> {
    let trimmed = contents.trim();
    let digits = trimmed.strip_prefix(':').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u16>().ok().filter(|&port| port != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn acl_with(markers: &[&str]) -> (TempDir, AccessControl) {
        let dir = TempDir::new().unwrap();
        for m in markers {
            fs::write(dir.path().join(m), b"").unwrap();
        }
        let ac = AccessControl::new(Some(dir.path().to_path_buf()));
        (dir, ac)
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_dir_allows_all_and_uses_default_port() {
        let ac = AccessControl::new(None);
        assert!(ac.is_authorized(ip("203.0.113.9")));
        assert!(ac.is_authorized(ip("2001:db8::1")));
        assert_eq!(ac.resolve_port(4014), 4014);
    }

    #[test]
    fn test_empty_dir_denies() {
        let (_dir, ac) = acl_with(&[]);
        assert!(!ac.is_authorized(ip("10.0.0.5")));
        assert!(!ac.is_authorized(ip("::1")));
    }

    #[test]
    fn test_allow_all_marker() {
        let (_dir, ac) = acl_with(&["0"]);
        assert!(ac.is_authorized(ip("10.0.0.5")));
        assert!(ac.is_authorized(ip("2001:db8::1")));
    }

    #[test]
    fn test_network_prefix_markers() {
        let (_dir, ac) = acl_with(&["192"]);
        assert!(ac.is_authorized(ip("192.168.1.100")));
        assert!(!ac.is_authorized(ip("193.168.1.100")));

        let (_dir, ac) = acl_with(&["192.168"]);
        assert!(ac.is_authorized(ip("192.168.7.7")));
        assert!(!ac.is_authorized(ip("192.169.7.7")));

        let (_dir, ac) = acl_with(&["192.168.1"]);
        assert!(ac.is_authorized(ip("192.168.1.100")));
        assert!(!ac.is_authorized(ip("192.168.2.100")));
    }

    #[test]
    fn test_all_prefix_markers_present() {
        let (_dir, ac) = acl_with(&["192", "192.168", "192.168.1"]);
        assert!(ac.is_authorized(ip("192.168.1.100")));
    }

    #[test]
    fn test_exact_address_marker() {
        let (_dir, ac) = acl_with(&["10.0.0.5"]);
        assert!(ac.is_authorized(ip("10.0.0.5")));
        assert!(!ac.is_authorized(ip("10.0.0.6")));
    }

    #[test]
    fn test_exact_ipv6_marker() {
        let (_dir, ac) = acl_with(&["2001:db8::1"]);
        assert!(ac.is_authorized(ip("2001:db8::1")));
        assert!(!ac.is_authorized(ip("2001:db8::2")));
    }

    #[test]
    fn test_ipv4_mapped_source_uses_ipv4_markers() {
        let (_dir, ac) = acl_with(&["127.0.0.1"]);
        assert!(ac.is_authorized(ip("::ffff:127.0.0.1")));
    }

    #[test]
    fn test_marker_directory_counts() {
        let (dir, ac) = acl_with(&[]);
        fs::create_dir(dir.path().join("10")).unwrap();
        assert!(ac.is_authorized(ip("10.1.2.3")));
    }

    #[test]
    fn test_invalid_marker_names_fail_closed() {
        assert!(!is_valid_marker_name(""));
        assert!(!is_valid_marker_name("../etc"));
        assert!(!is_valid_marker_name("a/b"));
        assert!(!is_valid_marker_name("port"));
        assert!(is_valid_marker_name("fe80::1"));
        assert!(is_valid_marker_name("10.0.0.1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("target"), b"").unwrap();
        fs::write(outside.path().join("port"), b"5000\n").unwrap();

        let (dir, ac) = acl_with(&[]);
        std::os::unix::fs::symlink(outside.path().join("target"), dir.path().join("10.0.0.5"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("port"), dir.path().join("port")).unwrap();

        assert!(!ac.is_authorized(ip("10.0.0.5")));
        assert_eq!(ac.resolve_port(4014), 4014);
    }

    #[test]
    fn test_missing_dir_fails_closed() {
        let dir = TempDir::new().unwrap();
        let ac = AccessControl::new(Some(dir.path().join("missing")));
        assert!(!ac.is_authorized(ip("10.0.0.5")));
        assert_eq!(ac.resolve_port(4014), 4014);
    }

    #[test]
    fn test_resolve_port_from_file() {
        let (dir, ac) = acl_with(&[]);
        fs::write(dir.path().join("port"), b"  :8123\n").unwrap();
        assert_eq!(ac.resolve_port(4014), 8123);
        fs::write(dir.path().join("port"), b"65535").unwrap();
        assert_eq!(ac.resolve_port(4014), 65535);
    }

    #[test]
    fn test_resolve_port_falls_back() {
        let (dir, ac) = acl_with(&[]);
        assert_eq!(ac.resolve_port(4014), 4014);
        for bad in ["", "0", "65536", "abc", "+80", "::80", "80 81"] {
            fs::write(dir.path().join("port"), bad).unwrap();
            assert_eq!(ac.resolve_port(4014), 4014, "contents {bad:?}");
        }
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("1"), Some(1));
        assert_eq!(parse_port(":4014\n"), Some(4014));
        assert_eq!(parse_port(":"), None);
        assert_eq!(parse_port("-1"), None);
    }
}
