//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated host name.
///
/// The host is a bare URL authority without scheme, port, path, query or
/// fragment: `api.example.com`, `localhost`, `127.0.0.1` or `[::1]`.
///
/// # Serialization
///
/// `Host` serializes to and deserializes from its string form, validating on
/// the way in:
///
/// ```rust
/// use http_relay::Host;
///
/// let host: Host = serde_json::from_str(r#""api.example.com""#).unwrap();
/// assert_eq!(host.as_ref(), "api.example.com");
/// assert!(serde_json::from_str::<Host>(r#""https://api.example.com""#).is_err());
/// ```
///
/// # Example
///
/// ```rust
/// use http_relay::{ConfigError, Host};
///
/// let host = Host::new("  api.example.com ").unwrap();
/// assert_eq!(host.as_ref(), "api.example.com");
///
/// assert!(matches!(Host::new(""), Err(ConfigError::EmptyHost)));
/// assert!(matches!(Host::new("api.example.com/v1"), Err(ConfigError::InvalidHost { .. })));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Host(String);

impl Host {
    /// Creates a new validated host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyHost`] if the host is empty and
    /// [`ConfigError::InvalidHost`] if it is not a bare authority.
    pub fn new(host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into();
        let host = host.trim();

        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        if !Self::is_bare_authority(host) {
            return Err(ConfigError::InvalidHost {
                host: host.to_string(),
            });
        }

        Ok(Self(host.to_string()))
    }

    fn is_bare_authority(host: &str) -> bool {
        if host.contains(['/', '?', '#', '@']) || host.chars().any(char::is_whitespace) {
            return false;
        }

        // `https` elides `:443` when parsing, so ports are rejected up front.
        // Only an IPv6 literal may contain `:`, and nothing may follow it.
        let malformed = match host.strip_prefix('[') {
            Some(rest) => rest.split_once(']').map_or(true, |(_, tail)| !tail.is_empty()),
            None => host.contains(':'),
        };
        if malformed {
            return false;
        }

        Url::parse(&format!("https://{host}")).is_ok_and(|url| {
            url.host_str().is_some_and(|h| !h.is_empty()) && url.port().is_none()
        })
    }
}

impl AsRef<str> for Host {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Host {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Host {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_rejects_empty_string() {
        assert!(matches!(Host::new(""), Err(ConfigError::EmptyHost)));
        assert!(matches!(Host::new("   "), Err(ConfigError::EmptyHost)));
    }

    #[test]
    fn test_host_accepts_common_forms() {
        for host in ["api.github.com", "localhost", "127.0.0.1", "[::1]"] {
            assert!(Host::new(host).is_ok(), "{host} should be accepted");
        }
    }

    #[test]
    fn test_host_rejects_scheme_path_and_port() {
        for host in [
            "https://api.github.com",
            "api.github.com/search",
            "api.github.com?x=1",
            "localhost:8080",
            "localhost:443",
            "api.github.com:",
            "[::1]:443",
            "[::1",
            "user@host",
            "exa mple.com",
        ] {
            assert!(
                matches!(Host::new(host), Err(ConfigError::InvalidHost { .. })),
                "{host} should be rejected"
            );
        }
    }

    #[test]
    fn test_host_serde_round_trip() {
        let host = Host::new("api.example.com").unwrap();
        let json = serde_json::to_string(&host).unwrap();
        assert_eq!(json, r#""api.example.com""#);
        let back: Host = serde_json::from_str(&json).unwrap();
        assert_eq!(back, host);
    }
}
