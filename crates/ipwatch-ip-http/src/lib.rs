// # HTTP Address Resolver
//
// This crate provides an HTTP-based address resolver for ipwatch.
//
// ## Purpose
//
// Asks public "what is my IP" services for the caller's addresses:
// one endpoint for IPv4, one for IPv6. ipify-compatible services are the
// default (`api.ipify.org`, `api64.ipify.org`).
//
// ## Behavior
//
// - Both lookups run concurrently and fail independently
// - Bodies may be plain text or `{"ip": "..."}` JSON
// - The answer must parse as an address of the expected family; the
//   trimmed text is returned as-is, never re-formatted
// - A dual-stack endpoint answering with IPv4 on the IPv6 lookup means the
//   host has no IPv6 connectivity: the IPv6 field is `None`
// - Every failure becomes a `None` field with a warning log; `resolve()`
//   itself does not fail
//
// ## Architecture
//
// No retries and no caching: the next trigger is the retry.

use ipwatch_core::config::ResolverConfig;
use ipwatch_core::snapshot::AddressCandidate;
use ipwatch_core::traits::AddressResolver;
use ipwatch_core::{Error, Result};

use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Address family a lookup is expected to answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("IPv4"),
            AddressFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// JSON body of ipify-style services (`?format=json`)
#[derive(Debug, Deserialize)]
struct LookupResponse {
    ip: String,
}

/// HTTP-based address resolver
#[derive(Debug, Clone)]
pub struct HttpAddressResolver {
    /// Endpoint answering with the IPv4 address
    ipv4_url: String,

    /// Endpoint answering with the IPv6 address
    ipv6_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a new HTTP address resolver
    ///
    /// # Parameters
    ///
    /// - `ipv4_url`: URL answering with the IPv4 address (e.g., "https://api.ipify.org")
    /// - `ipv6_url`: URL answering with the IPv6 address (e.g., "https://api64.ipify.org")
    /// - `timeout`: Per-request timeout
    pub fn new(
        ipv4_url: impl Into<String>,
        ipv6_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            ipv4_url: ipv4_url.into(),
            ipv6_url: ipv6_url.into(),
            client,
        })
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;

        match config {
            ResolverConfig::Http {
                ipv4_url,
                ipv6_url,
                timeout_secs,
            } => Self::new(
                ipv4_url.clone(),
                ipv6_url.clone(),
                Duration::from_secs(*timeout_secs),
            ),
        }
    }

    /// Fetch the raw response body from a lookup service
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered with HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))
    }

    /// Look up one family, reducing every failure to `None`
    async fn lookup(&self, url: &str, family: AddressFamily) -> Option<String> {
        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("{} lookup failed: {}", family, e);
                return None;
            }
        };

        match parse_address(&body, family) {
            Ok(address) => {
                tracing::debug!("{} lookup answered {}", family, address);
                Some(address)
            }
            Err(e) => {
                tracing::warn!("{} lookup returned no usable address: {}", family, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self) -> Result<AddressCandidate> {
        let (ipv4, ipv6) = tokio::join!(
            self.lookup(&self.ipv4_url, AddressFamily::V4),
            self.lookup(&self.ipv6_url, AddressFamily::V6),
        );

        Ok(AddressCandidate::new(ipv4, ipv6))
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}

/// Extract an address of `family` from a lookup response body
///
/// The returned string is the trimmed answer exactly as the service sent it.
pub fn parse_address(body: &str, family: AddressFamily) -> Result<String> {
    let body = body.trim();

    let text = if body.starts_with('{') {
        serde_json::from_str::<LookupResponse>(body)
            .map_err(|e| Error::invalid_input(format!("Malformed JSON answer: {}", e)))?
            .ip
            .trim()
            .to_string()
    } else {
        body.to_string()
    };

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::invalid_input(format!("Invalid IP address: {:?}", text)))?;

    match (family, ip) {
        (AddressFamily::V4, IpAddr::V4(_)) | (AddressFamily::V6, IpAddr::V6(_)) => Ok(text),
        (AddressFamily::V6, IpAddr::V4(_)) => Err(Error::invalid_input(format!(
            "Expected IPv6, got IPv4 {} (no IPv6 connectivity)",
            text
        ))),
        (AddressFamily::V4, IpAddr::V6(_)) => Err(Error::invalid_input(format!(
            "Expected IPv4, got: {}",
            text
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_answers() {
        assert_eq!(
            parse_address("203.0.113.7\n", AddressFamily::V4).unwrap(),
            "203.0.113.7"
        );
        assert_eq!(
            parse_address("  2001:db8::1  ", AddressFamily::V6).unwrap(),
            "2001:db8::1"
        );
    }

    #[test]
    fn test_json_answers() {
        assert_eq!(
            parse_address(r#"{"ip":"203.0.113.7"}"#, AddressFamily::V4).unwrap(),
            "203.0.113.7"
        );
        assert!(parse_address(r#"{"address":"203.0.113.7"}"#, AddressFamily::V4).is_err());
    }

    #[test]
    fn test_answer_is_not_reformatted() {
        // Exact strings are compared downstream; no canonicalization here
        assert_eq!(
            parse_address("2001:DB8:0:0:0:0:0:1", AddressFamily::V6).unwrap(),
            "2001:DB8:0:0:0:0:0:1"
        );
    }

    #[test]
    fn test_ipv6_lookup_without_connectivity() {
        let err = parse_address("203.0.113.7", AddressFamily::V6).unwrap_err();
        assert!(err.to_string().contains("no IPv6 connectivity"));
    }

    #[test]
    fn test_wrong_family_and_garbage() {
        assert!(parse_address("2001:db8::1", AddressFamily::V4).is_err());
        assert!(parse_address("<html>rate limited</html>", AddressFamily::V4).is_err());
        assert!(parse_address("", AddressFamily::V4).is_err());
    }

    #[test]
    fn test_from_config() {
        let resolver = HttpAddressResolver::from_config(&ResolverConfig::default());
        assert!(resolver.is_ok());

        let invalid = ResolverConfig::Http {
            ipv4_url: String::new(),
            ipv6_url: "https://api64.ipify.org".to_string(),
            timeout_secs: 10,
        };
        assert!(HttpAddressResolver::from_config(&invalid).is_err());
    }
}
