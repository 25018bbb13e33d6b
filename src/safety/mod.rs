//! URL safety checks run before any user-supplied URL is fetched.
//!
//! Cheap local checks (scheme, host) come first and never touch the
//! network. Everything that passes is looked up against the Safe Browsing
//! threat-match API. A failed or timed-out lookup is a rejection.

use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::{Host, Url};

use crate::config::SafeBrowsingConfig;
use crate::fetcher::shared_client;

const CLIENT_ID: &str = "adevar";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
const THREAT_TYPES: [&str; 4] = [
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

/// Why a URL was refused. `Display` is the message shown to callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnsafeUrl {
    #[error("Invalid URL")]
    Invalid,

    #[error("Malicious URL, We stored your request for further investigation")]
    Flagged { threats: Vec<String> },

    #[error("Error validating URL for malicious content")]
    LookupFailed(String),

    #[error("Error validating URL for malicious content")]
    LookupTimeout,
}

impl UnsafeUrl {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::LookupTimeout)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatMatchRequest<'a> {
    client: ClientInfo<'a>,
    threat_info: ThreatInfo<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo<'a> {
    client_id: &'a str,
    client_version: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatInfo<'a> {
    threat_types: &'a [&'a str],
    platform_types: [&'a str; 1],
    threat_entry_types: [&'a str; 1],
    threat_entries: [ThreatEntry<'a>; 1],
}

#[derive(Serialize)]
struct ThreatEntry<'a> {
    url: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ThreatMatchResponse {
    #[serde(default)]
    matches: Vec<ThreatMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreatMatch {
    #[serde(default)]
    threat_type: String,
}

/// Decides whether a URL may be fetched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlGuard: Send + Sync {
    async fn validate(&self, url: &str) -> Result<(), UnsafeUrl>;
}

/// Validates candidate URLs against local rules and the threat-match API.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    client: Client,
    config: SafeBrowsingConfig,
}

impl UrlValidator {
    pub fn new(config: SafeBrowsingConfig) -> Self {
        Self {
            client: shared_client().clone(),
            config,
        }
    }

    async fn lookup(&self, url: &str) -> Result<(), UnsafeUrl> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!("no Safe Browsing API key configured, refusing URL");
            return Err(UnsafeUrl::LookupFailed("api key not configured".to_string()));
        };

        let body = ThreatMatchRequest {
            client: ClientInfo {
                client_id: CLIENT_ID,
                client_version: CLIENT_VERSION,
            },
            threat_info: ThreatInfo {
                threat_types: &THREAT_TYPES,
                platform_types: ["ANY_PLATFORM"],
                threat_entry_types: ["URL"],
                threat_entries: [ThreatEntry { url }],
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", api_key)])
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(lookup_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "threat lookup returned an error status");
            return Err(UnsafeUrl::LookupFailed(format!("status {}", status)));
        }

        let verdict: ThreatMatchResponse = response.json().await.map_err(lookup_error)?;
        if verdict.matches.is_empty() {
            return Ok(());
        }

        let threats: Vec<String> = verdict
            .matches
            .into_iter()
            .map(|m| m.threat_type)
            .collect();
        warn!(?threats, "URL flagged by threat lookup, logged for review");
        Err(UnsafeUrl::Flagged { threats })
    }
}

#[async_trait]
impl UrlGuard for UrlValidator {
    #[instrument(skip(self))]
    async fn validate(&self, url: &str) -> Result<(), UnsafeUrl> {
        check_local_rules(url)?;
        self.lookup(url).await
    }
}

fn lookup_error(err: reqwest::Error) -> UnsafeUrl {
    if err.is_timeout() {
        UnsafeUrl::LookupTimeout
    } else {
        info!(error = %err, "threat lookup failed");
        UnsafeUrl::LookupFailed(err.to_string())
    }
}

/// Scheme and host checks that need no network access.
pub fn check_local_rules(url: &str) -> Result<(), UnsafeUrl> {
    let parsed = Url::parse(url).map_err(|_| UnsafeUrl::Invalid)?;

    if !parsed.scheme().starts_with("http") {
        return Err(UnsafeUrl::Invalid);
    }

    match parsed.host() {
        None => Err(UnsafeUrl::Invalid),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                Err(UnsafeUrl::Invalid)
            } else {
                Ok(())
            }
        }
        Some(Host::Ipv4(ip)) => check_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => check_ip(IpAddr::V6(ip)),
    }
}

fn check_ip(ip: IpAddr) -> Result<(), UnsafeUrl> {
    let internal = match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unique_local()
                || v6.is_unicast_link_local()
                || v6.to_ipv4_mapped().is_some_and(|v4| check_ip(IpAddr::V4(v4)).is_err())
        }
    };

    if internal {
        Err(UnsafeUrl::Invalid)
    } else {
        Ok(())
    }
}
