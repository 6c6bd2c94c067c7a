//! External service client handle.
//!
//! A configured HTTP client bound to a project identifier and the two
//! service endpoints. Nothing in the dashboard calls out through it; it is
//! constructed once at startup and exposed for integrations.

use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{DeskError, Result};

/// Handle for calls to the ticketing service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    project_id: String,
    api_url: Url,
    auth_url: Url,
    http: reqwest::Client,
}

impl ServiceClient {
    /// Build a client from configuration.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_url = parse_endpoint(&config.api_url)?;
        let auth_url = parse_endpoint(&config.auth_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("servicedesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeskError::ClientBuild {
                message: e.to_string(),
                source: Some(e),
            })?;

        debug!(project_id = %config.project_id, api = %api_url, auth = %auth_url, "service client ready");

        Ok(Self {
            project_id: config.project_id.clone(),
            api_url,
            auth_url,
            http,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// The underlying HTTP client, for callers that need to make requests.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolve a path against the API endpoint.
    pub fn api_endpoint(&self, path: &str) -> Result<Url> {
        join(&self.api_url, path)
    }

    /// Resolve a path against the auth endpoint.
    pub fn auth_endpoint(&self, path: &str) -> Result<Url> {
        join(&self.auth_url, path)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| DeskError::InvalidEndpoint {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DeskError::InvalidEndpoint {
            url: raw.to_string(),
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    // Url::join drops the last segment unless the base ends with '/'.
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| DeskError::InvalidEndpoint {
            url: format!("{base}{path}"),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client() {
        let client = ServiceClient::new(&ServiceConfig::default()).unwrap();
        assert_eq!(client.project_id(), "servicedesk-demo");
        assert_eq!(client.api_url().scheme(), "https");
        assert_eq!(client.auth_url().host_str(), Some("auth.servicedesk.example.com"));
    }

    #[test]
    fn test_endpoint_join_keeps_base_path() {
        let client = ServiceClient::new(&ServiceConfig::default()).unwrap();
        let url = client.api_endpoint("/tickets").unwrap();
        assert_eq!(url.as_str(), "https://api.servicedesk.example.com/v1/tickets");

        let url = client.auth_endpoint("token").unwrap();
        assert_eq!(url.as_str(), "https://auth.servicedesk.example.com/token");
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        let config = ServiceConfig {
            api_url: "not a url".into(),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            ServiceClient::new(&config).unwrap_err(),
            DeskError::InvalidEndpoint { .. }
        ));

        let config = ServiceConfig {
            auth_url: "ftp://auth.example.com".into(),
            ..ServiceConfig::default()
        };
        let err = ServiceClient::new(&config).unwrap_err();
        assert!(err.to_string().contains("ftp://auth.example.com"));
    }
}
