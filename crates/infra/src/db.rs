use std::time::Duration;

use khidmat_domain::ports::BoxFuture;
use khidmat_domain::ports::db::{StoreError, StoreHealth};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::config::AppConfig;

/// Reachability probe for the relational backend's REST endpoint.
#[derive(Debug, Clone)]
pub struct RestAdapter {
    endpoint: String,
}

impl RestAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.rest_endpoint.clone())
    }
}

impl StoreHealth for RestAdapter {
    fn backend(&self) -> &'static str {
        "rest"
    }

    fn check(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        let endpoint = self.endpoint.clone();
        Box::pin(async move {
            let address = parse_socket_address(&endpoint)?;
            let connect = timeout(Duration::from_secs(2), TcpStream::connect(address))
                .await
                .map_err(|_| {
                    StoreError::Unavailable("rest endpoint connect timed out".to_string())
                })?;
            connect.map_err(|err| {
                StoreError::Unavailable(format!("rest endpoint connect failed: {err}"))
            })?;

            tracing::debug!(endpoint, "rest endpoint health check succeeded");
            Ok(())
        })
    }
}

/// Health adapter for the in-memory backend; there is nothing to reach.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter;

impl StoreHealth for MemoryAdapter {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn check(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move { Ok(()) })
    }
}

fn parse_socket_address(endpoint: &str) -> Result<String, StoreError> {
    let normalized = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    };
    let parsed = Url::parse(&normalized).map_err(|err| {
        StoreError::Unavailable(format!("invalid rest endpoint '{endpoint}': {err}"))
    })?;

    let host = parsed.host_str().ok_or_else(|| {
        StoreError::Unavailable(format!("missing host in rest endpoint '{endpoint}'"))
    })?;
    let port = parsed
        .port_or_known_default()
        .unwrap_or(match parsed.scheme() {
            "https" => 443,
            _ => 80,
        });
    Ok(format!("{host}:{port}"))
}
