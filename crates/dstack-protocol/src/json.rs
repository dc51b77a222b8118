use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ProtocolError, Result};
use crate::traits::Protocol;

const USER_AGENT: &str = concat!("dstack-rs/", env!("CARGO_PKG_VERSION"));

/// JSON-over-HTTP protocol.
///
/// Every call is a blocking `POST <server>/<endpoint>` with a JSON body.
/// Only HTTP 200 counts as success. An empty success body is returned as an
/// empty object, since the access check makes no demands on the body.
#[derive(Debug, Clone)]
pub struct JsonProtocol {
    client: Client,
    server: String,
}

impl JsonProtocol {
    /// Create a protocol for `server` with the transport's default timeout.
    pub fn new(server: impl Into<String>) -> Result<Self> {
        Self::with_timeout(server, None)
    }

    /// Create a protocol with an explicit per-request timeout.
    pub fn with_timeout(server: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProtocolError::Client)?;
        Ok(Self::with_client(client, server))
    }

    /// Wrap a pre-configured HTTP client.
    pub fn with_client(client: Client, server: impl Into<String>) -> Self {
        Self {
            client,
            server: server.into(),
        }
    }

    /// Base server URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Full URL for an endpoint, with exactly one slash at the seam.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.server.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl Protocol for JsonProtocol {
    fn send(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        let url = self.endpoint_url(endpoint);
        debug!(%url, "sending request");

        let transport = |source| ProtocolError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().map_err(transport)?;

        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "server rejected request");
            return Err(ProtocolError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&body).map_err(|err| ProtocolError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    }
}
