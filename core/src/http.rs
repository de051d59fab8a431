use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::graphql::{GraphQlRequest, GraphQlTransport};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:7080/.api/graphql";

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Posts GraphQL requests to a code-search endpoint over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GraphQlTransport for HttpTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, TransportError> {
        debug!("POST {}", self.endpoint);

        let resp = self.client.post(&self.endpoint).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!("reading body of HTTP {status} failed: {err}");
                    format!("<unreadable body: {err}>")
                }
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await?;
        check_graphql_errors(&body)?;
        Ok(body)
    }
}

/// A non-empty top-level `errors` array fails the whole call.
fn check_graphql_errors(body: &Value) -> Result<(), TransportError> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Ok(());
    };
    if errors.is_empty() {
        return Ok(());
    }

    let messages = errors
        .iter()
        .map(|e| match e.get("message").and_then(Value::as_str) {
            Some(msg) => msg.to_string(),
            None => e.to_string(),
        })
        .collect();
    Err(TransportError::GraphQl(messages))
}
