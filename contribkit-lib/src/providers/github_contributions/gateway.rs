//! GitHub GraphQL gateway
//!
//! Executes one typed query per call against the GraphQL endpoint. Each query declares its
//! variables and response shape through [`Query`], so responses are validated by `serde`
//! here instead of being picked apart by callers. No retries happen at this layer.

use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "   graphql";

/// A GraphQL operation with a typed variable set and a typed `data` payload.
pub trait Query {
    /// Short description used in log and error messages
    const NAME: &'static str;

    /// The GraphQL document sent to the server
    const DOCUMENT: &'static str;

    type Variables: Serialize + Sync;
    type Data: DeserializeOwned;
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Why a query produced no data
#[derive(Debug)]
pub enum GatewayError {
    /// The request could not be sent, the server answered with a non-success HTTP status,
    /// or the body could not be decoded into the expected shape
    Transport(ohno::AppError),

    /// The server answered with a well-formed error payload
    Remote(Vec<RemoteError>),
}

impl GatewayError {
    pub(super) fn remote(message: impl Into<String>) -> Self {
        Self::Remote(vec![RemoteError {
            message: message.into(),
            kind: None,
        }])
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Remote(errors) => {
                write!(f, "remote error: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    match &error.kind {
                        Some(kind) => write!(f, "{} ({kind})", error.message)?,
                        None => write!(f, "{}", error.message)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl core::error::Error for GatewayError {}

#[derive(Serialize)]
struct Request<'a, V> {
    query: &'static str,
    variables: &'a V,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<RemoteError>,
}

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    endpoint: String,
}

impl Gateway {
    /// Create a gateway that authenticates every request with `token`
    pub fn new(token: &str, endpoint: impl Into<String>) -> crate::Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("bearer {token}"))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);

        let client = reqwest::Client::builder()
            .user_agent("contribkit")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute `Q` with the given variables
    pub async fn execute<Q: Query>(&self, variables: &Q::Variables) -> Result<Q::Data, GatewayError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&Request {
                query: Q::DOCUMENT,
                variables,
            })
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.into()))?;

        if let Some(rl) = extract_rate_limit_from_headers(resp.headers()) {
            log::debug!(
                target: LOG_TARGET,
                "{}: {} requests remaining, resets at {}",
                Q::NAME,
                rl.remaining,
                rl.reset_at.with_timezone(&chrono::Local).format("%T")
            );
        }

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Transport(ohno::app_err!("{} failed with HTTP status {status}", Q::NAME)));
        }

        let envelope: Envelope<Q::Data> = resp.json().await.map_err(|e| GatewayError::Transport(e.into()))?;

        if !envelope.errors.is_empty() {
            return Err(GatewayError::Remote(envelope.errors));
        }

        envelope
            .data
            .ok_or_else(|| GatewayError::remote(format!("{} returned no data", Q::NAME)))
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
