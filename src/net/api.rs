//! Backend API client
//!
//! Thin contract client for the battle endpoints: starting a server-side
//! battle and polling its resolution status. The backend owns all
//! game-economy authority; this client only submits bets and consumes
//! verdicts.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::constants::net;
use crate::battle::session::ServerVerdict;

/// API failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or rejected credential; not retryable
    #[error("not authenticated")]
    Auth,
    /// The server rejected the request, message surfaced verbatim
    #[error("{0}")]
    Validation(String),
    /// Transport-level failure; retryable
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Unexpected server-side status; retryable
    #[error("server error ({0})")]
    Server(u16),
    /// Response body did not match the contract
    #[error("malformed server response")]
    Protocol,
}

impl ApiError {
    /// Whether retrying the same request can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server(_))
    }
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    #[serde(rename = "mintAddress")]
    mint_address: &'a str,
    bet: u32,
}

/// Successful battle start.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BattleStart {
    pub battle_id: String,
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u64,
}

fn default_wait_seconds() -> u64 {
    net::DEFAULT_WAIT_SECS
}

/// Battle resolution status.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BattleStatus {
    pub status: BattleStatusKind,
    /// Present once resolved; absence means still pending
    #[serde(default)]
    pub result: Option<ServerVerdict>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatusKind {
    Pending,
    Resolved,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Client for the arena backend.
#[derive(Debug, Clone)]
pub struct ArenaApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ArenaApi {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Submit the bet and selected asset; the server debits the bet and
    /// returns the battle id plus the authoritative wait duration.
    pub async fn start_battle(
        &self,
        mint_address: &str,
        bet: u32,
    ) -> Result<BattleStart, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Auth)?;

        let url = format!("{}/battle/start", self.base_url);
        debug!(%url, bet, "starting server battle");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&StartRequest { mint_address, bet })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(map_error_status(status, body.detail));
        }
        response.json().await.map_err(|_| ApiError::Protocol)
    }

    /// Fetch resolution status for a running battle.
    pub async fn battle_status(&self, battle_id: &str) -> Result<BattleStatus, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Auth)?;

        let url = format!("{}/battle/{}", self.base_url, battle_id);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(map_error_status(status, body.detail));
        }
        response.json().await.map_err(|_| ApiError::Protocol)
    }
}

/// Map a non-success HTTP status to the error taxonomy. Client errors carry
/// the server's `detail` message when one was provided.
fn map_error_status(status: StatusCode, detail: Option<String>) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth,
        status if status.is_client_error() => {
            ApiError::Validation(detail.unwrap_or_else(|| "failed to start battle".to_string()))
        }
        status => ApiError::Server(status.as_u16()),
    }
}
