//! HTTP client for the remote match service.
//!
//! Three endpoints are used: `POST /api/register` to join the next round,
//! `GET /api/arena` for the current turn's state, and `POST /api/move` to
//! submit routes. Every request carries the `X-Auth-Token` header and goes
//! through a shared [`Throttle`] so the bot stays under the service's rate
//! limit.

use std::time::Duration;

use colony_core::config::ArenaConfig;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::throttle::Throttle;
use crate::wire::{ArenaState, MoveRequest};

/// Errors talking to the match service.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("arena returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// Registration did not succeed within the configured window.
    #[error("registration not accepted within {secs}s")]
    RegistrationTimeout {
        /// Length of the window.
        secs: u64,
    },

    /// No auth token was configured.
    #[error("no arena token configured (set arena.token or COLONY_API_TOKEN)")]
    MissingToken,
}

/// A client bound to one service URL and token.
#[derive(Debug)]
pub struct ArenaClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    throttle: Throttle,
    retry: Duration,
    window: Duration,
}

impl ArenaClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::MissingToken`] when the token is empty and
    /// [`ArenaError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        if config.token.trim().is_empty() {
            return Err(ArenaError::MissingToken);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ArenaError::Http(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            token: config.token.trim().to_owned(),
            throttle: Throttle::new(Duration::from_millis(config.request_interval_ms)),
            retry: Duration::from_secs(config.register_retry_secs),
            window: Duration::from_secs(config.register_window_secs),
        })
    }

    /// Register for the next round, retrying until the service accepts or
    /// the registration window closes.
    pub async fn register(&mut self) -> Result<(), ArenaError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match self.try_register().await {
                Ok(()) => {
                    info!(attempt, "Registered with arena");
                    return Ok(());
                }
                Err(e) => warn!(attempt, error = %e, "Registration not accepted"),
            }

            if started.elapsed().saturating_add(self.retry) > self.window {
                return Err(ArenaError::RegistrationTimeout {
                    secs: self.window.as_secs(),
                });
            }
            tokio::time::sleep(self.retry).await;
        }
    }

    async fn try_register(&mut self) -> Result<(), ArenaError> {
        self.throttle.wait().await;
        let response = self
            .client
            .post(self.url("/api/register"))
            .header("X-Auth-Token", &self.token)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ArenaError::Http(format!("register request failed: {e}")))?;
        check_status(response).await.map(drop)
    }

    /// Fetch the current arena state.
    pub async fn fetch_arena(&mut self) -> Result<ArenaState, ArenaError> {
        self.throttle.wait().await;
        let response = self
            .client
            .get(self.url("/api/arena"))
            .header("X-Auth-Token", &self.token)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ArenaError::Http(format!("arena request failed: {e}")))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ArenaError::Decode(format!("arena response parse failed: {e}")))
    }

    /// Submit this turn's routes. An empty request is still sent so the
    /// service sees the bot as alive.
    pub async fn submit_moves(&mut self, request: &MoveRequest) -> Result<(), ArenaError> {
        self.throttle.wait().await;
        debug!(moves = request.moves.len(), "Submitting moves");
        let response = self
            .client
            .post(self.url("/api/move"))
            .header("X-Auth-Token", &self.token)
            .header("accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ArenaError::Http(format!("move request failed: {e}")))?;
        check_status(response).await.map(drop)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ArenaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(ArenaError::Status {
        status: status.as_u16(),
        body,
    })
}
