//! Neo4j connection management, scoped sessions and retry.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chronicle_core::{ChronicleError, Record};
use neo4rs::{Neo4jClientErrorKind, Neo4jErrorKind};
use serde::Deserialize;

use crate::backend::{BoltBackend, GraphBackend};
use crate::queries::CypherQuery;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Neo4j session expired: {0}")]
    SessionExpired(String),

    #[error("Neo4j query error: {0}")]
    Query(#[source] neo4rs::Error),

    #[error("Failed to decode query result: {0}")]
    Decode(String),

    #[error(transparent)]
    Core(#[from] ChronicleError),
}

impl GraphError {
    /// Only these two conditions are retried by [`GraphClient::execute_with_retry`].
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::SessionExpired(_))
    }
}

impl From<neo4rs::Error> for GraphError {
    fn from(err: neo4rs::Error) -> Self {
        match err {
            neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
                Self::ServiceUnavailable(err.to_string())
            }
            neo4rs::Error::Neo4j(failure) => {
                let message = format!("{}: {}", failure.code(), failure.message());
                connectivity_failure(failure.kind(), failure.code(), message)
                    .unwrap_or(Self::Query(neo4rs::Error::Neo4j(failure)))
            }
            other => Self::Query(other),
        }
    }
}

/// Classify a server-reported failure by its status code. `None` means the
/// failure is about the query itself and must not be retried.
fn connectivity_failure(kind: Neo4jErrorKind, code: &str, message: String) -> Option<GraphError> {
    match kind {
        Neo4jErrorKind::Client(Neo4jClientErrorKind::SessionExpired) => {
            Some(GraphError::SessionExpired(message))
        }
        Neo4jErrorKind::Transient if code.ends_with(".DatabaseUnavailable") => {
            Some(GraphError::ServiceUnavailable(message))
        }
        _ => None,
    }
}

/// Bounded retry for transient connectivity failures.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait before retry `k` is `base_delay_ms * k`.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Backoff before the retry that follows failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Configuration for connecting to Neo4j. Fixed at process start.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub fetch_size: usize,
    /// Upper bound on waiting for a pooled connection, in seconds.
    pub acquisition_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "chronicle-dev".to_string(),
            database: "neo4j".to_string(),
            max_connections: 50,
            fetch_size: 256,
            acquisition_timeout_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

/// Pooled Neo4j client with scoped sessions and bounded retry.
///
/// Constructed once at process start and handed to every request handler.
/// Clone is cheap (the backend and the session counter are shared).
#[derive(Clone)]
pub struct GraphClient<B = BoltBackend> {
    backend: B,
    retry: RetryPolicy,
    open_sessions: Arc<AtomicUsize>,
}

impl GraphClient<BoltBackend> {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let backend = BoltBackend::connect(config).await?;
        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self::with_backend(backend, config.retry.clone()))
    }
}

impl<B: GraphBackend> GraphClient<B> {
    pub fn with_backend(backend: B, retry: RetryPolicy) -> Self {
        Self {
            backend,
            retry,
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Open a scoped session. It is released when dropped.
    pub fn session(&self) -> ScopedSession<B> {
        let open = self.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(open_sessions = open, "Session acquired");
        ScopedSession {
            backend: self.backend.clone(),
            open_sessions: Arc::clone(&self.open_sessions),
        }
    }

    /// Sessions currently held by callers.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Run `operation` on a fresh session, retrying transient failures.
    ///
    /// Only [`GraphError::ServiceUnavailable`] and [`GraphError::SessionExpired`]
    /// are retried. The caller is blocked during backoff; after the last
    /// attempt the final transient error is returned unchanged.
    pub async fn execute_with_retry<T, F, Fut>(&self, mut operation: F) -> Result<T, GraphError>
    where
        F: FnMut(ScopedSession<B>) -> Fut,
        Fut: Future<Output = Result<T, GraphError>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(self.session()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let wait = self.retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Neo4j connection failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!(
                            attempts = attempt,
                            error = %e,
                            "Neo4j connection failed after all attempts"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Execute a read query and collect all rows.
    pub async fn fetch_all(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError> {
        self.execute_with_retry(|session| async move { session.run(query).await })
            .await
    }

    /// Execute a read query and return the first row, if any.
    pub async fn fetch_one(&self, query: &CypherQuery) -> Result<Option<Record>, GraphError> {
        Ok(self.fetch_all(query).await?.into_iter().next())
    }

    /// Health probe. Never fails; problems are logged and reported as `false`.
    pub async fn verify_connectivity(&self) -> bool {
        match self.backend.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Neo4j connectivity check failed");
                false
            }
        }
    }
}

/// A bounded-lifetime handle for issuing queries against the configured
/// database. Released on drop, whichever way the owning operation exits.
pub struct ScopedSession<B> {
    backend: B,
    open_sessions: Arc<AtomicUsize>,
}

impl<B: GraphBackend> ScopedSession<B> {
    pub async fn run(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError> {
        let records = self.backend.fetch(query).await?;
        tracing::debug!(records = records.len(), "Query executed");
        Ok(records)
    }

    pub async fn single(&self, query: &CypherQuery) -> Result<Option<Record>, GraphError> {
        Ok(self.run(query).await?.into_iter().next())
    }
}

impl<B> Drop for ScopedSession<B> {
    fn drop(&mut self) {
        let open = self.open_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::trace!(open_sessions = open, "Session released");
    }
}
