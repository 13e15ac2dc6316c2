//! chronicle-gateway: Read-oriented API over the Chronicle knowledge graph.
//!
//! Turns search, infobox, explore and enrichment requests into
//! parameterized Cypher, runs them through the shared [`GraphClient`], and
//! reshapes the results into front-end JSON. Handlers are plain async
//! methods on [`Gateway`]; routing them is up to the embedding process.

pub mod config;
pub mod error;
pub mod handlers;
pub mod types;

pub use config::Settings;
pub use error::GatewayError;
pub use handlers::enrich::EnrichmentService;

use std::time::Duration;

use chronicle_graph::{BoltBackend, GraphBackend, GraphClient};

use crate::types::HealthResponse;

/// Request handlers sharing one connection manager.
///
/// Built once at process start; cloning shares the pool.
#[derive(Clone)]
pub struct Gateway<B = BoltBackend> {
    client: GraphClient<B>,
    enrichment_delay: Duration,
}

impl Gateway<BoltBackend> {
    /// Connect to Neo4j using `settings`.
    pub async fn connect(settings: &Settings) -> error::Result<Self> {
        let client = GraphClient::connect(&settings.neo4j).await?;
        Ok(Self::new(client).with_enrichment_delay(settings.enrichment.delay()))
    }
}

impl<B: GraphBackend> Gateway<B> {
    pub fn new(client: GraphClient<B>) -> Self {
        Self {
            client,
            enrichment_delay: config::EnrichmentSettings::default().delay(),
        }
    }

    /// Pause between items of an enrichment sweep.
    pub fn with_enrichment_delay(mut self, delay: Duration) -> Self {
        self.enrichment_delay = delay;
        self
    }

    pub fn client(&self) -> &GraphClient<B> {
        &self.client
    }

    pub async fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok",
            neo4j: self.client.verify_connectivity().await,
        }
    }
}
