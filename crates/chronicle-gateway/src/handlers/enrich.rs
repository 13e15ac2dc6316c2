//! Enrichment: knowledge-base lookups for single persons and throttled
//! sweeps over persons and events still missing data.
//!
//! Sweeps are strictly sequential with a fixed pause between items; the
//! pause is the rate budget of the external service.

use std::future::Future;

use chronicle_core::Record;
use chronicle_graph::{queries, CypherQuery, GraphBackend};
use uuid::Uuid;

use crate::error::{GatewayError, Result};
use crate::handlers::text_column;
use crate::types::{BatchEnrichmentResponse, BatchEntry, BatchOutcome, LookupOutcome, LookupStatus};
use crate::Gateway;

/// The external knowledge base, looked up by display name.
pub trait EnrichmentService: Send + Sync {
    fn lookup_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = anyhow::Result<LookupOutcome>> + Send;
}

impl<B: GraphBackend> Gateway<B> {
    /// Look up one person. Both miss statuses become [`GatewayError::NotFound`].
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), person = %name))]
    pub async fn enrich_person<S: EnrichmentService>(
        &self,
        name: &str,
        service: &S,
    ) -> Result<LookupOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::Validation("Name cannot be empty".to_string()));
        }

        let outcome = service
            .lookup_by_name(name)
            .await
            .map_err(|e| GatewayError::Enrichment(format!("{e:#}")))?;
        match outcome.status {
            LookupStatus::NotFound => Err(GatewayError::NotFound(format!(
                "Person {name} not found in internal DB"
            ))),
            LookupStatus::QidNotFound => Err(GatewayError::NotFound(format!(
                "QID not found for {name}"
            ))),
            LookupStatus::Ok => Ok(outcome),
        }
    }

    /// Sweep persons not yet linked to a dynasty, `limit` at a time from
    /// `offset`. Rows without a `full_name` are skipped.
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), offset = offset, limit = limit))]
    pub async fn enrich_persons_batch<S: EnrichmentService>(
        &self,
        offset: i64,
        limit: i64,
        service: &S,
    ) -> Result<BatchEnrichmentResponse> {
        let query = queries::persons_missing_dynasty(offset, limit);
        self.sweep(&query, "full_name", service).await
    }

    /// Sweep up to `limit` events by name.
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), limit = limit))]
    pub async fn enrich_events_batch<S: EnrichmentService>(
        &self,
        limit: i64,
        service: &S,
    ) -> Result<BatchEnrichmentResponse> {
        let query = queries::events_for_enrichment(limit);
        self.sweep(&query, "name", service).await
    }

    /// Fetch candidates, then look each one up in turn. A failed lookup is
    /// recorded in its slot and the sweep moves on.
    async fn sweep<S: EnrichmentService>(
        &self,
        candidates: &CypherQuery,
        name_column: &str,
        service: &S,
    ) -> Result<BatchEnrichmentResponse> {
        let rows = self.client.fetch_all(candidates).await?;
        let names = candidate_names(&rows, name_column);
        tracing::info!(candidates = names.len(), "Enrichment sweep started");

        let mut results = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.enrichment_delay).await;
            }
            let outcome = match service.lookup_by_name(&name).await {
                Ok(outcome) => BatchOutcome::Lookup(outcome),
                Err(e) => {
                    tracing::warn!(%name, error = %e, "Enrichment lookup failed");
                    BatchOutcome::failed(format!("{e:#}"))
                }
            };
            results.push(BatchEntry { name, outcome });
        }

        let failed = results.iter().filter(|r| r.outcome.is_error()).count();
        tracing::info!(done = results.len(), failed, "Enrichment sweep finished");
        Ok(BatchEnrichmentResponse {
            done: results.len(),
            results,
        })
    }
}

fn candidate_names(rows: &[Record], column: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|r| text_column(r, column))
        .filter(|name| !name.trim().is_empty())
        .collect()
}
