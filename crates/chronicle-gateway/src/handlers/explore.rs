//! Explore: run a user-written read-only query and return graph, table and
//! text views of the result.

use chronicle_graph::serialize::{record_to_json, record_to_text, InlineNotation};
use chronicle_graph::{aggregate, guard, CypherQuery, GraphBackend};
use uuid::Uuid;

use crate::error::{GatewayError, Result};
use crate::types::{ExploreRequest, ExploreResponse, ExploreSummary};
use crate::Gateway;

impl<B: GraphBackend> Gateway<B> {
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn explore(&self, request: ExploreRequest) -> Result<ExploreResponse> {
        if let Some(keyword) = guard::forbidden_keyword(&request.query) {
            tracing::warn!(%keyword, "Rejected explore query");
            return Err(GatewayError::Forbidden { keyword });
        }

        let records = self
            .client
            .fetch_all(&CypherQuery::new(request.query.as_str()))
            .await?;

        let columns = records
            .first()
            .map(|r| r.columns().to_vec())
            .unwrap_or_default();
        let graph = aggregate(&records);
        tracing::info!(
            records = records.len(),
            nodes = graph.stats.node_count,
            relationships = graph.stats.relationship_count,
            "Explore query executed"
        );

        Ok(ExploreResponse {
            status: "ok",
            summary: ExploreSummary {
                query: request.query.clone(),
                record_count: records.len(),
                columns,
            },
            graph: graph.to_json(),
            table: records
                .iter()
                .map(|r| record_to_json(&InlineNotation, r))
                .collect(),
            text: request
                .include_text
                .then(|| records.iter().map(record_to_text).collect()),
        })
    }
}
