//! The database boundary: run a parameterized query, get column-keyed records.

use std::future::Future;
use std::time::Duration;

use chronicle_core::Record;
use neo4rs::{ConfigBuilder, Graph, Query, Txn};

use crate::bolt;
use crate::client::{GraphConfig, GraphError};
use crate::queries::{CypherQuery, ParamValue};

/// Something that can execute read queries against one named database.
pub trait GraphBackend: Clone + Send + Sync + 'static {
    /// Run `query` and collect every row.
    fn fetch(
        &self,
        query: &CypherQuery,
    ) -> impl Future<Output = Result<Vec<Record>, GraphError>> + Send;

    /// Cheap round trip used by health checks.
    fn ping(&self) -> impl Future<Output = Result<(), GraphError>> + Send;
}

/// Bolt-protocol backend over a pooled `neo4rs::Graph`.
#[derive(Clone)]
pub struct BoltBackend {
    graph: Graph,
    acquisition_timeout: Duration,
}

impl BoltBackend {
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        Ok(Self {
            graph,
            acquisition_timeout: Duration::from_secs(config.acquisition_timeout_secs),
        })
    }

    /// Check a connection out of the pool and open a transaction on it.
    ///
    /// Only the checkout is bounded by the acquisition timeout; queries run
    /// on the returned transaction without a deadline.
    async fn begin(&self) -> Result<Txn, GraphError> {
        tokio::time::timeout(self.acquisition_timeout, self.graph.start_txn())
            .await
            .map_err(|_| {
                GraphError::ServiceUnavailable(format!(
                    "no pooled connection available within {}s",
                    self.acquisition_timeout.as_secs()
                ))
            })?
            .map_err(GraphError::from)
    }
}

impl GraphBackend for BoltBackend {
    async fn fetch(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError> {
        let mut txn = self.begin().await?;
        let mut stream = txn.execute(to_bolt_query(query)).await?;

        let mut records = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await? {
            records.push(bolt::decode_row(&row)?);
        }
        txn.commit().await?;
        Ok(records)
    }

    async fn ping(&self) -> Result<(), GraphError> {
        let mut txn = self.begin().await?;
        txn.run(neo4rs::query("RETURN 1")).await?;
        txn.commit().await?;
        Ok(())
    }
}

fn to_bolt_query(query: &CypherQuery) -> Query {
    query
        .params()
        .iter()
        .fold(neo4rs::query(query.text()), |q, (name, value)| match value {
            ParamValue::Text(s) => q.param(name, s.clone()),
            ParamValue::Integer(i) => q.param(name, *i),
            ParamValue::TextList(items) => q.param(name, items.clone()),
        })
}
