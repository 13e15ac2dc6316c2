//! Chronicle Graph: Neo4j access and result normalization.
//!
//! Every read the gateway issues flows through this crate: the connection
//! manager owns the pool and the retry policy, the query builders produce
//! parameterized Cypher, and the serializer and aggregator reshape raw
//! results for the front end.

pub mod aggregate;
pub mod backend;
mod bolt;
pub mod client;
pub mod guard;
pub mod properties;
pub mod queries;
pub mod serialize;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use aggregate::{aggregate, AggregateGraph, GraphAggregator, GraphStats};
pub use backend::{BoltBackend, GraphBackend};
pub use client::{GraphClient, GraphConfig, GraphError, RetryPolicy, ScopedSession};
pub use queries::{CypherQuery, ParamValue};
