//! chronicle-core: Shared value model for the Chronicle gateway.
//!
//! This crate provides the types every other Chronicle component speaks:
//! - Property values, including temporal values, as a closed enum
//! - Graph entities (nodes, relationships, paths) as returned by Neo4j
//! - Column-keyed result records
//! - Common error types

pub mod error;
pub mod temporal;
pub mod types;

pub use error::ChronicleError;
pub use types::{
    GraphNode, GraphPath, GraphRelationship, GraphValue, PropertyMap, PropertyValue, Record,
};
