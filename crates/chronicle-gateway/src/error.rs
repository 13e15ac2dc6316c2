//! Error types for the chronicle-gateway crate.

use chronicle_graph::GraphError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or disallowed input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Explore query rejected by the read-only guard.
    #[error("Forbidden Cypher command detected: {keyword}. Only read-only queries are allowed.")]
    Forbidden { keyword: String },

    /// The query ran but matched nothing.
    #[error("{0}")]
    NotFound(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The knowledge-base lookup itself failed.
    #[error("Enrichment service error: {0}")]
    Enrichment(String),
}

impl GatewayError {
    /// HTTP-style status for the client-facing response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound(_) => 404,
            Self::Graph(_) | Self::Serialization(_) | Self::Enrichment(_) => 500,
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "status": self.status_code(),
            "detail": self.to_string(),
        })
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
