//! In-memory backend for exercising the client and handlers without Neo4j.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chronicle_core::Record;

use crate::backend::GraphBackend;
use crate::client::GraphError;
use crate::queries::CypherQuery;

type Responder = dyn Fn(&CypherQuery) -> Result<Vec<Record>, GraphError> + Send + Sync;

/// A backend that answers every query through a closure and records what
/// it was asked.
#[derive(Clone)]
pub struct ScriptedBackend {
    responder: Arc<Responder>,
    executed: Arc<Mutex<Vec<CypherQuery>>>,
    healthy: Arc<AtomicBool>,
}

impl ScriptedBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CypherQuery) -> Result<Vec<Record>, GraphError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            executed: Arc::new(Mutex::new(Vec::new())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Every query returns no rows.
    pub fn empty() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }

    /// Queries executed so far, oldest first.
    pub fn executed(&self) -> Vec<CypherQuery> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl GraphBackend for ScriptedBackend {
    async fn fetch(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        (self.responder)(query)
    }

    async fn ping(&self) -> Result<(), GraphError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GraphError::ServiceUnavailable("scripted outage".to_string()))
        }
    }
}
