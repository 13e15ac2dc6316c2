//! Request and response types for the gateway handlers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Search ───────────────────────────────────────────────────────

/// Which entity kinds a search covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Person,
    Event,
    #[default]
    All,
}

impl SearchType {
    pub fn includes_persons(self) -> bool {
        matches!(self, Self::Person | Self::All)
    }

    pub fn includes_events(self) -> bool {
        matches!(self, Self::Event | Self::All)
    }
}

/// Universal search over persons and events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Persons already shown; the next page starts here.
    #[serde(default)]
    pub current_person_count: i64,
    /// Events already shown; the next page starts here.
    #[serde(default)]
    pub current_event_count: i64,
    #[serde(default)]
    pub search_type: SearchType,
    #[serde(default)]
    pub filter_country: Vec<String>,
    #[serde(default)]
    pub filter_continent: Vec<String>,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Person,
    Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Kind-specific fields (`position`/`country` or `country`/`impact`).
    pub context: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchBucket {
    pub data: Vec<SearchItem>,
    pub total_found: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub persons: SearchBucket,
    pub events: SearchBucket,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersResponse {
    pub countries: Vec<String>,
    pub continents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

// ── Infobox ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedNode {
    pub element_id: String,
    pub relationship: String,
    pub labels: Vec<String>,
    pub properties: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoboxResponse {
    pub status: &'static str,
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: Value,
    pub related_nodes: Vec<RelatedNode>,
}

// ── Explore ──────────────────────────────────────────────────────

/// A user-written read-only Cypher query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreRequest {
    pub query: String,
    /// Also return one plain-text line per record.
    #[serde(default)]
    pub include_text: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreSummary {
    pub query: String,
    pub record_count: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreResponse {
    pub status: &'static str,
    pub summary: ExploreSummary,
    /// `{nodes, relationships, stats}` in the compact graph-view shape.
    pub graph: Value,
    pub table: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub neo4j: bool,
}

// ── Enrichment ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Ok,
    /// The name matched nothing in the graph.
    NotFound,
    /// The knowledge base has no identifier for the name.
    QidNotFound,
}

/// Result of one knowledge-base lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOutcome {
    pub status: LookupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Per-item result of a sweep: the lookup outcome, or the captured failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Lookup(LookupOutcome),
    Failed { status: &'static str, error: String },
}

impl BatchOutcome {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            status: "error",
            error: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub name: String,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEnrichmentResponse {
    pub done: usize,
    /// Serialized as `[{name: outcome}, ...]`.
    #[serde(serialize_with = "entries_as_single_key_maps")]
    pub results: Vec<BatchEntry>,
}

fn entries_as_single_key_maps<S>(entries: &[BatchEntry], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::{SerializeMap, SerializeSeq};

    struct Single<'a>(&'a BatchEntry);

    impl Serialize for Single<'_> {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(&self.0.name, &self.0.outcome)?;
            map.end()
        }
    }

    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
    for entry in entries {
        seq.serialize_element(&Single(entry))?;
    }
    seq.end()
}
