//! Graph view assembly: deduplicate every node and relationship a result
//! set mentions and count labels and types.

use std::collections::HashSet;

use chronicle_core::{GraphNode, GraphPath, GraphRelationship, GraphValue, Record};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::serialize::{render_node, render_relationship, CompactRecord};

/// Label and type frequencies over the deduplicated graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub relationship_count: usize,
    #[serde(rename = "nodeLabels")]
    pub label_counts: IndexMap<String, usize>,
    #[serde(rename = "relationshipTypes")]
    pub relationship_type_counts: IndexMap<String, usize>,
}

/// A deduplicated snapshot, nodes and relationships in first-sight order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateGraph {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
    pub stats: GraphStats,
}

impl AggregateGraph {
    /// `{nodes, relationships, stats}` in the compact graph-view shape.
    pub fn to_json(&self) -> Value {
        let nodes: Vec<Value> = self
            .nodes
            .iter()
            .map(|n| render_node(&CompactRecord, n))
            .collect();
        let relationships: Vec<Value> = self
            .relationships
            .iter()
            .map(|r| render_relationship(&CompactRecord, r))
            .collect();
        json!({
            "nodes": nodes,
            "relationships": relationships,
            "stats": self.stats,
        })
    }
}

/// Accumulates graph entities across result rows.
///
/// A relationship whose endpoint was never seen in full registers an
/// identity-only placeholder; a later full sighting replaces it in place.
#[derive(Debug, Default)]
pub struct GraphAggregator {
    nodes: IndexMap<String, GraphNode>,
    relationships: IndexMap<String, GraphRelationship>,
    placeholders: HashSet<String>,
}

impl GraphAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &Record) {
        for (_, value) in record.iter() {
            self.add_value(value);
        }
    }

    /// Register every graph entity inside `value`. Scalars are ignored.
    pub fn add_value(&mut self, value: &GraphValue) {
        match value {
            GraphValue::Node(node) => self.add_node(node),
            GraphValue::Relationship(rel) => self.add_relationship(rel),
            GraphValue::Path(path) => self.add_path(path),
            GraphValue::List(items) => items.iter().for_each(|v| self.add_value(v)),
            GraphValue::Map(entries) => entries.values().for_each(|v| self.add_value(v)),
            GraphValue::Property(_) => {}
        }
    }

    pub fn add_node(&mut self, node: &GraphNode) {
        if let Some(existing) = self.nodes.get_mut(&node.id) {
            if self.placeholders.remove(&node.id) {
                *existing = node.clone();
            }
            return;
        }
        self.nodes.insert(node.id.clone(), node.clone());
    }

    pub fn add_relationship(&mut self, rel: &GraphRelationship) {
        match rel.start_node.as_deref() {
            Some(start) => self.add_node(start),
            None => self.add_placeholder(&rel.start_id),
        }
        match rel.end_node.as_deref() {
            Some(end) => self.add_node(end),
            None => self.add_placeholder(&rel.end_id),
        }
        if !self.relationships.contains_key(&rel.id) {
            self.relationships.insert(rel.id.clone(), rel.detached());
        }
    }

    pub fn add_path(&mut self, path: &GraphPath) {
        for node in path.nodes() {
            self.add_node(node);
        }
        for rel in path.relationships() {
            self.add_relationship(rel);
        }
    }

    fn add_placeholder(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            self.nodes.insert(id.to_string(), GraphNode::new(id));
            self.placeholders.insert(id.to_string());
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Copy out the current tables with statistics derived from them.
    pub fn snapshot(&self) -> AggregateGraph {
        let mut label_counts = IndexMap::new();
        for label in self.nodes.values().flat_map(|n| n.labels.iter()) {
            *label_counts.entry(label.clone()).or_insert(0) += 1;
        }
        let mut relationship_type_counts = IndexMap::new();
        for rel in self.relationships.values() {
            *relationship_type_counts
                .entry(rel.rel_type.clone())
                .or_insert(0) += 1;
        }

        AggregateGraph {
            nodes: self.nodes.values().cloned().collect(),
            relationships: self.relationships.values().cloned().collect(),
            stats: GraphStats {
                node_count: self.node_count(),
                relationship_count: self.relationship_count(),
                label_counts,
                relationship_type_counts,
            },
        }
    }

    pub fn finish(self) -> AggregateGraph {
        self.snapshot()
    }
}

/// Aggregate a whole result set.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a Record>) -> AggregateGraph {
    let mut aggregator = GraphAggregator::new();
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.finish()
}
