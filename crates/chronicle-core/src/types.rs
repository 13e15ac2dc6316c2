//! Value model for graph query results.
//!
//! Every value the gateway reshapes for the front end is one of these types.
//! Property maps are key-sorted so that every external representation built
//! from them is stable across calls.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ChronicleError;
use crate::temporal;

/// Property name → value, ordered by name.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

// ── Property Values ──────────────────────────────────────────────

/// A property value as stored on a node or relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    /// Time of day; `offset` is `None` for local times.
    Time {
        time: NaiveTime,
        offset: Option<FixedOffset>,
    },
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    /// Date-time in a named zone such as `Europe/Paris`.
    ZonedDateTime {
        datetime: NaiveDateTime,
        zone: String,
    },
    Duration(Duration),
    List(Vec<PropertyValue>),
    Map(PropertyMap),
}

impl PropertyValue {
    /// ISO-8601 text for temporal values, `None` for everything else.
    pub fn temporal_text(&self) -> Option<String> {
        match self {
            Self::Date(date) => Some(temporal::format_date(date)),
            Self::Time { time, offset } => Some(temporal::format_time(time, offset.as_ref())),
            Self::LocalDateTime(datetime) => Some(temporal::format_local_datetime(datetime)),
            Self::DateTime(datetime) => Some(temporal::format_datetime(datetime)),
            Self::ZonedDateTime { datetime, zone } => {
                Some(temporal::format_zoned_datetime(datetime, zone))
            }
            Self::Duration(duration) => Some(temporal::format_duration(duration)),
            Self::Null
            | Self::Boolean(_)
            | Self::Integer(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::List(_)
            | Self::Map(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// ── Graph Entities ───────────────────────────────────────────────

/// A node snapshot: identity, labels and properties at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// A typed, directed edge between two nodes.
///
/// `start_node`/`end_node` embed the endpoint snapshots when the decoder had
/// them at hand (e.g. for relationships taken from a path).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRelationship {
    pub id: String,
    pub rel_type: String,
    pub start_id: String,
    pub end_id: String,
    pub properties: PropertyMap,
    pub start_node: Option<Box<GraphNode>>,
    pub end_node: Option<Box<GraphNode>>,
}

impl GraphRelationship {
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        start_id: impl Into<String>,
        end_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            start_id: start_id.into(),
            end_id: end_id.into(),
            properties: PropertyMap::new(),
            start_node: None,
            end_node: None,
        }
    }

    /// Attach endpoint snapshots; the endpoint ids follow the given nodes.
    pub fn with_endpoints(mut self, start: GraphNode, end: GraphNode) -> Self {
        self.start_id = start.id.clone();
        self.end_id = end.id.clone();
        self.start_node = Some(Box::new(start));
        self.end_node = Some(Box::new(end));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether this relationship joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.start_id == a && self.end_id == b) || (self.start_id == b && self.end_id == a)
    }

    /// The same relationship without embedded endpoint snapshots.
    pub fn detached(&self) -> Self {
        Self {
            start_node: None,
            end_node: None,
            ..self.clone()
        }
    }
}

/// An alternating walk of nodes and relationships.
///
/// Invariant: `nodes.len() == relationships.len() + 1` and relationship `i`
/// joins node `i` and node `i + 1` (either direction).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    nodes: Vec<GraphNode>,
    relationships: Vec<GraphRelationship>,
}

impl GraphPath {
    pub fn new(
        nodes: Vec<GraphNode>,
        relationships: Vec<GraphRelationship>,
    ) -> Result<Self, ChronicleError> {
        if nodes.len() != relationships.len() + 1 {
            return Err(ChronicleError::InvalidPath(format!(
                "{} nodes cannot be joined by {} relationships",
                nodes.len(),
                relationships.len()
            )));
        }
        for (i, rel) in relationships.iter().enumerate() {
            let (a, b) = (&nodes[i].id, &nodes[i + 1].id);
            if !rel.connects(a, b) {
                return Err(ChronicleError::InvalidPath(format!(
                    "relationship {} does not join nodes {a} and {b}",
                    rel.id
                )));
            }
        }
        Ok(Self {
            nodes,
            relationships,
        })
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[GraphRelationship] {
        &self.relationships
    }

    /// Number of relationships in the path.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// A single-node path has length zero.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start(&self) -> &GraphNode {
        &self.nodes[0]
    }

    pub fn end(&self) -> &GraphNode {
        &self.nodes[self.nodes.len() - 1]
    }
}

// ── Column Values & Records ──────────────────────────────────────

/// Any value a query can return in a result column.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Node(GraphNode),
    Relationship(GraphRelationship),
    Path(GraphPath),
    List(Vec<GraphValue>),
    Map(BTreeMap<String, GraphValue>),
    Property(PropertyValue),
}

impl GraphValue {
    pub fn as_node(&self) -> Option<&GraphNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyValue> {
        match self {
            Self::Property(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_property().and_then(PropertyValue::as_str)
    }
}

impl From<GraphNode> for GraphValue {
    fn from(node: GraphNode) -> Self {
        Self::Node(node)
    }
}

impl From<GraphRelationship> for GraphValue {
    fn from(rel: GraphRelationship) -> Self {
        Self::Relationship(rel)
    }
}

impl From<GraphPath> for GraphValue {
    fn from(path: GraphPath) -> Self {
        Self::Path(path)
    }
}

impl From<PropertyValue> for GraphValue {
    fn from(value: PropertyValue) -> Self {
        Self::Property(value)
    }
}

/// One result row, keyed by output column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<GraphValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, replacing any earlier value under the same name.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<GraphValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter().position(|c| *c == column) {
            Some(i) => self.values[i] = value,
            None => {
                self.columns.push(column);
                self.values.push(value);
            }
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<GraphValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// A string column, `None` when absent, null or not a string.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(GraphValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> GraphNode {
        GraphNode::new(id).with_label("Person")
    }

    #[test]
    fn test_path_requires_one_more_node_than_relationships() {
        let err = GraphPath::new(vec![person("1")], vec![GraphRelationship::new("r", "T", "1", "2")])
            .unwrap_err();
        assert!(matches!(err, ChronicleError::InvalidPath(_)));

        assert!(GraphPath::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_path_relationships_must_join_neighbours() {
        let nodes = vec![person("1"), person("2")];
        let wrong = GraphRelationship::new("r", "KNOWS", "1", "3");
        assert!(GraphPath::new(nodes.clone(), vec![wrong]).is_err());

        // Direction does not matter.
        let reversed = GraphRelationship::new("r", "KNOWS", "2", "1");
        let path = GraphPath::new(nodes, vec![reversed]).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.start().id, "1");
        assert_eq!(path.end().id, "2");
    }

    #[test]
    fn test_single_node_path_is_empty() {
        let path = GraphPath::new(vec![person("1")], vec![]).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
    }

    #[test]
    fn test_temporal_text_only_for_temporal_values() {
        let date = NaiveDate::from_ymd_opt(1990, 1, 12).unwrap();
        assert_eq!(
            PropertyValue::Date(date).temporal_text().as_deref(),
            Some("1990-01-12")
        );
        assert_eq!(PropertyValue::from("1990").temporal_text(), None);
        assert_eq!(PropertyValue::Null.temporal_text(), None);
    }

    #[test]
    fn test_record_column_access() {
        let mut record = Record::new()
            .with("name", PropertyValue::from("Gajah Mada"))
            .with("n", person("7"));
        assert_eq!(record.columns(), ["name", "n"]);
        assert_eq!(record.get_str("name"), Some("Gajah Mada"));
        assert_eq!(record.get("n").and_then(GraphValue::as_node).map(|n| n.id.as_str()), Some("7"));
        assert!(record.get("missing").is_none());

        record.push("name", PropertyValue::Null);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get_str("name"), None);
    }

    #[test]
    fn test_detached_relationship_drops_endpoints() {
        let rel = GraphRelationship::new("r1", "BORN_IN", "", "")
            .with_endpoints(person("1"), GraphNode::new("2").with_label("City"));
        assert_eq!(rel.start_id, "1");
        assert_eq!(rel.end_id, "2");

        let detached = rel.detached();
        assert!(detached.start_node.is_none());
        assert_eq!(detached.end_id, "2");
    }
}
