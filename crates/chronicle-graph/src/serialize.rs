//! Rendering of query results into front-end shapes.
//!
//! [`render_value`] and [`render_property`] are the only traversals. Each
//! output shape is a [`Flavor`]: a set of callbacks invoked bottom-up, so a
//! new shape needs no changes here. Temporal values reach every flavor as
//! ISO-8601 text.

use chronicle_core::{GraphNode, GraphPath, GraphRelationship, GraphValue, PropertyValue, Record};
use serde_json::{json, Map, Value};

/// A leaf value as seen by a flavor.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(&'a str),
    /// ISO-8601 date/time text, or the descriptive form of a duration.
    Temporal(String),
}

/// One output shape.
pub trait Flavor {
    type Output;

    fn scalar(&self, value: Scalar<'_>) -> Self::Output;
    fn list(&self, items: Vec<Self::Output>) -> Self::Output;
    fn map(&self, entries: Vec<(String, Self::Output)>) -> Self::Output;

    /// `properties` are already rendered, in key order.
    fn node(&self, node: &GraphNode, properties: Vec<(String, Self::Output)>) -> Self::Output;
    fn relationship(
        &self,
        rel: &GraphRelationship,
        properties: Vec<(String, Self::Output)>,
    ) -> Self::Output;
    /// `nodes` and `relationships` are rendered in traversal order.
    fn path(
        &self,
        path: &GraphPath,
        nodes: Vec<Self::Output>,
        relationships: Vec<Self::Output>,
    ) -> Self::Output;
}

// ── Traversal ────────────────────────────────────────────────────

pub fn render_value<F: Flavor>(flavor: &F, value: &GraphValue) -> F::Output {
    match value {
        GraphValue::Node(node) => render_node(flavor, node),
        GraphValue::Relationship(rel) => render_relationship(flavor, rel),
        GraphValue::Path(path) => render_path(flavor, path),
        GraphValue::List(items) => {
            flavor.list(items.iter().map(|v| render_value(flavor, v)).collect())
        }
        GraphValue::Map(entries) => flavor.map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), render_value(flavor, v)))
                .collect(),
        ),
        GraphValue::Property(value) => render_property(flavor, value),
    }
}

pub fn render_property<F: Flavor>(flavor: &F, value: &PropertyValue) -> F::Output {
    if let Some(text) = value.temporal_text() {
        return flavor.scalar(Scalar::Temporal(text));
    }
    let scalar = match value {
        PropertyValue::Boolean(b) => Scalar::Boolean(*b),
        PropertyValue::Integer(i) => Scalar::Integer(*i),
        PropertyValue::Float(f) => Scalar::Float(*f),
        PropertyValue::String(s) => Scalar::Text(s),
        PropertyValue::List(items) => {
            return flavor.list(items.iter().map(|v| render_property(flavor, v)).collect())
        }
        PropertyValue::Map(entries) => return flavor.map(render_entries(flavor, entries)),
        // Temporal variants are handled above.
        _ => Scalar::Null,
    };
    flavor.scalar(scalar)
}

pub fn render_node<F: Flavor>(flavor: &F, node: &GraphNode) -> F::Output {
    flavor.node(node, render_entries(flavor, &node.properties))
}

pub fn render_relationship<F: Flavor>(flavor: &F, rel: &GraphRelationship) -> F::Output {
    flavor.relationship(rel, render_entries(flavor, &rel.properties))
}

pub fn render_path<F: Flavor>(flavor: &F, path: &GraphPath) -> F::Output {
    let nodes = path.nodes().iter().map(|n| render_node(flavor, n)).collect();
    let rels = path
        .relationships()
        .iter()
        .map(|r| render_relationship(flavor, r))
        .collect();
    flavor.path(path, nodes, rels)
}

fn render_entries<'a, F: Flavor>(
    flavor: &F,
    entries: impl IntoIterator<Item = (&'a String, &'a PropertyValue)>,
) -> Vec<(String, F::Output)> {
    entries
        .into_iter()
        .map(|(k, v)| (k.clone(), render_property(flavor, v)))
        .collect()
}

/// A whole row as a JSON object keyed by column.
pub fn record_to_json<F: Flavor<Output = Value>>(flavor: &F, record: &Record) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(column, value)| (column.to_string(), render_value(flavor, value)))
            .collect(),
    )
}

/// A whole row as one line of `column: text` pairs.
pub fn record_to_text(record: &Record) -> String {
    record
        .iter()
        .map(|(column, value)| format!("{column}: {}", render_value(&PlainText, value)))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn json_scalar(value: Scalar<'_>) -> Value {
    match value {
        Scalar::Null => Value::Null,
        Scalar::Boolean(b) => Value::Bool(b),
        Scalar::Integer(i) => Value::from(i),
        Scalar::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Scalar::Text(s) => Value::String(s.to_string()),
        Scalar::Temporal(s) => Value::String(s),
    }
}

fn json_object(entries: Vec<(String, Value)>) -> Value {
    Value::Object(entries.into_iter().collect::<Map<_, _>>())
}

// ── Inline notation (table view) ─────────────────────────────────

/// Table cells: graph entities become Cypher-like notation strings, other
/// values pass through as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineNotation;

impl Flavor for InlineNotation {
    type Output = Value;

    fn scalar(&self, value: Scalar<'_>) -> Value {
        json_scalar(value)
    }

    fn list(&self, items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn map(&self, entries: Vec<(String, Value)>) -> Value {
        json_object(entries)
    }

    fn node(&self, node: &GraphNode, _: Vec<(String, Value)>) -> Value {
        Value::String(render_node(&Notation, node))
    }

    fn relationship(&self, rel: &GraphRelationship, _: Vec<(String, Value)>) -> Value {
        Value::String(render_relationship(&Notation, rel))
    }

    fn path(&self, path: &GraphPath, _: Vec<Value>, _: Vec<Value>) -> Value {
        Value::String(render_path(&Notation, path))
    }
}

/// Notation text for entities and the property values inside them.
struct Notation;

impl Notation {
    fn property_block(properties: Vec<(String, String)>) -> String {
        if properties.is_empty() {
            return String::new();
        }
        let body: Vec<String> = properties
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        format!(" {{{}}}", body.join(", "))
    }
}

impl Flavor for Notation {
    type Output = String;

    fn scalar(&self, value: Scalar<'_>) -> String {
        match value {
            Scalar::Null => "null".to_string(),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => format!("{f:?}"),
            Scalar::Text(s) => quote(s),
            Scalar::Temporal(s) => quote(&s),
        }
    }

    fn list(&self, items: Vec<String>) -> String {
        format!("[{}]", items.join(", "))
    }

    fn map(&self, entries: Vec<(String, String)>) -> String {
        let body: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        format!("{{{}}}", body.join(", "))
    }

    fn node(&self, node: &GraphNode, properties: Vec<(String, String)>) -> String {
        let labels: String = node.labels.iter().map(|l| format!(":{l}")).collect();
        let block = Self::property_block(properties);
        let block = if labels.is_empty() {
            block.trim_start()
        } else {
            block.as_str()
        };
        format!("({labels}{block})")
    }

    fn relationship(&self, rel: &GraphRelationship, properties: Vec<(String, String)>) -> String {
        format!("[:{}{}]", rel.rel_type, Self::property_block(properties))
    }

    fn path(&self, path: &GraphPath, nodes: Vec<String>, _: Vec<String>) -> String {
        let mut text = String::new();
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                text.push_str(&format!("-[:{}]->", path.relationships()[i - 1].rel_type));
            }
            text.push_str(node);
        }
        text
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

// ── Structured record (full fidelity) ────────────────────────────

/// Full-fidelity records carrying element identities and endpoint references.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredRecord;

impl Flavor for StructuredRecord {
    type Output = Value;

    fn scalar(&self, value: Scalar<'_>) -> Value {
        json_scalar(value)
    }

    fn list(&self, items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn map(&self, entries: Vec<(String, Value)>) -> Value {
        json_object(entries)
    }

    fn node(&self, node: &GraphNode, properties: Vec<(String, Value)>) -> Value {
        json!({
            "identity": node.id,
            "labels": node.labels,
            "properties": json_object(properties),
            "elementType": "node",
        })
    }

    fn relationship(&self, rel: &GraphRelationship, properties: Vec<(String, Value)>) -> Value {
        json!({
            "identity": rel.id,
            "type": rel.rel_type,
            "start": rel.start_id,
            "end": rel.end_id,
            "properties": json_object(properties),
            "elementType": "relationship",
        })
    }

    fn path(&self, path: &GraphPath, nodes: Vec<Value>, relationships: Vec<Value>) -> Value {
        json!({
            "elementType": "path",
            "length": path.len(),
            "nodes": nodes,
            "relationships": relationships,
        })
    }
}

// ── Compact record (graph view) ──────────────────────────────────

/// Minimal graph-view records: identity, labels or type, endpoints, properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactRecord;

impl Flavor for CompactRecord {
    type Output = Value;

    fn scalar(&self, value: Scalar<'_>) -> Value {
        json_scalar(value)
    }

    fn list(&self, items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn map(&self, entries: Vec<(String, Value)>) -> Value {
        json_object(entries)
    }

    fn node(&self, node: &GraphNode, properties: Vec<(String, Value)>) -> Value {
        json!({
            "id": node.id,
            "labels": node.labels,
            "properties": json_object(properties),
        })
    }

    fn relationship(&self, rel: &GraphRelationship, properties: Vec<(String, Value)>) -> Value {
        json!({
            "id": rel.id,
            "type": rel.rel_type,
            "startNode": rel.start_id,
            "endNode": rel.end_id,
            "properties": json_object(properties),
        })
    }

    fn path(&self, _: &GraphPath, nodes: Vec<Value>, relationships: Vec<Value>) -> Value {
        json!({ "nodes": nodes, "relationships": relationships })
    }
}

// ── Plain text (text view) ───────────────────────────────────────

/// Human-readable text: strings unquoted, nodes by label and display name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl PlainText {
    /// `name`, then `full_name`, then `#<id>`.
    pub fn display_name(node: &GraphNode) -> String {
        ["name", "full_name"]
            .iter()
            .find_map(|key| node.property(key).and_then(PropertyValue::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", node.id))
    }

    fn endpoint(node: Option<&GraphNode>, id: &str) -> String {
        match node {
            Some(node) => format!("({})", Self::display_name(node)),
            None => format!("(#{id})"),
        }
    }
}

impl Flavor for PlainText {
    type Output = String;

    fn scalar(&self, value: Scalar<'_>) -> String {
        match value {
            Scalar::Null => "null".to_string(),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.to_string(),
            Scalar::Temporal(s) => s,
        }
    }

    fn list(&self, items: Vec<String>) -> String {
        format!("[{}]", items.join(", "))
    }

    fn map(&self, entries: Vec<(String, String)>) -> String {
        let body: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        format!("{{{}}}", body.join(", "))
    }

    fn node(&self, node: &GraphNode, _: Vec<(String, String)>) -> String {
        let name = Self::display_name(node);
        if node.labels.is_empty() {
            name
        } else {
            format!("{} {name}", node.labels.join(":"))
        }
    }

    fn relationship(&self, rel: &GraphRelationship, _: Vec<(String, String)>) -> String {
        format!(
            "{}-[:{}]->{}",
            Self::endpoint(rel.start_node.as_deref(), &rel.start_id),
            rel.rel_type,
            Self::endpoint(rel.end_node.as_deref(), &rel.end_id),
        )
    }

    fn path(&self, path: &GraphPath, _: Vec<String>, _: Vec<String>) -> String {
        let mut text = String::new();
        for (i, node) in path.nodes().iter().enumerate() {
            if i > 0 {
                text.push_str(&format!("-[:{}]->", path.relationships()[i - 1].rel_type));
            }
            text.push_str(&format!("({})", Self::display_name(node)));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
    use chronicle_core::PropertyMap;

    use super::*;

    fn hayam_wuruk() -> GraphNode {
        GraphNode::new("1")
            .with_label("Person")
            .with_property("full_name", "Hayam Wuruk")
            .with_property("born", 1334_i64)
    }

    fn majapahit() -> GraphNode {
        GraphNode::new("2")
            .with_label("Kingdom")
            .with_property("name", "Majapahit")
    }

    fn ruled() -> GraphRelationship {
        GraphRelationship::new("10", "RULED", "1", "2").with_property("from", 1350_i64)
    }

    #[test]
    fn test_inline_node_and_relationship() {
        let node = render_node(&InlineNotation, &hayam_wuruk());
        assert_eq!(node, json!("(:Person {born: 1334, full_name: 'Hayam Wuruk'})"));

        let rel = render_relationship(&InlineNotation, &ruled());
        assert_eq!(rel, json!("[:RULED {from: 1350}]"));

        let bare = GraphRelationship::new("11", "KNOWS", "1", "3");
        assert_eq!(render_relationship(&InlineNotation, &bare), json!("[:KNOWS]"));
    }

    #[test]
    fn test_inline_omits_empty_blocks_and_labels() {
        let unlabeled = GraphNode::new("5").with_property("x", 1_i64);
        assert_eq!(render_node(&InlineNotation, &unlabeled), json!("({x: 1})"));
        assert_eq!(render_node(&InlineNotation, &GraphNode::new("6")), json!("()"));
        assert_eq!(
            render_node(&InlineNotation, &GraphNode::new("7").with_label("A").with_label("B")),
            json!("(:A:B)")
        );
    }

    #[test]
    fn test_inline_nested_property_values() {
        let node = GraphNode::new("1")
            .with_label("Event")
            .with_property("tags", vec!["war", "java"])
            .with_property("on", NaiveDate::from_ymd_opt(1293, 11, 10).unwrap())
            .with_property("title", "Raden's revolt");
        assert_eq!(
            render_node(&InlineNotation, &node),
            json!("(:Event {on: '1293-11-10', tags: ['war', 'java'], title: 'Raden\\'s revolt'})")
        );
    }

    #[test]
    fn test_inline_path() {
        let founded = GraphRelationship::new("11", "FOUNDED_BY", "2", "3");
        let path = GraphPath::new(
            vec![hayam_wuruk(), majapahit(), GraphNode::new("3").with_label("Person")],
            vec![ruled(), founded],
        )
        .unwrap();
        assert_eq!(
            render_path(&InlineNotation, &path),
            json!(
                "(:Person {born: 1334, full_name: 'Hayam Wuruk'})-[:RULED]->\
                 (:Kingdom {name: 'Majapahit'})-[:FOUNDED_BY]->(:Person)"
            )
        );
    }

    #[test]
    fn test_inline_passes_scalars_and_containers_through() {
        let value = GraphValue::List(vec![
            GraphValue::Property(PropertyValue::Integer(3)),
            GraphValue::Node(majapahit()),
            GraphValue::Property(PropertyValue::Null),
        ]);
        assert_eq!(
            render_value(&InlineNotation, &value),
            json!([3, "(:Kingdom {name: 'Majapahit'})", null])
        );
    }

    #[test]
    fn test_structured_node_and_relationship() {
        assert_eq!(
            render_node(&StructuredRecord, &majapahit()),
            json!({
                "identity": "2",
                "labels": ["Kingdom"],
                "properties": {"name": "Majapahit"},
                "elementType": "node",
            })
        );
        assert_eq!(
            render_relationship(&StructuredRecord, &ruled()),
            json!({
                "identity": "10",
                "type": "RULED",
                "start": "1",
                "end": "2",
                "properties": {"from": 1350},
                "elementType": "relationship",
            })
        );
    }

    #[test]
    fn test_structured_nested_list_round_trip() {
        let mut props = PropertyMap::new();
        props.insert(
            "mixed".into(),
            PropertyValue::List(vec![
                PropertyValue::Integer(1),
                PropertyValue::String("two".into()),
                PropertyValue::Float(3.5),
                PropertyValue::Boolean(false),
                PropertyValue::Null,
                PropertyValue::List(vec![PropertyValue::Integer(4)]),
            ]),
        );
        props.insert("name".into(), PropertyValue::from("Gajah Mada"));
        let node = GraphNode {
            id: "9".into(),
            labels: vec!["Person".into()],
            properties: props,
        };

        let rendered = render_node(&StructuredRecord, &node);
        assert_eq!(
            rendered["properties"],
            json!({"mixed": [1, "two", 3.5, false, null, [4]], "name": "Gajah Mada"})
        );
    }

    #[test]
    fn test_temporal_values_become_iso_text() {
        let node = GraphNode::new("1")
            .with_property("day", NaiveDate::from_ymd_opt(1945, 8, 17).unwrap())
            .with_property(
                "at",
                PropertyValue::Time {
                    time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    offset: None,
                },
            )
            .with_property("took", PropertyValue::Duration(std::time::Duration::from_secs(90)));
        let rendered = render_node(&CompactRecord, &node);
        assert_eq!(
            rendered["properties"],
            json!({"at": "10:00:00", "day": "1945-08-17", "took": "PT90S"})
        );
    }

    #[test]
    fn test_every_temporal_variant_uses_its_iso_text() {
        let local = NaiveDate::from_ymd_opt(1928, 10, 28)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let values = [
            PropertyValue::Date(local.date()),
            PropertyValue::Time {
                time: local.time(),
                offset: Some(offset),
            },
            PropertyValue::LocalDateTime(local),
            PropertyValue::DateTime(offset.from_local_datetime(&local).unwrap()),
            PropertyValue::ZonedDateTime {
                datetime: local,
                zone: "Asia/Jakarta".to_string(),
            },
            PropertyValue::Duration(std::time::Duration::from_millis(1500)),
        ];

        for value in &values {
            let text = value.temporal_text().unwrap();
            assert_eq!(render_property(&StructuredRecord, value), json!(text));
            assert_eq!(render_property(&PlainText, value), text);
        }
        assert_eq!(render_property(&StructuredRecord, &PropertyValue::Null), json!(null));
    }

    #[test]
    fn test_compact_relationship_uses_endpoint_ids() {
        assert_eq!(
            render_relationship(&CompactRecord, &ruled()),
            json!({
                "id": "10",
                "type": "RULED",
                "startNode": "1",
                "endNode": "2",
                "properties": {"from": 1350},
            })
        );
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(render_node(&PlainText, &hayam_wuruk()), "Person Hayam Wuruk");
        assert_eq!(render_node(&PlainText, &GraphNode::new("4")), "#4");
        assert_eq!(render_relationship(&PlainText, &ruled()), "(#1)-[:RULED]->(#2)");

        let embedded = ruled().with_endpoints(hayam_wuruk(), majapahit());
        assert_eq!(
            render_relationship(&PlainText, &embedded),
            "(Hayam Wuruk)-[:RULED]->(Majapahit)"
        );
        assert_eq!(render_property(&PlainText, &PropertyValue::from("1990")), "1990");
    }

    #[test]
    fn test_record_to_json_and_text() {
        let record = Record::new()
            .with("k", majapahit())
            .with("count", PropertyValue::Integer(2));

        assert_eq!(
            record_to_json(&InlineNotation, &record),
            json!({"k": "(:Kingdom {name: 'Majapahit'})", "count": 2})
        );
        assert_eq!(record_to_text(&record), "k: Kingdom Majapahit | count: 2");
    }
}
