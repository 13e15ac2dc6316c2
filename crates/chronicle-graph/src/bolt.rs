//! Decoding of Bolt wire values into the closed value model.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chronicle_core::{
    GraphNode, GraphPath, GraphRelationship, GraphValue, PropertyMap, PropertyValue, Record,
};
use neo4rs::{BoltMap, BoltNode, BoltPath, BoltRelation, BoltType, BoltUnboundedRelation, Row};

use crate::client::GraphError;

/// Decode one result row. Columns come back ordered by name.
pub(crate) fn decode_row(row: &Row) -> Result<Record, GraphError> {
    let columns: BTreeMap<String, BoltType> = row
        .to()
        .map_err(|e| GraphError::Decode(format!("row: {e}")))?;

    let mut record = Record::new();
    for (column, value) in columns {
        record.push(column, decode_value(value)?);
    }
    Ok(record)
}

fn decode_value(value: BoltType) -> Result<GraphValue, GraphError> {
    match value {
        BoltType::Node(node) => Ok(GraphValue::Node(decode_node(node)?)),
        BoltType::Relation(rel) => Ok(GraphValue::Relationship(decode_relation(rel)?)),
        BoltType::Path(path) => Ok(GraphValue::Path(decode_path(path)?)),
        BoltType::List(list) => list
            .value
            .into_iter()
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(GraphValue::List),
        BoltType::Map(map) => map
            .value
            .into_iter()
            .map(|(k, v)| Ok((k.value, decode_value(v)?)))
            .collect::<Result<BTreeMap<_, _>, GraphError>>()
            .map(GraphValue::Map),
        other => decode_property(other).map(GraphValue::Property),
    }
}

fn decode_property(value: BoltType) -> Result<PropertyValue, GraphError> {
    let decoded = match value {
        BoltType::Null(_) => PropertyValue::Null,
        BoltType::Boolean(b) => PropertyValue::Boolean(b.value),
        BoltType::Integer(i) => PropertyValue::Integer(i.value),
        BoltType::Float(f) => PropertyValue::Float(f.value),
        BoltType::String(s) => PropertyValue::String(s.value),
        BoltType::List(list) => PropertyValue::List(
            list.value
                .into_iter()
                .map(decode_property)
                .collect::<Result<_, _>>()?,
        ),
        BoltType::Map(map) => PropertyValue::Map(decode_properties(map)?),
        BoltType::Date(_) => PropertyValue::Date(temporal::<NaiveDate>(value)?),
        BoltType::Time(_) | BoltType::LocalTime(_) => {
            let (time, offset) = temporal::<(NaiveTime, Option<FixedOffset>)>(value)?;
            PropertyValue::Time { time, offset }
        }
        BoltType::LocalDateTime(_) => {
            PropertyValue::LocalDateTime(temporal::<NaiveDateTime>(value)?)
        }
        BoltType::DateTime(_) => PropertyValue::DateTime(temporal::<DateTime<FixedOffset>>(value)?),
        BoltType::DateTimeZoneId(_) => {
            let (datetime, zone) = temporal::<(NaiveDateTime, String)>(value)?;
            PropertyValue::ZonedDateTime { datetime, zone }
        }
        BoltType::Duration(_) => PropertyValue::Duration(temporal::<Duration>(value)?),
        other => {
            return Err(GraphError::Decode(format!(
                "unsupported property value: {other:?}"
            )))
        }
    };
    Ok(decoded)
}

fn temporal<T>(value: BoltType) -> Result<T, GraphError>
where
    T: TryFrom<BoltType>,
    T::Error: std::fmt::Display,
{
    T::try_from(value).map_err(|e| GraphError::Decode(format!("temporal value: {e}")))
}

fn decode_properties(map: BoltMap) -> Result<PropertyMap, GraphError> {
    map.value
        .into_iter()
        .map(|(k, v)| Ok((k.value, decode_property(v)?)))
        .collect()
}

fn decode_labels(labels: neo4rs::BoltList) -> Vec<String> {
    labels
        .value
        .into_iter()
        .filter_map(|label| match label {
            BoltType::String(s) => Some(s.value),
            _ => None,
        })
        .collect()
}

fn decode_node(node: BoltNode) -> Result<GraphNode, GraphError> {
    Ok(GraphNode {
        id: node.id.value.to_string(),
        labels: decode_labels(node.labels),
        properties: decode_properties(node.properties)?,
    })
}

fn decode_relation(rel: BoltRelation) -> Result<GraphRelationship, GraphError> {
    let mut decoded = GraphRelationship::new(
        rel.id.value.to_string(),
        rel.typ.value,
        rel.start_node_id.value.to_string(),
        rel.end_node_id.value.to_string(),
    );
    decoded.properties = decode_properties(rel.properties)?;
    Ok(decoded)
}

/// Walk a Bolt path using its index sequence.
///
/// `indices` holds (relationship, node) pairs: the relationship index is
/// 1-based and negative when traversed against its direction; the node
/// index points into the path's distinct node list.
fn decode_path(path: BoltPath) -> Result<GraphPath, GraphError> {
    let nodes = path
        .nodes
        .value
        .into_iter()
        .map(|n| match n {
            BoltType::Node(node) => decode_node(node),
            other => Err(GraphError::Decode(format!("path node: {other:?}"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rels = path
        .rels
        .value
        .into_iter()
        .map(|r| match r {
            BoltType::UnboundedRelation(rel) => decode_unbounded(rel),
            other => Err(GraphError::Decode(format!("path relationship: {other:?}"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let indices = path
        .indices
        .value
        .into_iter()
        .map(|i| match i {
            BoltType::Integer(i) => Ok(i.value),
            other => Err(GraphError::Decode(format!("path index: {other:?}"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let first = nodes
        .first()
        .cloned()
        .ok_or_else(|| GraphError::Decode("path without nodes".to_string()))?;
    if indices.len() % 2 != 0 {
        return Err(GraphError::Decode("odd path index sequence".to_string()));
    }

    let mut walk_nodes = vec![first];
    let mut walk_rels = Vec::with_capacity(indices.len() / 2);
    for pair in indices.chunks(2) {
        let (rel_index, node_index) = (pair[0], pair[1]);
        let (rel_id, rel_type, properties) = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| rels.get(i))
            .ok_or_else(|| GraphError::Decode(format!("path relationship index {rel_index}")))?;
        let next = usize::try_from(node_index)
            .ok()
            .and_then(|i| nodes.get(i))
            .cloned()
            .ok_or_else(|| GraphError::Decode(format!("path node index {node_index}")))?;
        let prev = walk_nodes[walk_nodes.len() - 1].clone();

        let (start, end) = if rel_index > 0 {
            (prev, next.clone())
        } else {
            (next.clone(), prev)
        };
        let mut rel = GraphRelationship::new(rel_id.clone(), rel_type.clone(), "", "")
            .with_endpoints(start, end);
        rel.properties = properties.clone();

        walk_rels.push(rel);
        walk_nodes.push(next);
    }

    Ok(GraphPath::new(walk_nodes, walk_rels)?)
}

fn decode_unbounded(
    rel: BoltUnboundedRelation,
) -> Result<(String, String, PropertyMap), GraphError> {
    Ok((
        rel.id.value.to_string(),
        rel.typ.value,
        decode_properties(rel.properties)?,
    ))
}
