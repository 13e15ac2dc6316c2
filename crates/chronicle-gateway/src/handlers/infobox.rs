//! Infobox: one node's display properties plus a capped set of neighbours.

use chronicle_core::{GraphNode, GraphValue, PropertyMap, PropertyValue, Record};
use chronicle_graph::properties::{merge_date_parts, strip_internal};
use chronicle_graph::serialize::{render_property, StructuredRecord};
use chronicle_graph::{queries, GraphBackend, GraphError};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{GatewayError, Result};
use crate::types::{InfoboxResponse, RelatedNode};
use crate::Gateway;

/// Node identities are the database's non-negative integer ids.
fn parse_element_id(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Validation(
            "Invalid element_id: cannot be empty.".to_string(),
        ));
    }
    trimmed
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| {
            GatewayError::Validation(format!(
                "Invalid element_id: {trimmed} is not a non-negative integer."
            ))
        })
}

fn display_properties(properties: &PropertyMap) -> Value {
    render_property(&StructuredRecord, &PropertyValue::Map(strip_internal(properties)))
}

/// One entry of the `all_related` list; `None` for the nulls the capped
/// collections leave behind.
fn related_node(value: &GraphValue) -> Option<RelatedNode> {
    let GraphValue::Map(entry) = value else {
        return None;
    };
    let node = entry.get("node").and_then(GraphValue::as_node)?;
    Some(RelatedNode {
        element_id: entry
            .get("element_id")
            .and_then(GraphValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| node.id.clone()),
        relationship: entry
            .get("relationship")
            .and_then(GraphValue::as_str)
            .unwrap_or_default()
            .to_string(),
        labels: node.labels.clone(),
        properties: display_properties(&node.properties),
    })
}

fn related_nodes(rows: &[Record]) -> Vec<RelatedNode> {
    rows.iter()
        .filter_map(|r| match r.get("all_related") {
            Some(GraphValue::List(items)) => Some(items.iter().filter_map(related_node)),
            _ => None,
        })
        .flatten()
        .collect()
}

impl<B: GraphBackend> Gateway<B> {
    /// Properties of the node with `element_id`, internal fields stripped
    /// and date parts merged, plus up to five persons, five events and five
    /// other neighbours.
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4(), element_id))]
    pub async fn infobox(&self, element_id: &str) -> Result<InfoboxResponse> {
        let id = parse_element_id(element_id)?;
        tracing::Span::current().record("element_id", id);

        let (node_query, related_query) = (queries::node_by_id(id), queries::related_nodes(id));
        let (node_query, related_query) = (&node_query, &related_query);
        let found = self
            .client
            .execute_with_retry(|session| async move {
                let Some(record) = session.single(node_query).await? else {
                    return Ok(None);
                };
                let related = session.run(related_query).await?;
                Ok(Some((record, related)))
            })
            .await?;

        let Some((record, related)) = found else {
            return Err(GatewayError::NotFound(format!(
                "Node with element_id {id} not found"
            )));
        };
        let node: &GraphNode = record
            .get("n")
            .and_then(GraphValue::as_node)
            .ok_or_else(|| GraphError::Decode("column n is not a node".to_string()))?;

        let properties = merge_date_parts(strip_internal(&node.properties));
        let related_nodes = related_nodes(&related);
        tracing::debug!(related = related_nodes.len(), "Infobox assembled");

        Ok(InfoboxResponse {
            status: "ok",
            element_id: id.to_string(),
            labels: node.labels.clone(),
            properties: render_property(&StructuredRecord, &PropertyValue::Map(properties)),
            related_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chronicle_graph::testing::ScriptedBackend;
    use chronicle_graph::{GraphClient, ParamValue, RetryPolicy};
    use serde_json::json;

    use super::*;

    fn gateway(backend: ScriptedBackend) -> Gateway<ScriptedBackend> {
        Gateway::new(GraphClient::with_backend(backend, RetryPolicy::default()))
    }

    fn related_entry(id: &str, relationship: &str, node: GraphNode) -> GraphValue {
        let mut entry = BTreeMap::new();
        entry.insert("element_id".to_string(), GraphValue::from(PropertyValue::from(id)));
        entry.insert(
            "relationship".to_string(),
            GraphValue::from(PropertyValue::from(relationship)),
        );
        entry.insert(
            "labels".to_string(),
            GraphValue::List(
                node.labels
                    .iter()
                    .map(|l| GraphValue::from(PropertyValue::from(l.as_str())))
                    .collect(),
            ),
        );
        entry.insert("node".to_string(), GraphValue::Node(node));
        GraphValue::Map(entry)
    }

    fn infobox_backend() -> ScriptedBackend {
        ScriptedBackend::new(|q| {
            if q.text().contains("AS all_related") {
                let kingdom = GraphNode::new("2")
                    .with_label("Kingdom")
                    .with_property("name", "Majapahit")
                    .with_property("embedding", vec![0.5, 0.25]);
                let all_related = GraphValue::List(vec![
                    related_entry("2", "SERVED", kingdom),
                    GraphValue::from(PropertyValue::Null),
                ]);
                return Ok(vec![Record::new().with("all_related", all_related)]);
            }
            let node = GraphNode::new("1")
                .with_label("Person")
                .with_property("full_name", "Gajah Mada")
                .with_property("date", "12")
                .with_property("month", "unknown")
                .with_property("year", "1290")
                .with_property("searchable_text", "gajah mada mahapatih")
                .with_property("article_id", "a-1");
            Ok(vec![Record::new().with("n", node)])
        })
    }

    #[tokio::test]
    async fn test_infobox_response() {
        let backend = infobox_backend();
        let response = gateway(backend.clone()).infobox(" 1 ").await.unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "ok",
                "element_id": "1",
                "labels": ["Person"],
                "properties": {"date": "12 1290", "full_name": "Gajah Mada"},
                "related_nodes": [{
                    "element_id": "2",
                    "relationship": "SERVED",
                    "labels": ["Kingdom"],
                    "properties": {"name": "Majapahit"},
                }],
            })
        );

        let executed = backend.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed
            .iter()
            .all(|q| q.get_param("id") == Some(&ParamValue::Integer(1))));
    }

    #[tokio::test]
    async fn test_invalid_ids_rejected() {
        let backend = ScriptedBackend::empty();
        let gw = gateway(backend.clone());

        for raw in ["", "  ", "abc", "-3", "4:abc:7"] {
            let err = gw.infobox(raw).await.unwrap_err();
            assert_eq!(err.status_code(), 400, "{raw:?}");
        }
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn test_missing_node_is_not_found() {
        let backend = ScriptedBackend::empty();
        let gw = gateway(backend.clone());

        let err = gw.infobox("99").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
        // No neighbour lookup for a missing node.
        assert_eq!(backend.executed().len(), 1);
        assert_eq!(gw.client().open_sessions(), 0);
    }
}
