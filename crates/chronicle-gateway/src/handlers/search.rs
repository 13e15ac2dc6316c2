//! Universal search, filter options and autocomplete.

use chronicle_core::Record;
use chronicle_graph::queries::{self, SearchCriteria};
use chronicle_graph::GraphBackend;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{GatewayError, Result};
use crate::handlers::{integer_column, text_column};
use crate::types::{
    FiltersResponse, ItemKind, SearchBucket, SearchItem, SearchRequest, SearchResponse,
    Suggestion, SuggestionsResponse,
};
use crate::Gateway;

const MIN_QUERY_CHARS: usize = 2;

fn validate_query(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(GatewayError::Validation(format!(
            "Query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Page sizes and offsets go straight into SKIP/LIMIT.
fn validate_paging(request: &SearchRequest) -> Result<()> {
    let fields = [
        ("limit", request.limit),
        ("current_person_count", request.current_person_count),
        ("current_event_count", request.current_event_count),
    ];
    match fields.iter().find(|(_, value)| *value < 0) {
        Some((name, value)) => Err(GatewayError::Validation(format!(
            "{name} must not be negative, got {value}"
        ))),
        None => Ok(()),
    }
}

fn search_item(kind: ItemKind, record: &Record, context_columns: &[&str]) -> SearchItem {
    let context: Map<String, Value> = context_columns
        .iter()
        .map(|column| (column.to_string(), Value::from(text_column(record, column))))
        .collect();
    SearchItem {
        kind,
        id: integer_column(record, "id"),
        name: text_column(record, "name"),
        description: text_column(record, "description"),
        image: text_column(record, "image"),
        context,
    }
}

/// Non-null `name` column values.
fn names(rows: &[Record]) -> Vec<String> {
    rows.iter().filter_map(|r| text_column(r, "name")).collect()
}

fn bucket(items: Vec<SearchItem>) -> SearchBucket {
    SearchBucket {
        total_found: items.len(),
        data: items,
    }
}

impl<B: GraphBackend> Gateway<B> {
    /// Search persons, then events with whatever budget persons left.
    ///
    /// Both queries share one session per attempt. Pagination offsets are
    /// tracked per kind by the caller.
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let text = validate_query(&request.query)?;
        validate_paging(&request)?;
        let criteria = SearchCriteria::new(text, &request.filter_country, &request.filter_continent);
        let persons_query = request.search_type.includes_persons().then(|| {
            queries::person_search(&criteria, request.current_person_count, request.limit)
        });

        let (criteria, persons_query, request) = (&criteria, persons_query.as_ref(), &request);
        let (persons, events) = self
            .client
            .execute_with_retry(|session| async move {
                let persons = match persons_query {
                    Some(q) => session.run(q).await?,
                    None => Vec::new(),
                };

                let event_limit = queries::effective_event_limit(request.limit, persons.len());
                let events = if request.search_type.includes_events() && event_limit > 0 {
                    let q = queries::event_search(criteria, request.current_event_count, event_limit);
                    session.run(&q).await?
                } else {
                    Vec::new()
                };
                Ok((persons, events))
            })
            .await?;

        let persons: Vec<SearchItem> = persons
            .iter()
            .map(|r| search_item(ItemKind::Person, r, &["position", "country"]))
            .collect();
        let events: Vec<SearchItem> = events
            .iter()
            .map(|r| search_item(ItemKind::Event, r, &["country", "impact"]))
            .collect();
        tracing::info!(persons = persons.len(), events = events.len(), "Search completed");

        Ok(SearchResponse {
            query: request.query.clone(),
            persons: bucket(persons),
            events: bucket(events),
        })
    }

    /// Distinct country and continent names for the search filters.
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn search_filters(&self) -> Result<FiltersResponse> {
        let countries_query = queries::filter_options_countries();
        let continents_query = queries::filter_options_continents();
        let (countries, continents) = (&countries_query, &continents_query);

        let (countries, continents) = self
            .client
            .execute_with_retry(|session| async move {
                Ok((session.run(countries).await?, session.run(continents).await?))
            })
            .await?;

        Ok(FiltersResponse {
            countries: names(&countries),
            continents: names(&continents),
        })
    }

    /// Up to five person and five event names starting with `prefix`.
    #[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn suggestions(&self, prefix: &str) -> Result<SuggestionsResponse> {
        let prefix = validate_query(prefix)?;
        let rows = self.client.fetch_all(&queries::suggestions(prefix)).await?;
        let suggestions = rows
            .iter()
            .filter_map(|r| {
                Some(Suggestion {
                    text: text_column(r, "suggestion")?,
                    kind: text_column(r, "type")?,
                })
            })
            .collect();
        Ok(SuggestionsResponse { suggestions })
    }
}

#[cfg(test)]
mod tests {
    use chronicle_core::PropertyValue;
    use chronicle_graph::testing::ScriptedBackend;
    use chronicle_graph::{GraphClient, GraphError, ParamValue, RetryPolicy};
    use serde_json::json;

    use super::*;

    fn person_row(id: i64, name: &str) -> Record {
        Record::new()
            .with("id", PropertyValue::Integer(id))
            .with("name", PropertyValue::from(name))
            .with("description", PropertyValue::Null)
            .with("image", PropertyValue::Null)
            .with("position", PropertyValue::from("Mahapatih"))
            .with("country", PropertyValue::from("Indonesia"))
    }

    fn event_row(id: i64, name: &str) -> Record {
        Record::new()
            .with("id", PropertyValue::Integer(id))
            .with("name", PropertyValue::from(name))
            .with("impact", PropertyValue::from("high"))
    }

    /// Answers `persons` person rows and `events` event rows, honouring `$limit`.
    fn search_backend(persons: usize, events: usize) -> ScriptedBackend {
        ScriptedBackend::new(move |q| {
            let limit = match q.get_param("limit") {
                Some(ParamValue::Integer(l)) => *l as usize,
                _ => usize::MAX,
            };
            let rows = if q.text().contains("(p:Person)") {
                (0..persons).map(|i| person_row(i as i64, "Gajah Mada")).collect::<Vec<_>>()
            } else {
                (0..events).map(|i| event_row(100 + i as i64, "Perang Bubat")).collect()
            };
            Ok(rows.into_iter().take(limit).collect())
        })
    }

    fn gateway(backend: ScriptedBackend) -> Gateway<ScriptedBackend> {
        Gateway::new(GraphClient::with_backend(backend, RetryPolicy::default()))
    }

    fn request(body: Value) -> SearchRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_short_query_rejected_before_any_query() {
        let backend = ScriptedBackend::empty();
        let gw = gateway(backend.clone());

        let err = gw.search(request(json!({"query": " a "}))).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert_eq!(err.status_code(), 400);
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn test_negative_paging_rejected_before_any_query() {
        let backend = ScriptedBackend::empty();
        let gw = gateway(backend.clone());

        for body in [
            json!({"query": "mada", "limit": -1}),
            json!({"query": "mada", "current_person_count": -5}),
            json!({"query": "mada", "current_event_count": -2}),
        ] {
            let err = gw.search(request(body.clone())).await.unwrap_err();
            assert_eq!(err.status_code(), 400, "{body}");
        }
        assert!(backend.executed().is_empty());

        let response = gw
            .search(request(json!({"query": "mada", "limit": 0})))
            .await
            .unwrap();
        assert!(response.persons.data.is_empty());
    }

    #[tokio::test]
    async fn test_events_get_the_remaining_budget() {
        let backend = search_backend(7, 20);
        let gw = gateway(backend.clone());

        let response = gw
            .search(request(json!({"query": "mada", "limit": 10})))
            .await
            .unwrap();

        assert_eq!(response.persons.total_found, 7);
        assert_eq!(response.events.total_found, 3);

        let executed = backend.executed();
        assert_eq!(executed.len(), 2);
        assert_eq!(executed[1].get_param("limit"), Some(&ParamValue::Integer(3)));
        assert_eq!(gw.client().open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_event_query_skipped_when_persons_fill_the_page() {
        let backend = search_backend(20, 20);
        let gw = gateway(backend.clone());

        let response = gw
            .search(request(json!({"query": "mada", "limit": 5})))
            .await
            .unwrap();

        assert_eq!(response.persons.total_found, 5);
        assert!(response.events.data.is_empty());
        assert_eq!(backend.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_event_only_search_uses_event_offset() {
        let backend = search_backend(5, 5);
        let gw = gateway(backend.clone());

        let response = gw
            .search(request(json!({
                "query": "bubat",
                "search_type": "event",
                "current_event_count": 4,
            })))
            .await
            .unwrap();

        assert!(response.persons.data.is_empty());
        let executed = backend.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].get_param("offset"), Some(&ParamValue::Integer(4)));
        assert_eq!(executed[0].get_param("limit"), Some(&ParamValue::Integer(20)));
    }

    #[tokio::test]
    async fn test_search_item_shape() {
        let gw = gateway(search_backend(1, 1));
        let response = gw
            .search(request(json!({"query": "Mada", "search_type": "all"})))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&response.persons.data[0]).unwrap(),
            json!({
                "type": "person",
                "id": 0,
                "name": "Gajah Mada",
                "description": null,
                "image": null,
                "context": {"position": "Mahapatih", "country": "Indonesia"},
            })
        );
        assert_eq!(
            response.events.data[0].context,
            json!({"country": null, "impact": "high"}).as_object().cloned().unwrap()
        );
        assert_eq!(response.query, "Mada");
    }

    #[tokio::test]
    async fn test_failures_surface_as_server_errors() {
        let backend = ScriptedBackend::new(|_| Err(GraphError::Decode("bad row".into())));
        let gw = gateway(backend);

        let err = gw.search(request(json!({"query": "mada"}))).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("bad row"));
        assert_eq!(gw.client().open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_filters_skip_null_names() {
        let backend = ScriptedBackend::new(|q| {
            let value = if q.text().contains("Country") { "Indonesia" } else { "Asia" };
            Ok(vec![
                Record::new().with("name", PropertyValue::from(value)),
                Record::new().with("name", PropertyValue::Null),
            ])
        });
        let response = gateway(backend).search_filters().await.unwrap();
        assert_eq!(response.countries, ["Indonesia"]);
        assert_eq!(response.continents, ["Asia"]);
    }

    #[tokio::test]
    async fn test_suggestions() {
        let backend = ScriptedBackend::new(|_| {
            Ok(vec![
                Record::new()
                    .with("suggestion", PropertyValue::from("Sukarno"))
                    .with("type", PropertyValue::from("person")),
            ])
        });
        let gw = gateway(backend.clone());

        let response = gw.suggestions("Suk").await.unwrap();
        assert_eq!(
            response.suggestions,
            vec![Suggestion { text: "Sukarno".into(), kind: "person".into() }]
        );
        assert_eq!(
            backend.executed()[0].get_param("query"),
            Some(&ParamValue::from("suk"))
        );

        assert!(matches!(gw.suggestions("S").await, Err(GatewayError::Validation(_))));
    }
}
