//! Parameterized Cypher builders for search, infobox and enrichment lookups.
//!
//! Every builder is a pure function returning query text plus named
//! parameters. Text fragments spliced into a query come from the field and
//! filter constants in this module, never from request data.

use std::collections::BTreeMap;

/// Related neighbours fetched per category (persons, events, everything else).
pub const RELATED_PER_CATEGORY: usize = 5;

/// Suggestions returned per entity kind.
pub const SUGGESTIONS_PER_KIND: usize = 5;

const PERSON_SEARCH_FIELDS: &[&str] = &["p.full_name", "p.description", "pos.label", "pos.name"];
const EVENT_SEARCH_FIELDS: &[&str] = &["e.name", "e.description", "e.impact"];

const COUNTRY_FILTER: &str = "toLower(country.country) IN $filter_countries";
const CONTINENT_FILTER: &str = "toLower(continent.continent) IN $filter_continents";

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    TextList(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

/// Query text plus its named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    text: String,
    params: BTreeMap<String, ParamValue>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn get_param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}

// ── Search ───────────────────────────────────────────────────────

/// Normalized search input shared by the person and event queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    query: String,
    countries: Vec<String>,
    continents: Vec<String>,
}

impl SearchCriteria {
    /// Lowercases the query text and every filter value.
    pub fn new(query: &str, countries: &[String], continents: &[String]) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            countries: countries.iter().map(|c| c.to_lowercase()).collect(),
            continents: continents.iter().map(|c| c.to_lowercase()).collect(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// `WHERE (<fields> CONTAINS $query) [AND (<filters>)]`.
    fn where_clause(&self, fields: &[&str]) -> String {
        let matches: Vec<String> = fields
            .iter()
            .map(|f| format!("toLower({f}) CONTAINS $query"))
            .collect();
        let mut clause = format!("WHERE ({})", matches.join(" OR "));

        let mut filters = Vec::new();
        if !self.countries.is_empty() {
            filters.push(COUNTRY_FILTER);
        }
        if !self.continents.is_empty() {
            filters.push(CONTINENT_FILTER);
        }
        if !filters.is_empty() {
            clause.push_str(&format!(" AND ({})", filters.join(" AND ")));
        }
        clause
    }

    fn bind(&self, mut query: CypherQuery) -> CypherQuery {
        query = query.param("query", self.query.clone());
        if !self.countries.is_empty() {
            query = query.param("filter_countries", self.countries.clone());
        }
        if !self.continents.is_empty() {
            query = query.param("filter_continents", self.continents.clone());
        }
        query
    }
}

/// Persons matching on name, description or held position.
///
/// Columns: `id`, `name`, `description`, `image`, `position`, `country`.
pub fn person_search(criteria: &SearchCriteria, offset: i64, limit: i64) -> CypherQuery {
    let text = format!(
        "MATCH (p:Person)
         OPTIONAL MATCH (p)-[:HELD_POSITION]->(pos:Position)
         OPTIONAL MATCH (p)-[:BORN_IN]->(c:City)-[:LOCATED_IN]->(country:Country)-[:LOCATED_IN]->(continent:Continent)
         {}
         WITH DISTINCT p, pos, country, continent
         RETURN id(p) AS id,
                p.full_name AS name,
                p.description AS description,
                p.image_url AS image,
                coalesce(pos.label, pos.name) AS position,
                country.country AS country
         SKIP $offset
         LIMIT $limit",
        criteria.where_clause(PERSON_SEARCH_FIELDS)
    );
    criteria
        .bind(CypherQuery::new(text))
        .param("offset", offset)
        .param("limit", limit)
}

/// Events matching on name, description or impact.
///
/// Columns: `id`, `name`, `description`, `image`, `impact`, `country`.
pub fn event_search(criteria: &SearchCriteria, offset: i64, limit: i64) -> CypherQuery {
    let text = format!(
        "MATCH (e:Event)
         OPTIONAL MATCH (e)-[:HELD_IN]->(country:Country)-[:LOCATED_IN]->(continent:Continent)
         {}
         WITH DISTINCT e, country, continent
         RETURN id(e) AS id,
                e.name AS name,
                e.description AS description,
                e.image_url AS image,
                e.impact AS impact,
                country.country AS country
         SKIP $offset
         LIMIT $limit",
        criteria.where_clause(EVENT_SEARCH_FIELDS)
    );
    criteria
        .bind(CypherQuery::new(text))
        .param("offset", offset)
        .param("limit", limit)
}

/// Budget left for events once persons have taken their share.
pub fn effective_event_limit(limit: i64, persons_found: usize) -> i64 {
    let found = i64::try_from(persons_found).unwrap_or(i64::MAX);
    limit.saturating_sub(found).max(0)
}

/// Distinct country names, column `name`.
pub fn filter_options_countries() -> CypherQuery {
    CypherQuery::new(
        "MATCH (c:Country)
         RETURN DISTINCT c.country AS name
         ORDER BY name",
    )
}

/// Distinct continent names, column `name`.
pub fn filter_options_continents() -> CypherQuery {
    CypherQuery::new(
        "MATCH (cont:Continent)
         RETURN DISTINCT cont.continent AS name
         ORDER BY name",
    )
}

/// Person and event names starting with `prefix`. Columns `suggestion`, `type`.
pub fn suggestions(prefix: &str) -> CypherQuery {
    let text = format!(
        "MATCH (p:Person)
         WHERE toLower(p.full_name) STARTS WITH $query
         RETURN p.full_name AS suggestion, 'person' AS type
         LIMIT {SUGGESTIONS_PER_KIND}
         UNION
         MATCH (e:Event)
         WHERE toLower(e.name) STARTS WITH $query
         RETURN e.name AS suggestion, 'event' AS type
         LIMIT {SUGGESTIONS_PER_KIND}"
    );
    CypherQuery::new(text).param("query", prefix.trim().to_lowercase())
}

// ── Infobox ──────────────────────────────────────────────────────

/// A single node by numeric identity, column `n`.
pub fn node_by_id(id: i64) -> CypherQuery {
    CypherQuery::new("MATCH (n) WHERE id(n) = $id RETURN n").param("id", id)
}

/// Neighbours of a node, capped per category.
///
/// Returns one row with column `all_related`: a list of maps
/// `{element_id, relationship, labels, node}`, persons first, then events,
/// then everything else, each ordered by labels and `name`.
pub fn related_nodes(id: i64) -> CypherQuery {
    let text = format!(
        "MATCH (n)-[r]-(m)
         WHERE id(n) = $id
         WITH m, type(r) AS relationship, labels(m) AS labels
         ORDER BY labels, m.name
         WITH
           collect(CASE WHEN 'Person' IN labels
             THEN {{element_id: toString(id(m)), relationship: relationship, labels: labels, node: m}} END) AS persons,
           collect(CASE WHEN 'Event' IN labels
             THEN {{element_id: toString(id(m)), relationship: relationship, labels: labels, node: m}} END) AS events,
           collect(CASE WHEN NOT ('Person' IN labels OR 'Event' IN labels)
             THEN {{element_id: toString(id(m)), relationship: relationship, labels: labels, node: m}} END) AS others
         RETURN persons[0..{RELATED_PER_CATEGORY}]
              + events[0..{RELATED_PER_CATEGORY}]
              + others[0..{RELATED_PER_CATEGORY}] AS all_related"
    );
    CypherQuery::new(text).param("id", id)
}

// ── Enrichment ───────────────────────────────────────────────────

/// Persons not yet linked to a dynasty. Columns `name`, `article_id`, `full_name`.
pub fn persons_missing_dynasty(offset: i64, limit: i64) -> CypherQuery {
    CypherQuery::new(
        "MATCH (p:Person)
         WHERE NOT (p)-[:MEMBER_OF_DYNASTY]->(:Dynasty)
         RETURN p.name AS name, p.article_id AS article_id, p.full_name AS full_name
         SKIP $offset
         LIMIT $limit",
    )
    .param("offset", offset)
    .param("limit", limit)
}

/// Events to run through enrichment. Columns `name`, `event_id`.
pub fn events_for_enrichment(limit: i64) -> CypherQuery {
    CypherQuery::new(
        "MATCH (e:Event)
         RETURN e.name AS name, e.event_id AS event_id
         LIMIT $limit",
    )
    .param("limit", limit)
}
