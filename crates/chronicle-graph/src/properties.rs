//! Display policy for node properties returned to the front end.

use chronicle_core::{PropertyMap, PropertyValue};

use crate::serialize::{render_property, PlainText};

/// Internal, embedding-only and cross-reference properties never shown.
pub const EXCLUDED_PROPERTIES: &[&str] = &[
    "embedding",
    "embedding_updated",
    "searchable_text",
    "point_in_time",
    "article_id",
    "event_id",
    "primary_category_qid",
    "primary_category_qids",
    "described_by_source_qids",
    "location_qids",
    "participant_qids",
    "part_of_qids",
    "effect_qids",
    "has_part_qids",
    "cause_qids",
];

/// Date components that carry no information. Compared case-insensitively.
pub const DATE_PLACEHOLDERS: &[&str] = &["", "unknown", "n/a", "na", "none", "null", "unk", "-", "0", "00"];

const DAY_KEY: &str = "date";
const MONTH_KEY: &str = "month";
const YEAR_KEY: &str = "year";

pub fn is_excluded(key: &str) -> bool {
    EXCLUDED_PROPERTIES.contains(&key)
}

/// Remove excluded keys, including inside nested maps and lists.
pub fn strip_internal(properties: &PropertyMap) -> PropertyMap {
    properties
        .iter()
        .filter(|(key, _)| !is_excluded(key))
        .map(|(key, value)| (key.clone(), strip_value(value)))
        .collect()
}

fn strip_value(value: &PropertyValue) -> PropertyValue {
    match value {
        PropertyValue::Map(entries) => PropertyValue::Map(strip_internal(entries)),
        PropertyValue::List(items) => PropertyValue::List(items.iter().map(strip_value).collect()),
        other => other.clone(),
    }
}

fn is_placeholder(part: &str) -> bool {
    let lowered = part.to_lowercase();
    DATE_PLACEHOLDERS.contains(&lowered.as_str())
}

/// Fold separate day/month/year properties into one `date` string.
///
/// Surviving components are joined day-month-year with single spaces and
/// stored under `date`; `month` and `year` are removed. When nothing
/// survives, all three keys are removed.
pub fn merge_date_parts(mut properties: PropertyMap) -> PropertyMap {
    let parts: Vec<String> = [DAY_KEY, MONTH_KEY, YEAR_KEY]
        .iter()
        .filter_map(|key| properties.get(*key))
        .map(|value| render_property(&PlainText, value).trim().to_string())
        .filter(|part| !is_placeholder(part))
        .collect();

    properties.remove(MONTH_KEY);
    properties.remove(YEAR_KEY);
    if parts.is_empty() {
        properties.remove(DAY_KEY);
    } else {
        properties.insert(DAY_KEY.to_string(), PropertyValue::String(parts.join(" ")));
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, PropertyValue)]) -> PropertyMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_skips_placeholder_month() {
        let merged = merge_date_parts(props(&[
            ("date", "12".into()),
            ("month", "unknown".into()),
            ("year", "1990".into()),
            ("name", "Sumpah Pemuda".into()),
        ]));
        assert_eq!(
            merged,
            props(&[("date", "12 1990".into()), ("name", "Sumpah Pemuda".into())])
        );
    }

    #[test]
    fn test_merge_removes_all_placeholder_parts() {
        let merged = merge_date_parts(props(&[
            ("date", "n/a".into()),
            ("month", "".into()),
            ("year", "0".into()),
        ]));
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_trims_and_ignores_case() {
        let merged = merge_date_parts(props(&[
            ("date", " 17 ".into()),
            ("month", "August".into()),
            ("year", PropertyValue::Integer(1945)),
        ]));
        assert_eq!(merged.get("date"), Some(&PropertyValue::from("17 August 1945")));

        let merged = merge_date_parts(props(&[("month", "UNK".into()), ("year", "NULL".into())]));
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_with_only_year() {
        let merged = merge_date_parts(props(&[("year", "1293".into())]));
        assert_eq!(merged, props(&[("date", "1293".into())]));
    }

    #[test]
    fn test_merge_without_date_fields_is_identity() {
        let input = props(&[("name", "Kertanegara".into())]);
        assert_eq!(merge_date_parts(input.clone()), input);
    }

    #[test]
    fn test_strip_internal_recurses() {
        let nested = PropertyValue::Map(props(&[
            ("embedding", PropertyValue::from(vec![0.1, 0.2])),
            ("label", "inner".into()),
        ]));
        let stripped = strip_internal(&props(&[
            ("article_id", "a-1".into()),
            ("cause_qids", vec!["Q1"].into()),
            ("name", "Perang Bubat".into()),
            ("meta", PropertyValue::List(vec![nested])),
        ]));

        assert_eq!(
            stripped,
            props(&[
                ("name", "Perang Bubat".into()),
                (
                    "meta",
                    PropertyValue::List(vec![PropertyValue::Map(props(&[("label", "inner".into())]))])
                ),
            ])
        );
    }
}
