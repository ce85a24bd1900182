//! Free-text search filter
//!
//! Translates the dashboard's one `q` query parameter into a structured
//! predicate. Two grammars share the parameter:
//!
//! - `createdAt:range:<start>_<end>` filters on the creation timestamp,
//!   both boundaries inclusive, the end forced to 23:59:59.999 UTC;
//! - anything else is an OR-search: case-insensitive substring match over
//!   every searchable text field, plus numeric equality over every
//!   searchable number field when the query parses as a finite number.
//!
//! Parsing is total: no input ever errors, an absent or unusable query
//! matches every record.

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};

use crate::schema::ResourceSchema;
use crate::store::Document;

const CREATED_RANGE_PREFIX: &str = "createdAt:range:";

#[derive(Debug, Clone)]
pub enum Filter {
    /// No filtering; every record matches.
    MatchAll,
    /// Creation timestamp within `[start, end]` inclusive.
    CreatedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Disjunction over the schema's searchable fields.
    Search {
        pattern: Regex,
        text_fields: Vec<String>,
        number: Option<f64>,
        numeric_fields: Vec<String>,
    },
}

impl Filter {
    /// Builds a predicate from the raw `q` parameter and the resource's
    /// searchable field lists. Never fails.
    pub fn parse(raw: Option<&str>, schema: &ResourceSchema) -> Self {
        let Some(raw) = raw else {
            return Self::MatchAll;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::MatchAll;
        }

        // Date-range grammar takes precedence over free-text search. A pair
        // that does not fully parse contributes no date filter at all.
        if let Some(range) = raw.strip_prefix(CREATED_RANGE_PREFIX) {
            return match parse_range(range) {
                Some((start, end)) => Self::CreatedRange { start, end },
                None => Self::MatchAll,
            };
        }

        let text_fields: Vec<String> = schema
            .searchable_text_fields()
            .map(|f| f.name.clone())
            .collect();

        let number = raw.parse::<f64>().ok().filter(|n| n.is_finite());
        let numeric_fields: Vec<String> = if number.is_some() {
            schema
                .searchable_numeric_fields()
                .map(|f| f.name.clone())
                .collect()
        } else {
            Vec::new()
        };

        if text_fields.is_empty() && numeric_fields.is_empty() {
            return Self::MatchAll;
        }

        let Ok(pattern) = RegexBuilder::new(&regex::escape(raw))
            .case_insensitive(true)
            .build()
        else {
            // Unreachable for escaped input; stay total regardless.
            return Self::MatchAll;
        };

        Self::Search {
            pattern,
            text_fields,
            number,
            numeric_fields,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::MatchAll => true,
            Self::CreatedRange { start, end } => {
                doc.created_at >= *start && doc.created_at <= *end
            }
            Self::Search {
                pattern,
                text_fields,
                number,
                numeric_fields,
            } => {
                let text_hit = text_fields.iter().any(|field| {
                    doc.fields
                        .get(field)
                        .and_then(|v| v.as_str())
                        .is_some_and(|s| pattern.is_match(s))
                });
                if text_hit {
                    return true;
                }
                match number {
                    Some(n) => numeric_fields.iter().any(|field| {
                        doc.fields
                            .get(field)
                            .and_then(|v| v.as_f64())
                            .is_some_and(|v| v == *n)
                    }),
                    None => false,
                }
            }
        }
    }
}

/// Parses `<start>_<end>` where both tokens are `YYYY-MM-DD` calendar dates.
/// Only a fully-parseable pair activates the range clause.
fn parse_range(raw: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start_raw, end_raw) = raw.split_once('_')?;
    let start_date = NaiveDate::parse_from_str(start_raw.trim(), "%Y-%m-%d").ok()?;
    let end_date = NaiveDate::parse_from_str(end_raw.trim(), "%Y-%m-%d").ok()?;

    let start = start_date.and_hms_opt(0, 0, 0)?.and_utc();
    // End boundary pinned to the last representable millisecond of the day.
    let end = end_date.and_hms_milli_opt(23, 59, 59, 999)?.and_utc();
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, ResourceSchema};
    use chrono::TimeZone;
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "reviews",
            vec![
                FieldDescriptor::text("title").searchable(),
                FieldDescriptor::text("email").searchable(),
                FieldDescriptor::number("rating").searchable(),
            ],
        )
    }

    fn doc(fields: serde_json::Value, created: &str) -> Document {
        let created = created.parse::<DateTime<Utc>>().unwrap();
        Document {
            id: "d1".to_string(),
            fields: fields.as_object().cloned().unwrap(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn absent_and_empty_queries_match_all() {
        assert!(matches!(Filter::parse(None, &schema()), Filter::MatchAll));
        assert!(matches!(
            Filter::parse(Some("   "), &schema()),
            Filter::MatchAll
        ));
    }

    #[test]
    fn search_is_case_insensitive_or_over_text_fields() {
        let filter = Filter::parse(Some("foo"), &schema());

        let by_title = doc(json!({ "title": "My FOO story", "email": "x@y.z" }), "2024-01-10T00:00:00Z");
        let by_email = doc(json!({ "title": "other", "email": "foo@y.z" }), "2024-01-10T00:00:00Z");
        let neither = doc(json!({ "title": "other", "email": "x@y.z" }), "2024-01-10T00:00:00Z");

        assert!(filter.matches(&by_title));
        assert!(filter.matches(&by_email));
        assert!(!filter.matches(&neither));
    }

    #[test]
    fn regex_metacharacters_in_query_are_literal() {
        let filter = Filter::parse(Some("a.b+c"), &schema());
        assert!(filter.matches(&doc(json!({ "title": "xa.b+cy" }), "2024-01-10T00:00:00Z")));
        assert!(!filter.matches(&doc(json!({ "title": "aXbbc" }), "2024-01-10T00:00:00Z")));
    }

    #[test]
    fn numeric_query_also_matches_numeric_fields() {
        let filter = Filter::parse(Some("5"), &schema());
        assert!(filter.matches(&doc(json!({ "title": "zzz", "rating": 5 }), "2024-01-10T00:00:00Z")));
        assert!(filter.matches(&doc(json!({ "title": "top 5 list" }), "2024-01-10T00:00:00Z")));
        assert!(!filter.matches(&doc(json!({ "title": "zzz", "rating": 4 }), "2024-01-10T00:00:00Z")));
    }

    #[test]
    fn created_range_is_inclusive_with_end_of_day_boundary() {
        let filter = Filter::parse(Some("createdAt:range:2024-01-01_2024-01-31"), &schema());
        let Filter::CreatedRange { start, end } = &filter else {
            panic!("expected range filter");
        };
        assert_eq!(*start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            *end,
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );

        assert!(filter.matches(&doc(json!({}), "2024-01-01T00:00:00Z")));
        assert!(filter.matches(&doc(json!({}), "2024-01-31T23:59:59.999Z")));
        assert!(!filter.matches(&doc(json!({}), "2024-02-01T00:00:00Z")));
    }

    #[test]
    fn malformed_range_degrades_to_match_all() {
        for raw in [
            "createdAt:range:2024-01-01",
            "createdAt:range:2024-01-01_bogus",
            "createdAt:range:_",
        ] {
            assert!(
                matches!(Filter::parse(Some(raw), &schema()), Filter::MatchAll),
                "{raw}"
            );
        }
    }

    #[test]
    fn no_searchable_fields_and_non_numeric_query_matches_all() {
        let bare = ResourceSchema::new("bare", vec![FieldDescriptor::boolean("flag")]);
        assert!(matches!(
            Filter::parse(Some("anything"), &bare),
            Filter::MatchAll
        ));
    }
}
