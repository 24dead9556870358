use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::ListHeader;
use crate::serde_util::{null_as_default, opt_string_or_number, string_or_number};

/// Query against the `/items` search endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSearchRequest {
    pub query: String,
    pub filter_queries: Vec<String>,
    pub sort: String,
    pub start: u64,
    pub rows: u64,
    pub fields: String,
    pub facet: bool,
    pub facet_fields: Vec<String>,
    pub highlight: bool,
    pub highlight_fields: String,
}

impl Default for AngleSearchRequest {
    fn default() -> Self {
        Self {
            query: "*:*".to_string(),
            filter_queries: Vec::new(),
            sort: String::new(),
            start: 0,
            rows: 10,
            fields: "*".to_string(),
            facet: false,
            facet_fields: Vec::new(),
            highlight: false,
            highlight_fields: String::new(),
        }
    }
}

impl AngleSearchRequest {
    /// Query parameters in the order the server expects them.
    ///
    /// `start`, `rows` and `fl` are omitted at their default values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.query.clone()),
            ("caching", "false".to_string()),
            ("viewmode", "basic".to_string()),
        ];

        if self.start > 0 {
            pairs.push(("start", self.start.to_string()));
        }
        if self.rows != 10 {
            pairs.push(("rows", self.rows.to_string()));
        }
        if !self.fields.is_empty() && self.fields != "*" {
            pairs.push(("fl", self.fields.clone()));
        }
        if !self.sort.is_empty() {
            pairs.push(("sort", self.sort.clone()));
        }
        for fq in &self.filter_queries {
            pairs.push(("fq", fq.clone()));
        }
        if self.facet {
            pairs.push(("facet", "true".to_string()));
            for field in &self.facet_fields {
                pairs.push(("facet.field", field.clone()));
            }
        }
        if self.highlight {
            pairs.push(("highlight", "true".to_string()));
            if !self.highlight_fields.is_empty() {
                pairs.push(("hl.fl", self.highlight_fields.clone()));
            }
        }

        pairs
    }
}

/// Response of the `/items` search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AngleSearchResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<AngleDocument>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facets: Vec<FacetCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sort_options: Vec<AngleSortOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub advanced_filters: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_counts: Option<FacetCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighting: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A search hit: an angle, dashboard or other item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AngleDocument {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetCounts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub facet_queries: BTreeMap<String, Value>,
    /// Flat `[key, count, key, count, ...]` lists keyed by field
    #[serde(default, deserialize_with = "null_as_default")]
    pub facet_fields: BTreeMap<String, Vec<Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facet_ranges: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facet_intervals: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facet_heatmaps: BTreeMap<String, Value>,
}

impl FacetCounts {
    /// Fold a facet list into a key → count map.
    ///
    /// A trailing key without a count is dropped, as are non-integer counts.
    pub fn field_counts(&self, field: &str) -> Option<BTreeMap<String, i64>> {
        let list = self.facet_fields.get(field)?;
        let mut counts = BTreeMap::new();

        for pair in list.chunks_exact(2) {
            let key = match &pair[0] {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let count = match &pair[1] {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            if let Some(count) = count {
                counts.insert(key, count);
            }
        }

        Some(counts)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetCategory {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub facet_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: Vec<FacetFilter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetFilter {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AngleSortOption {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Field filter rendered into a Solr-style `fq` clause
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AngleFilter {
    /// Field to filter on
    pub field: String,
    /// Value to compare against (unused for range)
    #[serde(default)]
    pub value: String,
    /// equals, contains, startswith, endswith, range or not (default: equals)
    #[serde(default)]
    pub operator: Option<String>,
    /// Lower bound for range filters
    #[serde(default)]
    pub from: Option<String>,
    /// Upper bound for range filters
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Range,
    Not,
}

impl FilterOperator {
    /// Case-insensitive; anything unrecognised means equals
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "range" => FilterOperator::Range,
            "not" => FilterOperator::Not,
            _ => FilterOperator::Equals,
        }
    }
}

impl AngleFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn range(field: impl Into<String>, from: Option<String>, to: Option<String>) -> Self {
        Self {
            field: field.into(),
            operator: Some("range".to_string()),
            from,
            to,
            ..Default::default()
        }
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
            .as_deref()
            .map(FilterOperator::parse)
            .unwrap_or(FilterOperator::Equals)
    }

    pub fn to_query(&self) -> String {
        let (field, value) = (&self.field, &self.value);
        match self.operator() {
            FilterOperator::Equals => format!("{}:\"{}\"", field, value),
            FilterOperator::Contains => format!("{}:*{}*", field, value),
            FilterOperator::StartsWith => format!("{}:{}*", field, value),
            FilterOperator::EndsWith => format!("{}:*{}", field, value),
            FilterOperator::Range => format!(
                "{}:[{} TO {}]",
                field,
                self.from.as_deref().unwrap_or("*"),
                self.to.as_deref().unwrap_or("*")
            ),
            FilterOperator::Not => format!("-{}:\"{}\"", field, value),
        }
    }
}

/// Summary built from faceted searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngleStatistics {
    pub total_angles: u64,
    pub categories: BTreeMap<String, i64>,
    pub status_distribution: BTreeMap<String, i64>,
    pub recent_angles: u64,
    pub last_updated: DateTime<Utc>,
}
