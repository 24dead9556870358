use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ListHeader;
use crate::serde_util::{null_as_default, string_or_number};

/// Response of `GET /businessprocesses`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessProcessResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_processes: Vec<BusinessProcess>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sort_options: Vec<BusinessProcessSortOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessProcess {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub abbreviation: String,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_allowed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessProcessSortOption {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
