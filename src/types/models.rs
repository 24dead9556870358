use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ListHeader;
use crate::serde_util::{null_as_default, string_or_number};

/// Response of `GET /models`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsListResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<ModelView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelView {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_status: Option<String>,
    /// URI of the class list for this model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /models/{id}/classes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelClassesResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes: Vec<ModelClass>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelClass {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_businessprocess: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helptext: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of the legacy HTML model overview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveModel {
    pub model_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}
