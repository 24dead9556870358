use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_util::{null_as_default, string_or_number};

/// Response of `GET /dashboards/{id}` (or any dashboard URI)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_lang_name: Vec<LocalizedText>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_lang_description: Vec<LocalizedText>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub widget_definitions: Vec<WidgetDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardResponse {
    /// Explicit name, else the first localized name
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.multi_lang_name.first().map(|t| t.text.as_str()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lang: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetDefinition {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Layout and presentation settings, often an embedded JSON string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
