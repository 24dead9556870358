use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ListHeader;
use crate::serde_util::{null_as_default, string_or_number};

/// Body of `POST /results`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteAngleDisplayRequest {
    pub query_definition: Vec<QueryBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_display: Option<String>,
    pub queryblock_type: String,
}

impl ExecuteAngleDisplayRequest {
    /// Execute a stored display of an angle as-is
    pub fn for_display(model_id: u64, angle_id: u64, display_id: u64) -> Self {
        let angle_uri = format!("/models/{}/angles/{}", model_id, angle_id);
        let display_uri = format!("{}/displays/{}", angle_uri, display_id);

        Self {
            query_definition: vec![
                QueryBlock {
                    base_angle: Some(angle_uri),
                    base_display: None,
                    queryblock_type: "base_angle".to_string(),
                },
                QueryBlock {
                    base_angle: None,
                    base_display: Some(display_uri),
                    queryblock_type: "base_display".to_string(),
                },
            ],
        }
    }
}

/// A result resource, returned both when executing and when polling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultStatus {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successfully_completed: Option<bool>,
    /// Milliseconds spent executing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// URI of the data rows of this result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_rows: Option<String>,
    /// URI of the data fields of this result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fields: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultStatus {
    pub fn is_finished(&self) -> bool {
        self.status.eq_ignore_ascii_case("finished")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRowsHeader {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// A page (or an accumulation of pages) of result rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataRowsResponse {
    #[serde(default)]
    pub header: DataRowsHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<DataRow>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataRow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub row_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_values: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataFieldsResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<DataField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataField {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub long_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fieldtype: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything needed to read a display: the result, its columns and rows
#[derive(Debug, Clone, Serialize)]
pub struct AngleDisplayData {
    pub result: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<DataFieldsResponse>,
    pub rows: DataRowsResponse,
}
