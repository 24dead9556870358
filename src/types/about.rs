use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_util::{null_as_default, string_or_number};

/// Response of `GET /about`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AboutInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub app_server_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<ModelStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStatus {
    #[serde(default, deserialize_with = "string_or_number")]
    pub model_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub modeldata_timestamp: i64,
    #[serde(default)]
    pub model_definition_version: i64,
    #[serde(default)]
    pub is_real_time: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

/// Aggregate view over the models listed by `/about`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub total_models: usize,
    pub models_up: usize,
    pub models_down: usize,
    pub real_time_models: usize,
    pub batch_models: usize,
    pub latest_model_timestamp: i64,
}

impl AboutInfo {
    pub fn models_up(&self) -> usize {
        self.models.iter().filter(|m| m.is_up()).count()
    }

    pub fn statistics(&self) -> ModelStatistics {
        let models_up = self.models_up();
        let real_time_models = self.models.iter().filter(|m| m.is_real_time).count();

        ModelStatistics {
            total_models: self.models.len(),
            models_up,
            models_down: self.models.len() - models_up,
            real_time_models,
            batch_models: self.models.len() - real_time_models,
            latest_model_timestamp: self
                .models
                .iter()
                .map(|m| m.modeldata_timestamp)
                .max()
                .unwrap_or(0),
        }
    }
}
