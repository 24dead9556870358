//! Request and response shapes of the Appserver REST API
//!
//! Every field the server may omit is defaulted, and every document keeps
//! unrecognised fields in `extra` so they survive re-serialization. Paging
//! headers are the exception.

mod about;
mod angles;
mod business;
mod dashboards;
mod models;
mod results;
mod tasks;
mod users;

pub use about::{AboutInfo, ModelStatistics, ModelStatus};
pub use angles::{
    AngleDocument, AngleFilter, AngleSearchRequest, AngleSearchResponse, AngleSortOption,
    AngleStatistics, FacetCategory, FacetCounts, FacetFilter, FilterOperator,
};
pub use business::{BusinessProcess, BusinessProcessResponse, BusinessProcessSortOption};
pub use dashboards::{DashboardResponse, LocalizedText, WidgetDefinition};
pub use models::{ComprehensiveModel, ModelClass, ModelClassesResponse, ModelView, ModelsListResponse};
pub use results::{
    AngleDisplayData, DataField, DataFieldsResponse, DataRow, DataRowsHeader, DataRowsResponse,
    ExecuteAngleDisplayRequest, QueryBlock, ResultStatus,
};
pub use tasks::{
    ActionView, ArgumentView, DayView, TaskExecutionRequest, TaskExecutionResponse, TaskItem,
    TaskRecipient, TaskStatusResponse, TasksListResponse, TriggerView,
};
pub use users::{UserView, UsersListResponse};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_util::null_as_default;

/// Paging header shared by the list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListHeader {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Who did something and when (epoch seconds)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhoWhen {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default)]
    pub datetime: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
