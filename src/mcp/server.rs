//! MCP server implementation

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Error;
use crate::service::{AngleService, AppserverService};
use crate::types::{AngleFilter, AngleSearchRequest};

/// Rows per page when the caller does not ask for a limit
const DEFAULT_ROWS_LIMIT: u64 = 300;

/// MCP server exposing the Appserver as tools
#[derive(Clone)]
pub struct AppserverServer {
    pub appserver: Arc<AppserverService>,
    pub angles: Arc<AngleService>,
    tool_router: ToolRouter<Self>,
}

// Tool parameter types

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteTaskParams {
    /// ID of the task to execute
    pub task_id: String,
    /// Optional reason for task execution
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskIdParams {
    /// ID of the task to check
    pub task_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchAnglesParams {
    /// Search query (default: match everything)
    pub query: Option<String>,
    /// Field filters applied on top of the query
    pub filters: Option<Vec<AngleFilter>>,
    /// Offset of the first result (default: 0)
    pub start: Option<u64>,
    /// Number of results (default: 10)
    pub rows: Option<u64>,
    /// Sort expression, e.g. "name asc"
    pub sort: Option<String>,
    /// Fields to return facet counts for
    pub facet_fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AngleIdParams {
    /// ID of the angle
    pub angle_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ItemQueryParams {
    /// Optional search query
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DashboardParams {
    /// URI of the dashboard, e.g. /dashboards/12
    pub dashboard_uri: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteDisplayParams {
    /// ID of the model the angle belongs to
    pub model_id: u64,
    /// ID of the angle
    pub angle_id: u64,
    /// ID of the display to execute
    pub display_id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResultUriParams {
    /// URI of the result returned by execute_angle_display
    pub result_uri: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DataFieldsParams {
    /// URI of the result's data fields
    pub data_fields_uri: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DataRowsParams {
    /// URI of the result's data rows
    pub data_rows_uri: String,
    /// Offset of the first row (default: 0)
    pub offset: Option<u64>,
    /// Number of rows (default: 300)
    pub limit: Option<u64>,
    /// Field IDs to return (default: all)
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AllDataRowsParams {
    /// URI of the result's data rows
    pub data_rows_uri: String,
    /// Field IDs to return (default: all)
    pub fields: Option<Vec<String>>,
    /// Stop after this many rows (default: configured maximum)
    pub max_rows: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DisplayDataParams {
    /// ID of the model the angle belongs to
    pub model_id: u64,
    /// ID of the angle
    pub angle_id: u64,
    /// ID of the display to execute
    pub display_id: u64,
    /// Stop after this many rows (default: configured maximum)
    pub max_rows: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ModelClassesParams {
    /// ID of the model
    pub model_id: String,
    /// Optional search term for class names
    pub query: Option<String>,
}

// Response helpers (serialized as strings for MCP)

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct ServerStatusResponse {
    status: String,
}

fn error_json(message: impl Into<String>) -> String {
    let response = ErrorResponse {
        error: message.into(),
    };
    serde_json::to_string_pretty(&response)
        .unwrap_or_else(|_| r#"{"error": "serialization failed"}"#.to_string())
}

/// Render a service result; failures become `{"error": ...}`
fn respond<T: Serialize>(result: crate::Result<T>, action: &str) -> String {
    match result {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|e| error_json(format!("Error serializing response: {}", e))),
        Err(Error::InvalidInput(message)) => {
            tracing::warn!("Rejected {} request: {}", action, message);
            error_json(message)
        }
        Err(e) => {
            tracing::error!("Error {}: {}", action, e);
            error_json(format!("Error {}: {}", action, e))
        }
    }
}

// Server implementation

#[tool_router]
impl AppserverServer {
    pub fn new(appserver: Arc<AppserverService>, angles: Arc<AngleService>) -> Self {
        Self {
            appserver,
            angles,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get comprehensive information about the Appserver including version and all available models with their status")]
    async fn get_appserver_about(&self) -> String {
        respond(self.appserver.about().await, "retrieving Appserver information")
    }

    #[tool(description = "Get model statistics: total, up, down, real-time and batch model counts and the latest model data timestamp")]
    async fn get_model_statistics(&self) -> String {
        respond(self.appserver.model_statistics().await, "retrieving model statistics")
    }

    #[tool(description = "Check whether the Appserver health endpoint is reachable")]
    async fn get_server_status(&self) -> String {
        let status = self.appserver.server_status().await;
        respond(Ok(ServerStatusResponse { status }), "checking server status")
    }

    #[tool(description = "Get the list of business processes defined on the Appserver")]
    async fn get_business_processes(&self) -> String {
        respond(
            self.appserver.business_processes().await,
            "retrieving business processes",
        )
    }

    #[tool(description = "Execute a task by ID")]
    async fn execute_task(&self, Parameters(params): Parameters<ExecuteTaskParams>) -> String {
        respond(
            self.appserver
                .execute_task(&params.task_id, params.reason.as_deref())
                .await,
            "executing task",
        )
    }

    #[tool(description = "Get current status and details of a task")]
    async fn get_task_status(&self, Parameters(params): Parameters<TaskIdParams>) -> String {
        respond(
            self.appserver.task_status(&params.task_id).await,
            "retrieving task status",
        )
    }

    #[tool(description = "Get list of all tasks from the Appserver")]
    async fn get_tasks(&self) -> String {
        respond(self.appserver.tasks().await, "retrieving tasks list")
    }

    #[tool(description = "Get list of all users from the Appserver")]
    async fn get_users(&self) -> String {
        respond(self.appserver.users().await, "retrieving users list")
    }

    #[tool(description = "Get license information of the Appserver")]
    async fn get_license(&self) -> String {
        respond(self.appserver.license().await, "retrieving license information")
    }

    #[tool(description = "Search angles, dashboards and other items with an optional query, field filters, paging, sorting and facets")]
    async fn search_angles(&self, Parameters(params): Parameters<SearchAnglesParams>) -> String {
        let defaults = AngleSearchRequest::default();
        let facet_fields = params.facet_fields.unwrap_or_default();

        let request = AngleSearchRequest {
            query: params
                .query
                .filter(|q| !q.trim().is_empty())
                .unwrap_or(defaults.query),
            filter_queries: params
                .filters
                .unwrap_or_default()
                .iter()
                .map(AngleFilter::to_query)
                .collect(),
            start: params.start.unwrap_or(defaults.start),
            rows: params.rows.unwrap_or(defaults.rows),
            sort: params.sort.unwrap_or_default(),
            facet: !facet_fields.is_empty(),
            facet_fields,
            ..defaults
        };

        respond(self.angles.search(&request).await, "searching angles")
    }

    #[tool(description = "Get a single angle by ID")]
    async fn get_angle(&self, Parameters(params): Parameters<AngleIdParams>) -> String {
        respond(self.angles.angle(&params.angle_id).await, "retrieving angle")
    }

    #[tool(description = "Get angle statistics: totals, category and status distribution, and angles created in the last 30 days")]
    async fn get_angle_statistics(&self) -> String {
        match self.angles.statistics().await {
            Ok(Some(stats)) => respond(Ok(stats), "retrieving angle statistics"),
            Ok(None) => error_json("Angle statistics are not available"),
            Err(e) => respond::<()>(Err(e), "retrieving angle statistics"),
        }
    }

    #[tool(description = "List angles, optionally narrowed by a search query")]
    async fn get_angles(&self, Parameters(params): Parameters<ItemQueryParams>) -> String {
        respond(
            self.angles.angles(params.query.as_deref()).await,
            "retrieving angles",
        )
    }

    #[tool(description = "List dashboards, optionally narrowed by a search query")]
    async fn get_dashboards(&self, Parameters(params): Parameters<ItemQueryParams>) -> String {
        respond(
            self.angles.dashboards(params.query.as_deref()).await,
            "retrieving dashboards",
        )
    }

    #[tool(description = "Get a dashboard and its widget definitions by URI")]
    async fn get_dashboard(&self, Parameters(params): Parameters<DashboardParams>) -> String {
        respond(
            self.angles.dashboard(&params.dashboard_uri).await,
            "retrieving dashboard",
        )
    }

    #[tool(description = "Start executing a display of an angle. Returns the result URI to poll")]
    async fn execute_angle_display(
        &self,
        Parameters(params): Parameters<ExecuteDisplayParams>,
    ) -> String {
        respond(
            self.angles
                .execute_display(params.model_id, params.angle_id, params.display_id)
                .await,
            "executing angle display",
        )
    }

    #[tool(description = "Get the execution status of a result, including its data rows and data fields URIs")]
    async fn get_angle_display_execution_status(
        &self,
        Parameters(params): Parameters<ResultUriParams>,
    ) -> String {
        respond(
            self.angles.result_status(&params.result_uri).await,
            "retrieving execution status",
        )
    }

    #[tool(description = "Get the column definitions of a result")]
    async fn get_data_fields(&self, Parameters(params): Parameters<DataFieldsParams>) -> String {
        respond(
            self.angles.data_fields(&params.data_fields_uri).await,
            "retrieving data fields",
        )
    }

    #[tool(description = "Get one page of rows of a result")]
    async fn get_data_rows(&self, Parameters(params): Parameters<DataRowsParams>) -> String {
        let fields = params.fields.unwrap_or_default();
        respond(
            self.angles
                .data_rows(
                    &params.data_rows_uri,
                    params.offset.unwrap_or(0),
                    params.limit.unwrap_or(DEFAULT_ROWS_LIMIT),
                    &fields,
                )
                .await,
            "retrieving data rows",
        )
    }

    #[tool(description = "Get all rows of a result by paging through it, up to max_rows")]
    async fn get_all_data_rows(&self, Parameters(params): Parameters<AllDataRowsParams>) -> String {
        let fields = params.fields.unwrap_or_default();
        respond(
            self.angles
                .fetch_data_rows(&params.data_rows_uri, &fields, params.max_rows)
                .await,
            "retrieving all data rows",
        )
    }

    #[tool(description = "Execute a display of an angle, wait for it to finish and return its fields and rows")]
    async fn get_angle_display_data(
        &self,
        Parameters(params): Parameters<DisplayDataParams>,
    ) -> String {
        respond(
            self.angles
                .display_data(
                    params.model_id,
                    params.angle_id,
                    params.display_id,
                    params.max_rows,
                )
                .await,
            "retrieving angle display data",
        )
    }

    #[tool(description = "Get the list of models on the Appserver")]
    async fn get_models(&self) -> String {
        respond(self.appserver.models().await, "retrieving models")
    }

    #[tool(description = "Get the classes of a model, optionally narrowed by a search term")]
    async fn get_model_classes(&self, Parameters(params): Parameters<ModelClassesParams>) -> String {
        respond(
            self.appserver
                .model_classes(&params.model_id, params.query.as_deref())
                .await,
            "retrieving model classes",
        )
    }

    #[tool(description = "Get the detailed model overview (instance, server, last update) scraped from the Appserver's HTML model page")]
    async fn get_comprehensive_models(&self) -> String {
        respond(
            self.appserver.comprehensive_models().await,
            "retrieving comprehensive models",
        )
    }
}

#[tool_handler]
impl ServerHandler for AppserverServer {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::default(),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: rmcp::model::Implementation {
                name: "appserver-mcp".into(),
                title: Some("Appserver MCP Gateway".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some("Gateway to an Appserver BI backend. Use get_appserver_about and get_model_statistics for system state, search_angles or get_angles to find angles, and get_angle_display_data to execute a display and read its rows.".into()),
        }
    }
}

/// Run the MCP server on stdio
pub async fn serve_stdio(server: AppserverServer) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server on stdio...");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AppserverClient;
    use crate::config::Config;
    use crate::platform::StaticToken;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(mock: &MockServer) -> AppserverServer {
        let mut config = Config::default();
        config.appserver.base_url = mock.uri();
        let client = AppserverClient::with_http(
            reqwest::Client::new(),
            &mock.uri(),
            Arc::new(StaticToken::new("test-token")),
        );
        AppserverServer::new(
            Arc::new(AppserverService::new(client.clone(), &config)),
            Arc::new(AngleService::new(client, &config)),
        )
    }

    fn parse(out: &str) -> serde_json::Value {
        serde_json::from_str(out).expect("tool output is JSON")
    }

    #[tokio::test]
    async fn test_blank_task_id_never_reaches_upstream() {
        let mock = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock)
            .await;
        let server = server_for(&mock);

        let out = server
            .execute_task(Parameters(ExecuteTaskParams {
                task_id: "   ".into(),
                reason: None,
            }))
            .await;
        assert_eq!(parse(&out)["error"], "Task ID is required");

        let out = server
            .get_task_status(Parameters(TaskIdParams { task_id: String::new() }))
            .await;
        assert_eq!(parse(&out)["error"], "Task ID is required");

        let out = server
            .get_dashboard(Parameters(DashboardParams { dashboard_uri: " ".into() }))
            .await;
        assert!(parse(&out)["error"].as_str().unwrap().contains("required"));
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_error_object() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock)
            .await;
        let server = server_for(&mock);

        let value = parse(&server.get_users().await);
        let message = value["error"].as_str().unwrap();
        assert!(message.starts_with("Error retrieving users list"));
        assert!(message.contains("500"));
    }

    #[tokio::test]
    async fn test_search_angles_maps_params_to_query() {
        use wiremock::matchers::{query_param, query_param_is_missing};

        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("q", "*:*"))
            .and(query_param("fq", "status:\"active\""))
            .and(query_param("start", "5"))
            .and(query_param("rows", "25"))
            .and(query_param_is_missing("facet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "header": { "total": 1 } })))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("q", "sales"))
            .and(query_param("facet", "true"))
            .and(query_param("facet.field", "category"))
            .and(query_param_is_missing("fq"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "header": { "total": 2 } })))
            .expect(1)
            .mount(&mock)
            .await;
        let server = server_for(&mock);

        let out = server
            .search_angles(Parameters(SearchAnglesParams {
                query: Some("  ".into()),
                filters: Some(vec![AngleFilter::equals("status", "active")]),
                start: Some(5),
                rows: Some(25),
                facet_fields: Some(Vec::new()),
                ..Default::default()
            }))
            .await;
        assert_eq!(parse(&out)["header"]["total"], 1);

        let out = server
            .search_angles(Parameters(SearchAnglesParams {
                query: Some("sales".into()),
                facet_fields: Some(vec!["category".into()]),
                ..Default::default()
            }))
            .await;
        assert_eq!(parse(&out)["header"]["total"], 2);
    }

    #[tokio::test]
    async fn test_server_status_tool_wraps_status() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock)
            .await;
        let server = server_for(&mock);

        let value = parse(&server.get_server_status().await);
        assert_eq!(value["status"], "Unhealthy - Status Code: 503");
    }

    #[test]
    fn test_server_info() {
        let mock_uri = "http://localhost:9";
        let client = AppserverClient::with_http(
            reqwest::Client::new(),
            mock_uri,
            Arc::new(StaticToken::new("t")),
        );
        let config = Config::default();
        let server = AppserverServer::new(
            Arc::new(AppserverService::new(client.clone(), &config)),
            Arc::new(AngleService::new(client, &config)),
        );

        let info = server.get_info();
        assert_eq!(info.server_info.name, "appserver-mcp");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_error_json_shape() {
        let value: serde_json::Value = serde_json::from_str(&error_json("boom")).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "boom" }));
    }

    #[test]
    fn test_invalid_input_is_reported_verbatim() {
        let out = respond::<()>(
            Err(Error::InvalidInput("Task ID is required".into())),
            "executing task",
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Task ID is required");
    }

    #[test]
    fn test_upstream_error_is_prefixed_with_action() {
        let out = respond::<()>(Err(Error::Other("connection refused".into())), "retrieving users list");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Error retrieving users list: connection refused");
    }

    #[test]
    fn test_success_is_pretty_json() {
        let out = respond(Ok(ServerStatusResponse { status: "Healthy".into() }), "checking");
        assert!(out.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "Healthy");
    }
}
