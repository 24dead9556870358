//! Appserver system, task, user and model operations

use serde_json::Value;

use super::{models_html, path_id};
use crate::client::AppserverClient;
use crate::config::Config;
use crate::error::Result;
use crate::types::{
    AboutInfo, BusinessProcessResponse, ComprehensiveModel, ModelClassesResponse,
    ModelStatistics, ModelsListResponse, TaskExecutionRequest, TaskExecutionResponse, TaskItem,
    TaskStatusResponse, TasksListResponse, UserView, UsersListResponse,
};

#[derive(Clone)]
pub struct AppserverService {
    client: AppserverClient,
    comprehensive_models_path: String,
}

impl AppserverService {
    pub fn new(client: AppserverClient, config: &Config) -> Self {
        Self {
            client,
            comprehensive_models_path: config.appserver.comprehensive_models_path.clone(),
        }
    }

    pub fn client(&self) -> &AppserverClient {
        &self.client
    }

    /// Server version and the status of every model
    pub async fn about(&self) -> Result<AboutInfo> {
        tracing::info!("Fetching about information from {}/about", self.client.base_url());
        let about: AboutInfo = self.client.get_json("/about").await?;
        tracing::info!(
            "Fetched about information for app server version {}",
            about.app_server_version
        );
        Ok(about)
    }

    pub async fn business_processes(&self) -> Result<BusinessProcessResponse> {
        tracing::info!("Fetching business processes");
        let response: BusinessProcessResponse = self.client.get_json("/businessprocesses").await?;
        tracing::info!("Fetched {} business processes", response.business_processes.len());
        Ok(response)
    }

    /// Human-readable reachability of `/health`; never fails
    pub async fn server_status(&self) -> String {
        tracing::info!("Checking server status at {}/health", self.client.base_url());
        match self.client.get_status("/health").await {
            Ok(status) if (200..300).contains(&status) => "Healthy".to_string(),
            Ok(status) => format!("Unhealthy - Status Code: {}", status),
            Err(e) => {
                tracing::error!("Failed to check server status: {}", e);
                format!("Error - {}", e)
            }
        }
    }

    pub async fn model_statistics(&self) -> Result<ModelStatistics> {
        Ok(self.about().await?.statistics())
    }

    /// Start a task; a blank reason becomes "Automated execution"
    pub async fn execute_task(
        &self,
        task_id: &str,
        reason: Option<&str>,
    ) -> Result<TaskExecutionResponse> {
        let task_id = path_id(task_id, "Task ID")?;
        let request = TaskExecutionRequest::start(reason);
        tracing::info!("Executing task {} with reason: {}", task_id, request.reason);

        let response: TaskExecutionResponse = self
            .client
            .post_json(&format!("/tasks/{}/execution", task_id), &[], &request)
            .await?;
        tracing::info!("Executed task {}", task_id);
        Ok(response)
    }

    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        let task_id = path_id(task_id, "Task ID")?;
        tracing::info!("Fetching status for task {}", task_id);

        let response: TaskStatusResponse =
            self.client.get_json(&format!("/tasks/{}", task_id)).await?;
        tracing::info!("Task {} status: {}", task_id, response.status);
        Ok(response)
    }

    pub async fn tasks(&self) -> Result<Vec<TaskItem>> {
        tracing::info!("Fetching tasks list");
        let response: TasksListResponse = self.client.get_json("/tasks").await?;
        tracing::info!(
            "Fetched {} tasks (total: {})",
            response.tasks.len(),
            response.header.total
        );
        Ok(response.tasks)
    }

    /// License details, passed through untyped
    pub async fn license(&self) -> Result<Value> {
        tracing::info!("Fetching license information");
        self.client.get_json("/system/license").await
    }

    pub async fn users(&self) -> Result<Vec<UserView>> {
        tracing::info!("Fetching users list");
        let response: UsersListResponse = self.client.get_json("/users").await?;
        tracing::info!(
            "Fetched {} users (total: {})",
            response.users.len(),
            response.header.total
        );
        Ok(response.users)
    }

    pub async fn models(&self) -> Result<ModelsListResponse> {
        tracing::info!("Fetching models list");
        let response: ModelsListResponse = self.client.get_json("/models").await?;
        tracing::info!("Fetched {} models", response.models.len());
        Ok(response)
    }

    /// Classes of a model, optionally narrowed by a search term
    pub async fn model_classes(
        &self,
        model_id: &str,
        query: Option<&str>,
    ) -> Result<ModelClassesResponse> {
        let model_id = path_id(model_id, "Model ID")?;
        let mut params = Vec::new();
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }

        tracing::info!("Fetching classes for model {}", model_id);
        let response: ModelClassesResponse = self
            .client
            .get_json_with_query(&format!("/models/{}/classes", model_id), &params)
            .await?;
        tracing::info!(
            "Fetched {} classes for model {} (total: {})",
            response.classes.len(),
            model_id,
            response.header.total
        );
        Ok(response)
    }

    /// Scrape the legacy HTML model overview
    pub async fn comprehensive_models(&self) -> Result<Vec<ComprehensiveModel>> {
        tracing::info!("Fetching comprehensive models from {}", self.comprehensive_models_path);
        let html = self.client.get_text(&self.comprehensive_models_path).await?;
        let models = models_html::parse_models(&html);
        tracing::info!("Parsed {} models from HTML overview", models.len());
        Ok(models)
    }
}
