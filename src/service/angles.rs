//! Angle search, dashboards and display execution

use chrono::{Duration, Utc};

use super::{path_id, required_uri};
use crate::client::AppserverClient;
use crate::config::{Config, ResultsConfig};
use crate::error::{Error, Result};
use crate::types::{
    AngleDisplayData, AngleDocument, AngleFilter, AngleSearchRequest, AngleSearchResponse,
    AngleStatistics, DashboardResponse, DataFieldsResponse, DataRowsHeader, DataRowsResponse,
    ExecuteAngleDisplayRequest, ResultStatus,
};

const ANGLE_ITEM_TYPE: &str = "facetcat_itemtype:(facet_angle)";
const DASHBOARD_ITEM_TYPE: &str = "facetcat_itemtype:(facet_dashboard)";
const RECENT_DAYS: i64 = 30;
const SOLR_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Clone)]
pub struct AngleService {
    client: AppserverClient,
    results: ResultsConfig,
}

impl AngleService {
    pub fn new(client: AppserverClient, config: &Config) -> Self {
        Self {
            client,
            results: config.results.clone(),
        }
    }

    pub async fn search(&self, request: &AngleSearchRequest) -> Result<AngleSearchResponse> {
        tracing::info!("Searching angles with query: {}", request.query);
        let response: AngleSearchResponse = self
            .client
            .get_json_with_query("/items", &request.query_pairs())
            .await?;
        tracing::info!(
            "Found {} items (total: {})",
            response.items.len(),
            response.header.total
        );
        Ok(response)
    }

    pub async fn angle(&self, angle_id: &str) -> Result<AngleDocument> {
        let angle_id = path_id(angle_id, "Angle ID")?;
        tracing::info!("Fetching angle {}", angle_id);
        self.client.get_json(&format!("/api/items/{}", angle_id)).await
    }

    /// Match-all search narrowed by field filters
    pub async fn filter(
        &self,
        filters: &[AngleFilter],
        start: u64,
        rows: u64,
        sort: &str,
    ) -> Result<AngleSearchResponse> {
        let request = AngleSearchRequest {
            filter_queries: filters.iter().map(AngleFilter::to_query).collect(),
            start,
            rows,
            sort: sort.to_string(),
            ..Default::default()
        };
        tracing::debug!("Filter queries: {:?}", request.filter_queries);
        self.search(&request).await
    }

    /// Category and status distribution plus the count created in the last 30 days.
    ///
    /// `None` when the server returns no facet counts.
    pub async fn statistics(&self) -> Result<Option<AngleStatistics>> {
        let request = AngleSearchRequest {
            rows: 0,
            facet: true,
            facet_fields: vec!["category".to_string(), "status".to_string()],
            ..Default::default()
        };
        let response = self.search(&request).await?;

        let Some(facets) = response.facet_counts else {
            tracing::warn!("Search response carried no facet counts");
            return Ok(None);
        };

        let since = (Utc::now() - Duration::days(RECENT_DAYS))
            .format(SOLR_DATE_FORMAT)
            .to_string();
        let recent = AngleFilter::range("created_date", Some(since), None);
        let recent_angles = match self.filter(&[recent], 0, 0, "").await {
            Ok(response) => response.header.total,
            Err(e) => {
                tracing::warn!("Failed to count recent angles: {}", e);
                0
            }
        };

        Ok(Some(AngleStatistics {
            total_angles: response.header.total,
            categories: facets.field_counts("category").unwrap_or_default(),
            status_distribution: facets.field_counts("status").unwrap_or_default(),
            recent_angles,
            last_updated: Utc::now(),
        }))
    }

    pub async fn angles(&self, query: Option<&str>) -> Result<AngleSearchResponse> {
        tracing::info!("Fetching angles");
        self.items_of_type(ANGLE_ITEM_TYPE, query).await
    }

    pub async fn dashboards(&self, query: Option<&str>) -> Result<AngleSearchResponse> {
        tracing::info!("Fetching dashboards");
        self.items_of_type(DASHBOARD_ITEM_TYPE, query).await
    }

    async fn items_of_type(&self, item_type: &str, query: Option<&str>) -> Result<AngleSearchResponse> {
        let mut params = Vec::with_capacity(4);
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        params.push(("fq", item_type.to_string()));
        params.push(("caching", "false".to_string()));
        params.push(("viewmode", "basic".to_string()));

        let response: AngleSearchResponse = self.client.get_json_with_query("/items", &params).await?;
        tracing::info!(
            "Fetched {} items (total: {})",
            response.items.len(),
            response.header.total
        );
        Ok(response)
    }

    pub async fn dashboard(&self, dashboard_uri: &str) -> Result<DashboardResponse> {
        let uri = required_uri(dashboard_uri, "Dashboard URI")?;
        tracing::info!("Fetching dashboard {}", uri);
        let dashboard: DashboardResponse = self.client.get_json(uri).await?;
        tracing::info!(
            "Fetched dashboard {} with {} widgets",
            dashboard.display_name().unwrap_or("unnamed"),
            dashboard.widget_definitions.len()
        );
        Ok(dashboard)
    }

    /// Start executing a display; the returned status carries the result URI
    pub async fn execute_display(
        &self,
        model_id: u64,
        angle_id: u64,
        display_id: u64,
    ) -> Result<ResultStatus> {
        tracing::info!(
            "Executing display {} of angle {} in model {}",
            display_id,
            angle_id,
            model_id
        );
        let request = ExecuteAngleDisplayRequest::for_display(model_id, angle_id, display_id);
        let status: ResultStatus = self
            .client
            .post_json("/results", &[("redirect", "no".to_string())], &request)
            .await?;
        tracing::info!("Execution started: {} ({})", status.uri, status.status);
        Ok(status)
    }

    pub async fn result_status(&self, result_uri: &str) -> Result<ResultStatus> {
        let uri = required_uri(result_uri, "Result URI")?;
        let status: ResultStatus = self.client.get_json(uri).await?;
        tracing::debug!("Result {} status: {}", uri, status.status);
        Ok(status)
    }

    /// A single page of rows
    pub async fn data_rows(
        &self,
        data_rows_uri: &str,
        offset: u64,
        limit: u64,
        fields: &[String],
    ) -> Result<DataRowsResponse> {
        let uri = required_uri(data_rows_uri, "Data rows URI")?;
        let mut params = vec![("offset", offset.to_string()), ("limit", limit.to_string())];
        if !fields.is_empty() {
            params.push(("fields", fields.join(",")));
        }

        tracing::debug!("Fetching {} rows at offset {} from {}", limit, offset, uri);
        self.client.get_json_with_query(uri, &params).await
    }

    pub async fn data_fields(&self, data_fields_uri: &str) -> Result<DataFieldsResponse> {
        let uri = required_uri(data_fields_uri, "Data fields URI")?;
        tracing::info!("Fetching data fields from {}", uri);
        let response: DataFieldsResponse = self.client.get_json(uri).await?;
        tracing::info!("Fetched {} data fields", response.fields.len());
        Ok(response)
    }

    /// Page through a result's rows until exhausted or `max_rows` is reached.
    ///
    /// A zero or missing cap falls back to the configured maximum. An error
    /// on any page after the first ends the loop with the rows collected so far.
    pub async fn fetch_data_rows(
        &self,
        data_rows_uri: &str,
        fields: &[String],
        max_rows: Option<u64>,
    ) -> Result<DataRowsResponse> {
        let cap = max_rows
            .map(|n| n as usize)
            .filter(|n| *n > 0)
            .unwrap_or(self.results.max_rows)
            .max(1);
        let page_size = self.results.page_size.max(1) as u64;

        let mut collected = DataRowsResponse::default();
        let mut total = 0u64;
        let mut offset = 0u64;
        let mut first = true;

        loop {
            if !first {
                tokio::time::sleep(self.results.page_delay()).await;
            }

            let remaining = (cap - collected.rows.len()) as u64;
            let page = match self
                .data_rows(data_rows_uri, offset, page_size.min(remaining), fields)
                .await
            {
                Ok(page) => page,
                Err(e) if first => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Stopping pagination at offset {} after error: {}",
                        offset,
                        e
                    );
                    break;
                }
            };

            if first {
                total = page.header.total;
                collected.fields = page.fields;
                collected.extra = page.extra;
                first = false;
            }

            if page.rows.is_empty() {
                break;
            }

            offset += page.rows.len() as u64;
            collected.rows.extend(page.rows);

            if collected.rows.len() >= cap {
                collected.rows.truncate(cap);
                break;
            }
            if offset >= total {
                break;
            }
        }

        tracing::info!(
            "Fetched {} rows from {} (total: {})",
            collected.rows.len(),
            data_rows_uri,
            total
        );

        collected.header = DataRowsHeader {
            total,
            offset: 0,
            limit: cap as u64,
            count: Some(collected.rows.len() as u64),
        };
        Ok(collected)
    }

    /// Poll a result at a fixed interval until it finishes or attempts run out.
    ///
    /// Returns the last status seen, finished or not.
    pub async fn wait_for_result(&self, result_uri: &str) -> Result<ResultStatus> {
        let attempts = self.results.max_poll_attempts.max(1);
        let mut status = self.result_status(result_uri).await?;

        for attempt in 1..attempts {
            if status.is_finished() {
                break;
            }
            tracing::debug!(
                "Result {} is {} (attempt {}/{})",
                result_uri,
                status.status,
                attempt,
                attempts
            );
            tokio::time::sleep(self.results.poll_interval()).await;
            status = self.result_status(result_uri).await?;
        }

        if !status.is_finished() {
            tracing::warn!(
                "Result {} not finished after {} attempts (status: {})",
                result_uri,
                attempts,
                status.status
            );
        }
        Ok(status)
    }

    /// Execute a display, wait for it and read its fields and rows
    pub async fn display_data(
        &self,
        model_id: u64,
        angle_id: u64,
        display_id: u64,
        max_rows: Option<u64>,
    ) -> Result<AngleDisplayData> {
        let started = self.execute_display(model_id, angle_id, display_id).await?;
        if started.uri.trim().is_empty() {
            return Err(Error::Other("Execution response has no result URI".into()));
        }

        let result = self.wait_for_result(&started.uri).await?;
        if !result.is_finished() {
            return Err(Error::Other(format!(
                "Result {} did not finish (status: {})",
                started.uri, result.status
            )));
        }

        let fields = match result.data_fields.as_deref() {
            Some(uri) => match self.data_fields(uri).await {
                Ok(fields) => Some(fields),
                Err(e) => {
                    tracing::warn!("Failed to fetch data fields for {}: {}", started.uri, e);
                    None
                }
            },
            None => None,
        };

        let rows_uri = result
            .data_rows
            .clone()
            .unwrap_or_else(|| format!("{}/data_rows", started.uri.trim_end_matches('/')));
        let rows = self.fetch_data_rows(&rows_uri, &[], max_rows).await?;

        Ok(AngleDisplayData {
            result,
            fields,
            rows,
        })
    }
}

