//! Authenticated HTTP client for the Appserver REST API

use reqwest::header::HeaderValue;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::TokenProvider;

const AUTH_HEADER: &str = "A4SAuthorization";
const ROPC_HEADER: &str = "ROPC";

/// Thin wrapper over `reqwest::Client` that resolves Appserver URIs and
/// attaches the auth headers to every request
#[derive(Clone)]
pub struct AppserverClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl AppserverClient {
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = Self::build_http_client(config)?;
        Ok(Self::with_http(http, &config.appserver.base_url, tokens))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Shared reqwest client honouring the configured timeout and TLS policy
    pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.appserver.accept_invalid_certs)
            .build()?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn an Appserver URI into an absolute URL.
    ///
    /// Absolute URLs pass through; `/results/1` and `results/1` both join
    /// the base URL with a single slash.
    pub fn resolve(&self, uri: &str) -> String {
        let uri = uri.trim();
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else if uri.starts_with('/') {
            format!("{}{}", self.base_url, uri)
        } else {
            format!("{}/{}", self.base_url, uri)
        }
    }

    fn url(&self, uri: &str, query: &[(&str, String)]) -> Result<Url> {
        let resolved = self.resolve(uri);
        let mut url = Url::parse(&resolved).map_err(|e| Error::Url(format!("{}: {}", resolved, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http
            .request(method, url)
            .header(AUTH_HEADER, HeaderValue::from_str(&token)?)
            .header(ROPC_HEADER, "true"))
    }

    /// Send and return the body of a successful response
    async fn send(&self, builder: RequestBuilder, url: &Url) -> Result<String> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!("Request to {} timed out", url);
            } else {
                tracing::error!("Request to {} failed: {}", url, e);
            }
            Error::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Appserver returned {} for {}: {}", status, url, body);
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(body)
    }

    fn parse<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", url, e);
            tracing::debug!("Unparseable body: {}", body);
            Error::Json(e)
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        self.get_json_with_query(uri, &[]).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        uri: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(uri, query)?;
        tracing::debug!("GET {}", url);
        let builder = self.request(Method::GET, url.clone()).await?;
        let body = self.send(builder, &url).await?;
        Self::parse(&url, &body)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        uri: &str,
        query: &[(&str, String)],
        payload: &B,
    ) -> Result<T> {
        let url = self.url(uri, query)?;
        tracing::debug!("POST {}", url);
        let builder = self.request(Method::POST, url.clone()).await?.json(payload);
        let body = self.send(builder, &url).await?;
        Self::parse(&url, &body)
    }

    pub async fn get_text(&self, uri: &str) -> Result<String> {
        let url = self.url(uri, &[])?;
        tracing::debug!("GET {}", url);
        let builder = self.request(Method::GET, url.clone()).await?;
        self.send(builder, &url).await
    }

    /// Status code of a GET, without treating non-2xx as an error
    pub async fn get_status(&self, uri: &str) -> Result<u16> {
        let url = self.url(uri, &[])?;
        let response = self.request(Method::GET, url).await?.send().await?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticToken;

    fn client(base: &str) -> AppserverClient {
        AppserverClient::with_http(reqwest::Client::new(), base, Arc::new(StaticToken::new("t")))
    }

    #[test]
    fn test_resolve_relative_uris() {
        let client = client("http://appserver:8080/");
        assert_eq!(client.base_url(), "http://appserver:8080");
        assert_eq!(client.resolve("/results/15"), "http://appserver:8080/results/15");
        assert_eq!(client.resolve("results/15"), "http://appserver:8080/results/15");
    }

    #[test]
    fn test_resolve_absolute_uri_passes_through() {
        let client = client("http://appserver:8080");
        assert_eq!(
            client.resolve("https://other.host/dashboards/20"),
            "https://other.host/dashboards/20"
        );
    }

    #[test]
    fn test_url_encodes_query() {
        let client = client("http://appserver:8080");
        let url = client
            .url("/results/1/data_rows", &[("fields", "a,b c".to_string())])
            .unwrap();
        assert_eq!(url.query(), Some("fields=a%2Cb+c"));
    }

    #[test]
    fn test_url_without_query_has_no_question_mark() {
        let client = client("http://appserver:8080");
        let url = client.url("/about", &[]).unwrap();
        assert_eq!(url.as_str(), "http://appserver:8080/about");
    }
}
