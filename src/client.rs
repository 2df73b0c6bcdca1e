use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::logging::log_api_call;
use crate::models::{
    MembershipListDocument, MembershipResource, RelationshipPayload, RemovalResponse,
    TeamListDocument, TeamResource,
};

pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Platform operations used by the removal pipeline
///
/// The HTTP implementation talks to the Terraform Cloud / Enterprise v2 API.
/// Calls are awaited one at a time by the pipeline; implementations need no
/// internal ordering guarantees.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Organization memberships matching `email` (first page only)
    async fn find_memberships(
        &self,
        organization: &str,
        email: &str,
    ) -> AppResult<Vec<MembershipResource>>;

    /// Teams of the organization (first page only)
    async fn list_teams(&self, organization: &str) -> AppResult<Vec<TeamResource>>;

    /// Remove organization memberships from a team in one request.
    /// HTTP error statuses are returned, not raised.
    async fn remove_team_memberships(
        &self,
        team_id: &str,
        payload: &RelationshipPayload,
    ) -> AppResult<RemovalResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    client: reqwest::Client,
    api_base: String,
    access_log: bool,
}

impl HttpPlatformClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Self::with_timeout(config, Duration::from_secs(30))
    }

    pub fn with_timeout(config: &AppConfig, timeout: Duration) -> AppResult<Self> {
        let token = config.platform.bearer_token()?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::AuthConfig("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_CONTENT_TYPE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.platform.api_base(),
            access_log: config.logging.access_log,
        })
    }

    pub fn memberships_url(&self, organization: &str, email: &str) -> String {
        let query: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        format!(
            "{}/organizations/{}/organization-memberships?q={}",
            self.api_base, organization, query
        )
    }

    pub fn teams_url(&self, organization: &str) -> String {
        format!("{}/organizations/{}/teams", self.api_base, organization)
    }

    pub fn team_memberships_url(&self, team_id: &str) -> String {
        format!(
            "{}/teams/{}/relationships/organization-memberships",
            self.api_base, team_id
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> AppResult<Response> {
        let start = Instant::now();
        let result = request.send().await;

        if self.access_log {
            log_api_call(
                &method,
                url,
                result.as_ref().ok().map(|r| r.status()),
                start.elapsed(),
            );
        }

        Ok(result?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .send(Method::GET, url, self.client.get(url))
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn find_memberships(
        &self,
        organization: &str,
        email: &str,
    ) -> AppResult<Vec<MembershipResource>> {
        let url = self.memberships_url(organization, email);
        let document: MembershipListDocument = self.get_json(&url).await?;
        Ok(document.data)
    }

    async fn list_teams(&self, organization: &str) -> AppResult<Vec<TeamResource>> {
        let url = self.teams_url(organization);
        let document: TeamListDocument = self.get_json(&url).await?;
        Ok(document.data)
    }

    async fn remove_team_memberships(
        &self,
        team_id: &str,
        payload: &RelationshipPayload,
    ) -> AppResult<RemovalResponse> {
        let url = self.team_memberships_url(team_id);
        // The JSON:API content type is set by default headers; serialize by hand
        // so `.json()` does not overwrite it with application/json.
        let body = serde_json::to_vec(payload)?;
        let response = self
            .send(Method::DELETE, &url, self.client.delete(&url).body(body))
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RemovalResponse { status, body })
    }
}
