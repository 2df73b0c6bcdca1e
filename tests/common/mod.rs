#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tfe_team_prune::config::{AppConfig, LoggingConfig, PlatformConfig, RemovalConfig};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "test-token";

/// One request as seen by the mock platform
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    memberships: HashMap<String, Vec<Value>>,
    teams: Vec<Value>,
    removal_status: u16,
    removal_body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Option<Value>) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: header("authorization"),
            content_type: header("content-type"),
            body,
        });
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(|h| h == format!("Bearer {}", TEST_TOKEN))
            .unwrap_or(false)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"errors": [{"status": "401", "title": "unauthorized"}]})),
    )
        .into_response()
}

async fn search_memberships(
    State(state): State<Arc<MockState>>,
    Path(_org): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(Method::GET, &uri, &headers, None);
    if !MockState::authorized(&headers) {
        return unauthorized();
    }

    let email = params.get("q").cloned().unwrap_or_default();
    let data = state.memberships.get(&email).cloned().unwrap_or_default();
    Json(json!({ "data": data })).into_response()
}

async fn list_teams(
    State(state): State<Arc<MockState>>,
    Path(_org): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(Method::GET, &uri, &headers, None);
    if !MockState::authorized(&headers) {
        return unauthorized();
    }

    Json(json!({ "data": state.teams })).into_response()
}

async fn remove_team_memberships(
    State(state): State<Arc<MockState>>,
    Path(_team_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed = serde_json::from_slice(&body).ok();
    state.record(Method::DELETE, &uri, &headers, parsed);
    if !MockState::authorized(&headers) {
        return unauthorized();
    }

    let status = StatusCode::from_u16(state.removal_status).unwrap_or(StatusCode::NO_CONTENT);
    (status, state.removal_body.clone()).into_response()
}

/// Builder for an in-process stand-in of the platform API
pub struct MockPlatformBuilder {
    state: MockState,
}

impl MockPlatformBuilder {
    pub fn new() -> Self {
        Self {
            state: MockState {
                removal_status: 204,
                ..MockState::default()
            },
        }
    }

    pub fn membership(self, email: &str, id: &str, user_id: &str, team_ids: &[&str]) -> Self {
        self.membership_listed_as(email, email, id, user_id, team_ids)
    }

    /// Membership returned for the `q` search `query` whose own email is `email`
    pub fn membership_listed_as(
        mut self,
        query: &str,
        email: &str,
        id: &str,
        user_id: &str,
        team_ids: &[&str],
    ) -> Self {
        let teams: Vec<Value> = team_ids
            .iter()
            .map(|t| json!({"id": t, "type": "teams"}))
            .collect();
        self.state
            .memberships
            .entry(query.to_string())
            .or_default()
            .push(json!({
                "id": id,
                "type": "organization-memberships",
                "attributes": {"email": email, "status": "active"},
                "relationships": {
                    "user": {"data": {"id": user_id, "type": "users"}},
                    "teams": {"data": teams}
                }
            }));
        self
    }

    pub fn team(mut self, id: &str, name: &str, users_count: u64, visibility: &str) -> Self {
        self.state.teams.push(json!({
            "id": id,
            "type": "teams",
            "attributes": {"name": name, "users-count": users_count, "visibility": visibility}
        }));
        self
    }

    pub fn removal_response(mut self, status: u16, body: &str) -> Self {
        self.state.removal_status = status;
        self.state.removal_body = body.to_string();
        self
    }

    pub async fn start(self) -> MockPlatform {
        let state = Arc::new(self.state);

        let app = Router::new()
            .route(
                "/api/v2/organizations/{org}/organization-memberships",
                get(search_memberships),
            )
            .route("/api/v2/organizations/{org}/teams", get(list_teams))
            .route(
                "/api/v2/teams/{team_id}/relationships/organization-memberships",
                delete(remove_team_memberships),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockPlatform {
            base_url: format!("http://{}", addr),
            state,
        }
    }
}

pub struct MockPlatform {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockPlatform {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_with(&self, method: Method) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

/// Configuration pointing at the mock platform, no settling delay
pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        platform: PlatformConfig {
            host: base_url.to_string(),
            token: Some(TEST_TOKEN.to_string()),
            organization: Some("acme".to_string()),
        },
        removal: RemovalConfig {
            settle_delay_secs: 0,
        },
        logging: LoggingConfig::default(),
    }
}
