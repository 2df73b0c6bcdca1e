use axum::http::Method;
use serde_json::json;
use tfe_team_prune::{
    run, AppError, EmailSet, ExitStatus, HttpPlatformClient, OutcomeReporter, PlatformClient,
    RemovalRequest, RunResult,
};

mod common;

fn request(team: &str, emails: &[&str]) -> RemovalRequest {
    RemovalRequest {
        organization: "acme".to_string(),
        team_name: team.to_string(),
        emails: EmailSet::from_sources(emails).unwrap(),
    }
}

fn render(result: &RunResult) -> (ExitStatus, String) {
    let mut reporter = OutcomeReporter::new(Vec::new());
    let status = reporter.report(result).unwrap();
    (status, String::from_utf8(reporter.into_inner()).unwrap())
}

#[tokio::test]
async fn test_member_removed_and_non_member_reported() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership("a@x.com", "ou-a", "user-a", &["team-123"])
        .membership("b@x.com", "ou-b", "user-b", &["team-999"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(&client, &config, &request("owners", &["a@x.com", "b@x.com"]))
        .await
        .unwrap();
    let (status, output) = render(&result);

    assert_eq!(status.code(), 0);
    assert_eq!(output.matches("Removed ").count(), 1);
    assert!(output.contains("Removed a@x.com (org_membership_id=ou-a) from team 'owners'"));
    assert!(output.contains("b@x.com: found user_id=user-b org_membership_id=ou-b"));
    assert!(output.contains("users_count=4, visibility=secret"));

    let deletes = platform.requests_with(Method::DELETE);
    assert_eq!(deletes.len(), 1);
    assert_eq!(
        deletes[0].path,
        "/api/v2/teams/team-123/relationships/organization-memberships"
    );
    assert_eq!(
        deletes[0].body,
        Some(json!({"data": [{"type": "organization-memberships", "id": "ou-a"}]}))
    );
    assert_eq!(
        deletes[0].content_type.as_deref(),
        Some("application/vnd.api+json")
    );
}

#[tokio::test]
async fn test_every_call_carries_bearer_token_and_encoded_query() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership("user@example.com", "ou-1", "user-1", &["team-123"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    run(&client, &config, &request("owners", &["user@example.com"]))
        .await
        .unwrap();

    let requests = platform.requests();
    assert_eq!(requests.len(), 3);
    for r in &requests {
        assert_eq!(r.authorization.as_deref(), Some("Bearer test-token"));
    }
    assert_eq!(requests[0].path, "/api/v2/organizations/acme/teams");
    assert_eq!(
        requests[1].path,
        "/api/v2/organizations/acme/organization-memberships"
    );
    assert_eq!(requests[1].query.as_deref(), Some("q=user%40example.com"));
}

#[tokio::test]
async fn test_missing_team_only_lists_teams() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership("a@x.com", "ou-a", "user-a", &["team-123"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(&client, &config, &request("ghost-team", &["a@x.com"]))
        .await
        .unwrap();
    let (status, output) = render(&result);

    assert_eq!(status.code(), 2);
    assert!(output.contains("not checked"));
    let requests = platform.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/v2/organizations/acme/teams");
}

#[tokio::test]
async fn test_bulk_error_body_printed_verbatim() {
    let error_body = r#"{"errors":[{"status":"422","title":"invalid relationship"}]}"#;
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "organization")
        .membership("a@x.com", "ou-a", "user-a", &["team-123"])
        .removal_response(422, error_body)
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(&client, &config, &request("owners", &["a@x.com"]))
        .await
        .unwrap();
    let (status, output) = render(&result);

    assert_eq!(status.code(), 4);
    assert!(output.contains(error_body));
    assert!(!output.contains("Removed "));
}

#[tokio::test]
async fn test_not_found_email_does_not_block_others() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership("b@x.com", "ou-b", "user-b", &["team-123"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(&client, &config, &request("owners", &["a@x.com", "b@x.com"]))
        .await
        .unwrap();
    let (status, output) = render(&result);

    assert_eq!(status.code(), 1);
    assert!(output.contains("a@x.com: No organization membership found"));
    assert!(output.contains("Removed b@x.com"));
    assert_eq!(platform.requests_with(Method::DELETE).len(), 1);
}

#[tokio::test]
async fn test_search_hit_for_other_address_is_not_found() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership_listed_as("bob@x.com", "bob@x.com.au", "ou-au", "user-au", &["team-123"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(&client, &config, &request("owners", &["bob@x.com"]))
        .await
        .unwrap();
    let (status, output) = render(&result);

    assert_eq!(status, ExitStatus::EmailNotFound);
    assert!(output.contains("bob@x.com: No organization membership found"));
    assert!(!output.contains("ou-au"));
    assert!(platform.requests_with(Method::DELETE).is_empty());
}

#[tokio::test]
async fn test_resolved_but_not_member_exits_3_without_delete() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership("a@x.com", "ou-a", "user-a", &["team-999"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(&client, &config, &request("owners", &["a@x.com"]))
        .await
        .unwrap();

    assert_eq!(result.exit_status().code(), 3);
    assert!(platform.requests_with(Method::DELETE).is_empty());
}

#[tokio::test]
async fn test_shared_membership_id_sent_once_per_email() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .membership("user1@example.com", "ou-X", "user-X", &["team-123"])
        .membership("user2@example.com", "ou-X", "user-X", &["team-123"])
        .membership("user3@example.com", "ou-X", "user-X", &["team-123"])
        .start()
        .await;
    let config = common::test_config(&platform.base_url);
    let client = HttpPlatformClient::new(&config).unwrap();

    let result = run(
        &client,
        &config,
        &request(
            "owners",
            &["# comment line\nuser1@example.com, user2@example.com\nuser3@example.com"],
        ),
    )
    .await
    .unwrap();

    assert_eq!(result.exit_status(), ExitStatus::Success);
    let deletes = platform.requests_with(Method::DELETE);
    assert_eq!(deletes.len(), 1);
    let data = deletes[0].body.as_ref().unwrap()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 3);
}

#[tokio::test]
async fn test_wrong_token_surfaces_api_error() {
    let platform = common::MockPlatformBuilder::new()
        .team("team-123", "owners", 4, "secret")
        .start()
        .await;
    let mut config = common::test_config(&platform.base_url);
    config.platform.token = Some("wrong-token".to_string());
    let client = HttpPlatformClient::new(&config).unwrap();

    let err = client.list_teams("acme").await.unwrap_err();
    match err {
        AppError::Api { status, ref body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("unexpected error: {}", other),
    }

    let result = run(&client, &config, &request("owners", &["a@x.com"])).await;
    assert!(matches!(result, Err(AppError::Api { status: 401, .. })));
}
