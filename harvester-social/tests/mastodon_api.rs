use harvester_config::AccountConfig;
use harvester_social::mastodon::{
    AccountFailure, MastodonApi, StatusSource, TagQuery, harvest_account,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account(server: &MockServer, account_id: &str) -> AccountConfig {
    AccountConfig {
        name: "account1".into(),
        instance: server.uri(),
        account_id: account_id.into(),
        access_token: "s3cret".into(),
    }
}

fn todo_query() -> TagQuery {
    TagQuery {
        tag: "todo".into(),
        limit: 40,
    }
}

fn api(server: &MockServer) -> MastodonApi {
    MastodonApi::new(&server.uri(), "s3cret")
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn lookup_then_tagged_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/lookup"))
        .and(query_param("acct", "username1"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "42", "acct": "username1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/42/statuses"))
        .and(query_param("tagged", "todo"))
        .and(query_param("limit", "40"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "111",
                "created_at": "2024-05-01T09:15:00.000Z",
                "content": "<p>Renew <a href=\"https://mastodon.example/tags/todo\">#<span>todo</span></a> passport</p>",
                "visibility": "public"
            },
            {
                "id": "112",
                "created_at": null,
                "content": "<p>Someday</p>",
                "visibility": "private"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome =
        harvest_account(&api(&server), &account(&server, "username1"), &todo_query()).await;
    let harvest = outcome.result.expect("harvest succeeds");
    assert_eq!(harvest.account_id, "42");
    assert_eq!(harvest.records.len(), 2);
    assert_eq!(harvest.records[0].content, "Renew #todo passport");
    assert_eq!(harvest.records[0].date, "2024-05-01");
    assert_eq!(harvest.records[0].time, "09:15:00");
    assert_eq!(harvest.records[1].date, "N/A");
    assert_eq!(harvest.records[1].visibility, "private");
}

#[tokio::test]
async fn numeric_id_goes_straight_to_statuses() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/accounts/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/12345/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = harvest_account(&api(&server), &account(&server, "12345"), &todo_query()).await;
    assert!(outcome.is_success());
    assert!(outcome.records().is_empty());
}

#[tokio::test]
async fn lookup_404_is_unresolved() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/accounts/lookup"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Record not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = harvest_account(&api(&server), &account(&server, "ghost"), &todo_query()).await;
    match outcome.result {
        Err(AccountFailure::Unresolved { handle, cause }) => {
            assert_eq!(handle, "ghost");
            assert!(cause.contains("Record not found"));
        }
        other => panic!("expected unresolved, got {other:?}"),
    }
}

#[tokio::test]
async fn statuses_error_keeps_api_response() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/accounts/5/statuses"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "The access token is invalid"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = harvest_account(&api(&server), &account(&server, "5"), &todo_query()).await;
    match outcome.result {
        Err(AccountFailure::Fetch { api_response, .. }) => {
            assert!(api_response.unwrap().contains("access token is invalid"));
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
}

#[tokio::test]
async fn non_array_body_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/accounts/5/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let outcome = harvest_account(&api(&server), &account(&server, "5"), &todo_query()).await;
    assert!(matches!(outcome.result, Err(AccountFailure::Fetch { .. })));
}

#[tokio::test]
async fn client_reports_raw_elements() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/accounts/9/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}, "junk"])))
        .mount(&server)
        .await;

    let page = api(&server).tagged_statuses("9", "todo", 10).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[1], json!("junk"));
}
