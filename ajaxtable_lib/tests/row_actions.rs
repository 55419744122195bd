use std::sync::Arc;
use std::time::Duration;

use ajaxtable_lib::{
    AjaxTable, Client, Dom, History, Host, MemoryDom, MemoryHistory, RowActions, TableConfig,
    TableError,
};
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTAINER: &str = "#notification-list";

fn setup(server: &MockServer) -> (Arc<MemoryDom>, RowActions) {
    let dom = Arc::new(
        MemoryDom::new()
            .with_container(CONTAINER, r#"<li data-id="n-7" class="unread">Driver arrived</li>"#)
            .with_element("unread-count", "1")
            .with_element("total-count", "1"),
    );
    let location = Url::parse(&format!("{}/notifications?page=1", server.uri())).unwrap();
    let history = Arc::new(MemoryHistory::new(location));
    let host = Host::new(
        Client::new(),
        Arc::clone(&dom) as Arc<dyn Dom>,
        history as Arc<dyn History>,
    );
    let base = Url::parse(&format!("{}/notifications", server.uri())).unwrap();
    let config = TableConfig::new(CONTAINER, base)
        .with_per_page(10)
        .with_stat("unread", "unread-count")
        .with_stat("total", "total-count")
        .with_reload_delay(Duration::from_millis(10));
    let table = AjaxTable::initialize(config, &host, None).unwrap();
    (dom, RowActions::new(Arc::new(table)))
}

fn list_after_read() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "html": r#"<li data-id="n-7" class="read">Driver arrived</li>"#,
        "stats": { "unread": 0, "total": 1 }
    }))
}

#[tokio::test]
async fn mark_read_reloads_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications/n-7/mark_read"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "10"))
        .respond_with(list_after_read())
        .expect(1)
        .mount(&server)
        .await;

    let (dom, actions) = setup(&server);
    let resp = actions.run("mark_read", "n-7").await.unwrap();
    assert!(resp.success);

    assert!(dom.inner_html(CONTAINER).unwrap().contains(r#"class="read""#));
    assert_eq!(dom.text("unread-count").as_deref(), Some("0"));
    assert_eq!(dom.text("total-count").as_deref(), Some("1"));
}

#[tokio::test]
async fn rejected_action_leaves_list_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications/n-7/delete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": false, "message": "already deleted"}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(list_after_read())
        .expect(0)
        .mount(&server)
        .await;

    let (dom, actions) = setup(&server);
    let err = actions.run("delete", "n-7").await.unwrap_err();
    match err {
        TableError::ActionRejected(msg) => assert_eq!(msg, "already deleted"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(dom.inner_html(CONTAINER).unwrap().contains("unread"));
}

#[tokio::test]
async fn failed_action_request_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let (_dom, actions) = setup(&server);
    let err = actions.run("delete", "n-7").await.unwrap_err();
    assert!(matches!(err, TableError::Api(_)));
}

#[tokio::test]
async fn batch_action_posts_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications/batch/mark_read"))
        .and(body_json(serde_json::json!({"ids": ["n-7", "n-8"]})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(list_after_read())
        .expect(1)
        .mount(&server)
        .await;

    let (_dom, actions) = setup(&server);
    let ids = vec!["n-7".to_string(), "n-8".to_string()];
    assert!(actions.run_batch("mark_read", &ids).await.is_ok());
}

#[tokio::test]
async fn empty_batch_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
        .expect(0)
        .mount(&server)
        .await;

    let (_dom, actions) = setup(&server);
    let err = actions.run_batch("delete", &[]).await.unwrap_err();
    assert!(matches!(err, TableError::ActionRejected(_)));
}
