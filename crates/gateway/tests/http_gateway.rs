//! HttpGateway against a local fake PostgREST

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use gateway::{HttpGateway, TableGateway};
use query::{Filter, QueryParams};
use serde_json::{json, Value};
use shared::{MutationOutcome, RestConfig, RestError, Row};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    table: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn handle(
    State(log): State<Log>,
    method: Method,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = String::from_utf8_lossy(&body).to_string();
    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        table: table.clone(),
        query,
        headers: headers.clone(),
        body: body.clone(),
    });

    match (method, table.as_str()) {
        (_, "boom") => (StatusCode::INTERNAL_SERVER_ERROR, "kaboom").into_response(),
        // 2xx codes outside each method's accepted set
        (Method::GET, "off_status") => StatusCode::NO_CONTENT.into_response(),
        (Method::POST, "off_status") => StatusCode::NO_CONTENT.into_response(),
        (Method::PATCH, "off_status") => (StatusCode::CREATED, "[]").into_response(),
        (Method::DELETE, "off_status") => (StatusCode::ACCEPTED, "[]").into_response(),
        (Method::HEAD, "opere") => (StatusCode::OK, [("content-range", "0-0/42")]).into_response(),
        (Method::HEAD, "uncounted") => (StatusCode::OK, [("content-range", "0-0/*")]).into_response(),
        (Method::GET, "past_end") => StatusCode::RANGE_NOT_SATISFIABLE.into_response(),
        (Method::GET, "object") => (StatusCode::OK, r#"{"id": 1}"#).into_response(),
        (Method::GET, "partial") => (
            StatusCode::PARTIAL_CONTENT,
            [("content-range", "0-1/5")],
            r#"[{"id": 1}, {"id": 2}]"#,
        )
            .into_response(),
        (Method::GET, _) => (
            StatusCode::OK,
            r#"[{"titolo": "La grande bellezza"}, {"titolo": "Il divo"}]"#,
        )
            .into_response(),
        (Method::POST, _) => (StatusCode::CREATED, body).into_response(),
        (Method::PATCH, _) => StatusCode::NO_CONTENT.into_response(),
        (Method::DELETE, _) => (StatusCode::OK, r#"[{"id": "a"}, {"id": "b"}]"#).into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn start_server() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/rest/v1/{table}", any(handle))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), log)
}

async fn gateway() -> (HttpGateway, Log) {
    let (url, log) = start_server().await;
    let gateway = HttpGateway::new(RestConfig::new(url, "test-key")).unwrap();
    (gateway, log)
}

fn last(log: &Log) -> Recorded {
    log.lock().unwrap().last().cloned().unwrap()
}

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

// ============== Reads ==============

#[tokio::test]
async fn test_execute_sends_auth_and_filters() {
    let (gateway, log) = gateway().await;
    let params = QueryParams::new()
        .select(["titolo", "anno_produzione"])
        .filter(Filter::eq("tipo", "film"))
        .limit(5);

    let rows = gateway.execute("opere", &params).await.unwrap();
    assert_eq!(rows.len(), 2);

    let request = last(&log);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.table, "opere");
    assert_eq!(request.headers.get("apikey").unwrap(), "test-key");
    assert_eq!(request.headers.get("authorization").unwrap(), "Bearer test-key");
    assert_eq!(request.headers.get("prefer").unwrap(), "count=exact");
    assert_eq!(
        request.query,
        vec![
            ("select".to_string(), "titolo,anno_produzione".to_string()),
            ("tipo".to_string(), "eq.film".to_string()),
            ("limit".to_string(), "5".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_execute_encodes_pattern_and_list_filters() {
    let (gateway, log) = gateway().await;
    let params = QueryParams::new()
        .filter(Filter::contains("titolo", "bellezza"))
        .filter(Filter::in_list("id", ["a", "b,c"]));

    gateway.execute("opere", &params).await.unwrap();

    let request = last(&log);
    assert_eq!(
        request.query,
        vec![
            ("titolo".to_string(), "ilike.*bellezza*".to_string()),
            ("id".to_string(), r#"in.(a,"b,c")"#.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_execute_accepts_partial_content() {
    let (gateway, _log) = gateway().await;
    let rows = gateway.execute("partial", &QueryParams::new()).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_execute_non_array_body_is_decode_error() {
    let (gateway, _log) = gateway().await;
    let err = gateway.execute("object", &QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, RestError::Decode(_)));
}

#[tokio::test]
async fn test_execute_error_status_carries_body() {
    let (gateway, _log) = gateway().await;
    let err = gateway.execute("boom", &QueryParams::new()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("kaboom"));
}

#[tokio::test]
async fn test_count_uses_head_and_content_range() {
    let (gateway, log) = gateway().await;
    let params = QueryParams::new().filter(Filter::eq("tipo", "film")).limit(1);

    assert_eq!(gateway.count("opere", &params).await.unwrap(), 42);

    let request = last(&log);
    assert_eq!(request.method, Method::HEAD);
    assert_eq!(request.query, vec![("tipo".to_string(), "eq.film".to_string())]);
}

#[tokio::test]
async fn test_count_without_total_fails() {
    let (gateway, _log) = gateway().await;
    let err = gateway.count("uncounted", &QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, RestError::ContentRange(_)));
}

#[tokio::test]
async fn test_fetch_page_sends_range() {
    let (gateway, log) = gateway().await;
    let page = gateway
        .fetch_page("partial", &QueryParams::new().limit(99), 0, 2)
        .await
        .unwrap();

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.total(), Some(5));

    let request = last(&log);
    assert_eq!(request.headers.get("range").unwrap(), "0-1");
    assert!(request.query.iter().all(|(k, _)| k != "limit"));
}

#[tokio::test]
async fn test_fetch_page_past_end_is_empty() {
    let (gateway, _log) = gateway().await;
    let page = gateway.fetch_page("past_end", &QueryParams::new(), 1000, 1000).await.unwrap();
    assert!(page.rows.is_empty());
}

// ============== Mutations ==============

#[tokio::test]
async fn test_insert_posts_json_array() {
    let (gateway, log) = gateway().await;
    let rows = vec![row(json!({"nome": "Mario", "cognome": "Rossi"}))];

    let inserted = gateway.insert("artisti", &rows).await.unwrap();
    assert_eq!(inserted, rows);

    let request = last(&log);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.headers.get("prefer").unwrap(), "return=representation");
    assert_eq!(request.headers.get("content-type").unwrap(), "application/json");
    let sent: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent, json!([{"nome": "Mario", "cognome": "Rossi"}]));
}

#[tokio::test]
async fn test_insert_empty_makes_no_request() {
    let (gateway, log) = gateway().await;
    assert!(gateway.insert("artisti", &[]).await.unwrap().is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_no_content_is_applied() {
    let (gateway, log) = gateway().await;
    let outcome = gateway
        .update(
            "artisti",
            &row(json!({"stato": "inattivo"})),
            &QueryParams::from_equalities([("nome", "Mario")]),
        )
        .await
        .unwrap();

    assert_eq!(outcome, MutationOutcome::Applied);

    let request = last(&log);
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.query, vec![("nome".to_string(), "eq.Mario".to_string())]);
}

#[tokio::test]
async fn test_delete_returns_rows() {
    let (gateway, _log) = gateway().await;
    let outcome = gateway
        .delete("individuazioni", &QueryParams::new().filter(Filter::in_list("id", ["a", "b"])))
        .await
        .unwrap();
    assert_eq!(outcome.affected(), Some(2));
}

#[tokio::test]
async fn test_unfiltered_delete_never_reaches_server() {
    let (gateway, log) = gateway().await;
    let err = gateway.delete("artisti", &QueryParams::new()).await.unwrap_err();

    assert!(matches!(err, RestError::UnfilteredMutation { .. }));
    assert!(log.lock().unwrap().is_empty());
}

// ============== Accepted statuses ==============

#[tokio::test]
async fn test_get_rejects_no_content() {
    let (gateway, _log) = gateway().await;
    let err = gateway.execute("off_status", &QueryParams::new()).await.unwrap_err();
    assert_eq!(err.status(), Some(204));
}

#[tokio::test]
async fn test_insert_rejects_no_content() {
    let (gateway, log) = gateway().await;
    let err = gateway
        .insert("off_status", &[row(json!({"id": 1}))])
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(204));
    assert_eq!(last(&log).method, Method::POST);
}

#[tokio::test]
async fn test_update_rejects_created() {
    let (gateway, _log) = gateway().await;
    let err = gateway
        .update(
            "off_status",
            &row(json!({"stato": "ok"})),
            &QueryParams::new().filter(Filter::eq("id", 1)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(201));
}

#[tokio::test]
async fn test_delete_rejects_accepted() {
    let (gateway, _log) = gateway().await;
    let err = gateway
        .delete("off_status", &QueryParams::new().filter(Filter::eq("id", 1)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(202));
}

// ============== Transport ==============

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = HttpGateway::new(RestConfig::new(format!("http://{}", addr), "k")).unwrap();
    let err = gateway.execute("opere", &QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, RestError::Transport(_)));
}

#[tokio::test]
async fn test_url_with_rest_path_is_not_doubled() {
    let (url, log) = start_server().await;
    let gateway = HttpGateway::new(RestConfig::new(format!("{}/rest/v1/", url), "k")).unwrap();

    gateway.execute("opere", &QueryParams::new()).await.unwrap();
    assert_eq!(last(&log).table, "opere");
}
