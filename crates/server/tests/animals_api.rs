use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use service::animal::repo::seaorm::SeaOrmAnimalRepository;
use service::animal::repository::mock::{MockAnimalRepository, UpdateConflict};
use tower::ServiceExt;

use server::{routes, state::ServerState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn mock_app() -> (Arc<MockAnimalRepository>, Router) {
    let repo = Arc::new(MockAnimalRepository::default());
    let state = ServerState::with_repository(repo.clone());
    (repo, routes::build_router(state, cors()))
}

async fn sqlite_app() -> anyhow::Result<Router> {
    let mut cfg = models::db::DatabaseConfig::from(&configs::DatabaseConfig::default());
    cfg.url = "sqlite::memory:".into();
    cfg.max_connections = 1;
    cfg.min_connections = 1;
    let db = models::db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    let state = ServerState::with_repository(Arc::new(SeaOrmAnimalRepository { db }));
    Ok(routes::build_router(state, cors()))
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<Reply> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await?.to_vec();
    Ok(Reply { status, headers, body })
}

async fn send_raw(app: &Router, method: &str, uri: &str, raw: &'static str) -> anyhow::Result<StatusCode> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))?;
    Ok(app.clone().oneshot(req).await?.status())
}

async fn create_rex(app: &Router) -> anyhow::Result<i64> {
    let res = send(app, "POST", "/animals", Some(json!({"species": "T-Rex", "name": "Rex", "age": 5}))).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    res.json()["id"].as_i64().ok_or_else(|| anyhow::anyhow!("missing id"))
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let res = send(&app, "GET", "/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn create_returns_created_with_location_and_ignores_body_id() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let res = send(&app, "POST", "/animals", Some(json!({"id": 77, "species": "T-Rex", "name": "Rex", "age": 5}))).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json(), json!({"id": 1, "species": "T-Rex", "name": "Rex", "age": 5}));
    assert_eq!(res.headers.get(header::LOCATION).and_then(|v| v.to_str().ok()), Some("/animals/1"));

    let res = send(&app, "GET", "/animals/1", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"id": 1, "species": "T-Rex", "name": "Rex", "age": 5}));
    Ok(())
}

#[tokio::test]
async fn list_filters_follow_the_t_rex_scenario() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let id = create_rex(&app).await?;

    let res = send(&app, "GET", "/animals?minimumAge=3", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json().as_array().map(Vec::len), Some(1));
    assert_eq!(res.json()[0]["id"].as_i64(), Some(id));

    let res = send(&app, "GET", "/animals?minimumAge=10", None).await?;
    assert_eq!(res.json(), json!([]));

    let res = send(&app, "GET", "/animals?species=Velociraptor", None).await?;
    assert_eq!(res.json(), json!([]));

    let res = send(&app, "GET", "/animals?species=T-Rex&name=Rex", None).await?;
    assert_eq!(res.json().as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn zero_and_empty_minimum_age_do_not_filter() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    send(&app, "POST", "/animals", Some(json!({"species": "Triceratops", "name": "Egg", "age": 0}))).await?;
    create_rex(&app).await?;

    let all = send(&app, "GET", "/animals", None).await?.json();
    assert_eq!(all.as_array().map(Vec::len), Some(2));
    assert_eq!(send(&app, "GET", "/animals?minimumAge=0", None).await?.json(), all);
    assert_eq!(send(&app, "GET", "/animals?minimumAge=&species=", None).await?.json(), all);
    Ok(())
}

#[tokio::test]
async fn non_numeric_minimum_age_is_bad_request() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let res = send(&app, "GET", "/animals?minimumAge=ancient", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["status"], 400);
    assert_eq!(res.json()["title"], "Invalid Query");
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_bad_request_with_json_body() -> anyhow::Result<()> {
    let (repo, app) = mock_app();
    for (method, body) in [
        ("GET", None),
        ("PUT", Some(json!({"id": 1, "species": "T-Rex", "name": "Rex", "age": 5}))),
        ("DELETE", None),
    ] {
        let res = send(&app, method, "/animals/abc", body).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(res.json()["status"], 400, "{method}");
        assert_eq!(res.json()["title"], "Invalid Path", "{method}");
    }
    assert_eq!(repo.write_count(), 0);
    Ok(())
}

#[tokio::test]
async fn get_unknown_is_not_found() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let res = send(&app, "GET", "/animals/999", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["status"], 404);
    assert_eq!(res.json()["title"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn malformed_or_invalid_create_is_bad_request() -> anyhow::Result<()> {
    let (repo, app) = mock_app();
    assert_eq!(send_raw(&app, "POST", "/animals", "{not json").await?, StatusCode::BAD_REQUEST);
    assert_eq!(send_raw(&app, "POST", "/animals", r#"{"species":"T-Rex"}"#).await?, StatusCode::BAD_REQUEST);
    let res = send(&app, "POST", "/animals", Some(json!({"species": "T-Rex", "name": "Rex", "age": -3}))).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(repo.write_count(), 0);
    Ok(())
}

#[tokio::test]
async fn update_with_id_mismatch_is_bad_request_and_changes_nothing() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let id = create_rex(&app).await?;
    let before = send(&app, "GET", &format!("/animals/{id}"), None).await?.json();

    let res = send(&app, "PUT", &format!("/animals/{id}"), Some(json!({"id": id + 1, "species": "T-Rex", "name": "Other", "age": 9}))).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let after = send(&app, "GET", &format!("/animals/{id}"), None).await?.json();
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn update_replaces_record_with_no_content() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let id = create_rex(&app).await?;

    let res = send(&app, "PUT", &format!("/animals/{id}"), Some(json!({"id": id, "species": "Tyrannosaurus", "name": "Rexy", "age": 6}))).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());

    let after = send(&app, "GET", &format!("/animals/{id}"), None).await?.json();
    assert_eq!(after, json!({"id": id, "species": "Tyrannosaurus", "name": "Rexy", "age": 6}));
    Ok(())
}

#[tokio::test]
async fn update_conflicts_resolve_to_not_found_or_server_error() -> anyhow::Result<()> {
    let (repo, app) = mock_app();
    let id = create_rex(&app).await?;
    let body = json!({"id": id, "species": "T-Rex", "name": "Rexy", "age": 6});

    repo.inject_update_conflict(UpdateConflict::RecordPresent);
    let res = send(&app, "PUT", &format!("/animals/{id}"), Some(body.clone())).await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);

    repo.inject_update_conflict(UpdateConflict::RecordDeleted);
    let res = send(&app, "PUT", &format!("/animals/{id}"), Some(body)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_not_found() -> anyhow::Result<()> {
    let (_, app) = mock_app();
    let id = create_rex(&app).await?;

    let res = send(&app, "DELETE", &format!("/animals/{id}"), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, "GET", &format!("/animals/{id}"), None).await?.status, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "DELETE", &format!("/animals/{id}"), None).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn full_stack_on_sqlite() -> anyhow::Result<()> {
    let app = sqlite_app().await?;

    let created = send(&app, "POST", "/animals", Some(json!({"species": "T-Rex", "name": "Rex", "age": 5}))).await?;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_i64().ok_or_else(|| anyhow::anyhow!("missing id"))?;
    let location = format!("/animals/{id}");
    assert_eq!(created.headers.get(header::LOCATION).and_then(|v| v.to_str().ok()), Some(location.as_str()));

    let fetched = send(&app, "GET", &location, None).await?;
    assert_eq!(fetched.json(), json!({"id": id, "species": "T-Rex", "name": "Rex", "age": 5}));

    assert_eq!(send(&app, "GET", "/animals?minimumAge=3", None).await?.json().as_array().map(Vec::len), Some(1));
    assert_eq!(send(&app, "GET", "/animals?minimumAge=10", None).await?.json(), json!([]));

    let res = send(&app, "PUT", &location, Some(json!({"id": id, "species": "T-Rex", "name": "Rexy", "age": 11}))).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, "GET", "/animals?minimumAge=10", None).await?.json().as_array().map(Vec::len), Some(1));

    // no such row: the store updates nothing and the re-check finds nothing
    let res = send(&app, "PUT", "/animals/4242", Some(json!({"id": 4242, "species": "T-Rex", "name": "Ghost", "age": 1}))).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    assert_eq!(send(&app, "DELETE", &location, None).await?.status, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, "GET", &location, None).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}
