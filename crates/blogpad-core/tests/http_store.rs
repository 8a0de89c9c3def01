use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use blogpad_core::media::{HttpImageProbe, ImageProbe};
use blogpad_core::models::{Post, PostDraft, Session};
use blogpad_core::posts::{HttpPostStore, PostRepository, RemoteStore};
use blogpad_core::{Error, PostId};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

type Records = Arc<Mutex<Vec<Value>>>;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn list_posts(State(records): State<Records>) -> Json<Value> {
    Json(Value::Array(records.lock().unwrap().clone()))
}

async fn create_post(State(records): State<Records>, Json(body): Json<Value>) -> impl IntoResponse {
    records.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn get_post(State(records): State<Records>, Path(id): Path<String>) -> impl IntoResponse {
    let records = records.lock().unwrap();
    match records.iter().find(|record| record["id"] == id.as_str()) {
        Some(record) => Json(record.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_post(
    State(records): State<Records>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut records = records.lock().unwrap();
    match records.iter_mut().find(|record| record["id"] == id.as_str()) {
        Some(record) => {
            *record = body.clone();
            Json(body).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_post(State(records): State<Records>, Path(id): Path<String>) -> StatusCode {
    let mut records = records.lock().unwrap();
    let before = records.len();
    records.retain(|record| record["id"] != id.as_str());
    if records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn png() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES)
}

async fn html() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<html></html>")
}

async fn spawn_server(seed: Vec<Value>) -> (SocketAddr, Records) {
    let records: Records = Arc::new(Mutex::new(seed));
    let app = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/img/ok.png", get(png))
        .route("/img/page", get(html))
        .with_state(records.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, records)
}

fn store(addr: SocketAddr) -> HttpPostStore {
    HttpPostStore::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
}

fn record(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Ana Lee",
        "description": "body",
        "image": "https://img.example/a.png",
        "createdAt": 1_771_200_000_000_i64,
        "date": "16/02/2026",
        "ownerId": "ana",
        "ownerEmail": "ana@x.com",
    })
}

fn ana() -> Session {
    Session::for_email("ana@x.com")
}

#[tokio::test]
async fn list_and_get_decode_remote_records() {
    let (addr, _) = spawn_server(vec![record("1", "First"), record("2", "Second")]).await;
    let store = store(addr);

    let posts = store.list().await.unwrap();
    let titles: Vec<&str> = posts.iter().map(|post| post.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let post = store.get(&PostId::from("2")).await.unwrap();
    assert_eq!(post.title, "Second");
    assert_eq!(post.owner_email.as_deref(), Some("ana@x.com"));
}

#[tokio::test]
async fn numeric_ids_are_accepted() {
    let mut seeded = record("ignored", "Numeric");
    seeded["id"] = json!(7);
    let (addr, _) = spawn_server(vec![seeded]).await;

    let posts = store(addr).list().await.unwrap();
    assert_eq!(posts[0].id, PostId::from(7_u64));
}

#[tokio::test]
async fn missing_post_maps_to_not_found() {
    let (addr, _) = spawn_server(Vec::new()).await;
    let store = store(addr);

    assert!(matches!(
        store.get(&PostId::from("404")).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.delete(&PostId::from("404")).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn malformed_record_fails_the_list() {
    let mut broken = record("2", "Broken");
    broken["image"] = json!("");
    let (addr, _) = spawn_server(vec![record("1", "Fine"), broken]).await;

    assert!(matches!(
        store(addr).list().await,
        Err(Error::MalformedRecord(_))
    ));
}

#[tokio::test]
async fn repository_round_trips_through_http() {
    let (addr, records) = spawn_server(Vec::new()).await;
    let mut repository = PostRepository::new(store(addr));

    let created = repository
        .create(
            PostDraft::new("Hi", "First post", "https://img.example/a.png"),
            &ana(),
        )
        .await
        .unwrap();
    assert_eq!(created.author, "ana");
    assert_eq!(records.lock().unwrap().len(), 1);

    let updated = repository
        .update(
            &created.id,
            PostDraft::new("Hello", "Edited", "https://img.example/b.png"),
            &ana(),
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(records.lock().unwrap()[0]["title"], "Hello");

    let listed = repository.list().await.unwrap();
    assert_eq!(listed, std::slice::from_ref(&updated));

    repository.delete(&created.id).await.unwrap();
    assert!(repository.cached().is_empty());
    assert!(records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn foreign_edit_is_rejected_before_any_write() {
    let (addr, records) = spawn_server(vec![record("1", "Mine")]).await;
    let mut repository = PostRepository::new(store(addr));
    repository.list().await.unwrap();

    let result = repository
        .update(
            &PostId::from("1"),
            PostDraft::new("Taken", "over", "https://img.example/b.png"),
            &Session::for_email("bob@x.com"),
        )
        .await;

    assert!(matches!(result, Err(Error::Forbidden(_))));
    assert_eq!(records.lock().unwrap()[0]["title"], "Mine");
    assert_eq!(repository.cached()[0].title, "Mine");
}

#[tokio::test]
async fn unreachable_store_is_a_network_error() {
    let dead = HttpPostStore::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

    assert!(matches!(dead.list().await, Err(Error::Network(_))));
}

#[tokio::test]
async fn probe_accepts_images_only() {
    let (addr, _) = spawn_server(Vec::new()).await;
    let probe = HttpImageProbe::new(Duration::from_secs(2)).unwrap();

    assert!(probe.is_loadable(&format!("http://{addr}/img/ok.png")).await);
    assert!(!probe.is_loadable(&format!("http://{addr}/img/page")).await);
    assert!(!probe.is_loadable(&format!("http://{addr}/img/missing.png")).await);
}

#[test]
fn post_serializes_with_camel_case_fields() {
    let post: Post = serde_json::from_value(record("1", "First")).unwrap();
    let value = serde_json::to_value(&post).unwrap();
    assert_eq!(value["createdAt"], json!(1_771_200_000_000_i64));
    assert_eq!(value["ownerEmail"], json!("ana@x.com"));
}
