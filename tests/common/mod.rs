#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

use firestore_dashboard_api::{
    auth::StaticToken,
    config::{CollectionsConfig, FirestoreConfig, SecurityConfig},
    firestore::FirestoreClient,
    routes,
    services::DashboardService,
};

pub const TOKEN: &str = "test-token";
pub const DOCS_ROOT: &str = "projects/demo/databases/(default)/documents";

/// A request the mock Firestore received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct MockFirestore {
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockFirestore {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

pub struct TestEnv {
    pub base_url: String,
    pub firestore_url: String,
    pub mock: MockFirestore,
    /// The client the API was built with, for driving it directly
    pub client: FirestoreClient,
}

/// Knobs for the API under test
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub page_size: Option<u32>,
    pub dead_letters_parent: String,
    pub timeout_secs: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            page_size: None,
            dead_letters_parent: String::new(),
            timeout_secs: 5,
        }
    }
}

/// Serve a router on a free local port and return its base URL.
pub async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Start a mock Firestore plus the dashboard API pointed at it.
pub async fn start() -> Result<TestEnv> {
    start_with(TestOptions::default()).await
}

pub async fn start_with_page_size(page_size: Option<u32>) -> Result<TestEnv> {
    start_with(TestOptions {
        page_size,
        ..TestOptions::default()
    })
    .await
}

pub async fn start_with(options: TestOptions) -> Result<TestEnv> {
    let mock = MockFirestore::default();
    let firestore_url = serve(Router::new().fallback(mock_firestore).with_state(mock.clone())).await?;
    let (base_url, client) = spawn_api(&firestore_url, &options).await?;

    Ok(TestEnv {
        base_url,
        firestore_url,
        mock,
        client,
    })
}

/// Serve the dashboard API against an arbitrary Firestore base URL.
pub async fn spawn_api(firestore_url: &str, options: &TestOptions) -> Result<(String, FirestoreClient)> {
    let config = FirestoreConfig {
        project_id: "demo".into(),
        database_id: "(default)".into(),
        base_url: firestore_url.to_string(),
        page_size: options.page_size,
        timeout_secs: options.timeout_secs,
    };
    let client = FirestoreClient::new(&config, Arc::new(StaticToken::new(TOKEN)))?;
    let service = DashboardService::new(
        client.clone(),
        CollectionsConfig {
            restaurants: "restaurants".into(),
            dead_letters_parent: options.dead_letters_parent.clone(),
        },
    );
    let security = SecurityConfig {
        enable_cors: true,
        cors_origins: Vec::new(),
    };

    let base_url = serve(routes::app(service, &security)).await?;
    Ok((base_url, client))
}

async fn mock_firestore(
    State(mock): State<MockFirestore>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_json: Option<Value> = serde_json::from_str(&body).ok();

    mock.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        body: body_json.clone(),
    });

    if authorization.as_deref() != Some(format!("Bearer {}", TOKEN).as_str()) {
        return google_error(StatusCode::UNAUTHORIZED, "Request had invalid authentication credentials.");
    }

    let path = uri.path();
    let query = uri.query().unwrap_or_default();

    if method == Method::GET && path == format!("/{}/restaurants", DOCS_ROOT) {
        return restaurants_page(query);
    }

    // A listing whose server keeps handing back the same cursor
    if method == Method::GET && path == format!("/{}/looping", DOCS_ROOT) {
        return Json(json!({
            "documents": [restaurant("L001", "Loop")],
            "nextPageToken": "same-page"
        }))
        .into_response();
    }

    if method == Method::POST && path == format!("/{}:runQuery", DOCS_ROOT) {
        return match collection_id(&body_json).as_deref() {
            Some("I001") => Json(latest_orders()).into_response(),
            Some("2024-12-16") => Json(dead_letters()).into_response(),
            Some("FAIL") => google_error(StatusCode::FORBIDDEN, "Missing or insufficient permissions."),
            Some("GARBAGE") => (StatusCode::OK, "not json").into_response(),
            Some("SLOW") => {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!([{ "readTime": "2024-12-16T00:00:00Z" }])).into_response()
            }
            _ => Json(json!([{ "readTime": "2024-12-16T00:00:00Z" }])).into_response(),
        };
    }

    if method == Method::POST && path == format!("/{}/dead-letters/NANALL:runQuery", DOCS_ROOT) {
        return match collection_id(&body_json).as_deref() {
            Some("2024-12-16") => Json(dead_letters()).into_response(),
            _ => Json(json!([{ "readTime": "2024-12-16T00:00:00Z" }])).into_response(),
        };
    }

    google_error(StatusCode::NOT_FOUND, "not found")
}

fn collection_id(body: &Option<Value>) -> Option<String> {
    body.as_ref()?
        .pointer("/structuredQuery/from/0/collectionId")?
        .as_str()
        .map(str::to_string)
}

fn google_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": "ERROR" }
        })),
    )
        .into_response()
}

fn restaurant(id: &str, name: &str) -> Value {
    json!({
        "name": format!("{}/restaurants/{}", DOCS_ROOT, id),
        "fields": { "name": { "stringValue": name } },
        "createTime": "2024-01-01T00:00:00Z",
        "updateTime": "2024-01-02T00:00:00Z"
    })
}

fn restaurants_page(query: &str) -> Response {
    if query.contains("pageToken=page-2") {
        Json(json!({ "documents": [restaurant("R003", "Carlton")] })).into_response()
    } else {
        Json(json!({
            "documents": [restaurant("R001", "Parramatta"), restaurant("R002", "Bondi")],
            "nextPageToken": "page-2"
        }))
        .into_response()
    }
}

fn latest_orders() -> Value {
    json!([
        {
            "document": {
                "name": format!("{}/latest-orders/NSW/I001/o1", DOCS_ROOT),
                "fields": {
                    "orderNumber": { "stringValue": "SO-1001" },
                    "createdAt": { "stringValue": "2024-12-16T08:00:00Z" },
                    "datePosted": { "stringValue": "2024-12-16" }
                }
            },
            "readTime": "2024-12-16T10:00:00Z"
        },
        {
            "document": {
                "name": format!("{}/latest-orders/VIC/I001/o2", DOCS_ROOT),
                "fields": { "orderNumber": { "stringValue": "SO-1002" } }
            },
            "readTime": "2024-12-16T10:00:00Z"
        },
        { "readTime": "2024-12-16T10:00:00Z" }
    ])
}

fn store_order(state: &str, code: &str, suburb: &str) -> Value {
    json!({ "mapValue": { "fields": { "BillTo": { "mapValue": { "fields": {
        "State": { "stringValue": state },
        "StoreCode": { "stringValue": code },
        "Suburb": { "stringValue": suburb }
    }}}}}})
}

fn dead_letters() -> Value {
    json!([
        {
            "document": {
                "name": format!("{}/dead-letters/NANALL/2024-12-16/d1", DOCS_ROOT),
                "fields": {
                    "errorMessage": { "stringValue": "store offline" },
                    "originalPayload": { "mapValue": { "fields": {
                        "OrderNumber": { "stringValue": "SO-2001" },
                        "StoreOrders": { "arrayValue": { "values": [
                            store_order("NSW", "S01", "Parramatta"),
                            store_order("QLD", "S07", "Fortitude Valley")
                        ]}}
                    }}}
                }
            }
        },
        {
            "document": {
                "name": format!("{}/dead-letters/NANALL/2024-12-16/d2", DOCS_ROOT)
            }
        },
        {
            "document": {
                "name": format!("{}/dead-letters/NANALL/2024-12-16/d3", DOCS_ROOT),
                "fields": { "errorMessage": { "stringValue": "schema mismatch" } }
            }
        }
    ])
}
