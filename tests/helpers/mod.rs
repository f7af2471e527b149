#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::TcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use lead_enricher::{
    domain::{EnrichmentProgress, EnrichmentSessionContext},
    routes::LeadEnrichmentDriver,
    services::{CandidateStore, LeadEnricher, SearchResultsClient},
    startup::run,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub candidate_id: String,
    pub body: Value,
    pub authorization: Option<String>,
}

/// Stand-in for the dashboard backend: the enrichment endpoint and the
/// search results endpoint.
#[derive(Default)]
pub struct BackendState {
    statuses: Mutex<HashMap<String, u16>>,
    results: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

pub struct MockBackend {
    pub address: String,
    pub state: web::Data<BackendState>,
}

impl MockBackend {
    pub fn respond_with(&self, candidate_id: &str, status: u16) {
        self.state
            .statuses
            .lock()
            .unwrap()
            .insert(candidate_id.to_string(), status);
    }

    pub fn serve_results(&self, query_id: &str, results: Value) {
        self.state
            .results
            .lock()
            .unwrap()
            .insert(query_id.to_string(), results);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }
}

async fn enrich_lead(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Value>,
    state: web::Data<BackendState>,
) -> HttpResponse {
    let candidate_id = path.into_inner();
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    state.calls.lock().unwrap().push(RecordedCall {
        candidate_id: candidate_id.clone(),
        body: body.into_inner(),
        authorization,
    });

    let status = state
        .statuses
        .lock()
        .unwrap()
        .get(&candidate_id)
        .copied()
        .unwrap_or(200);

    HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap())
        .json(serde_json::json!({ "lead_id": candidate_id }))
}

async fn search_results(path: web::Path<String>, state: web::Data<BackendState>) -> HttpResponse {
    match state.results.lock().unwrap().get(path.as_str()) {
        Some(results) => HttpResponse::Ok().json(results),
        None => HttpResponse::NotFound().finish(),
    }
}

pub fn spawn_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let state = web::Data::new(BackendState::default());

    let app_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/api/leads/{candidate_id}/enrich", web::post().to(enrich_lead))
            .route(
                "/api/search-queries/{query_id}/results",
                web::get().to(search_results),
            )
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    tokio::spawn(server);

    MockBackend {
        address: format!("http://127.0.0.1:{}", port),
        state,
    }
}

/// An address nothing listens on.
pub fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub struct TestApp {
    pub address: String,
    pub backend: MockBackend,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_enrich(&self, query_id: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/queries/{}/enrich", self.address, query_id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Polls until the query's batch is no longer running.
    pub async fn wait_for_batch(&self, query_id: &str) -> EnrichmentProgress {
        for _ in 0..250 {
            let res = self.get(&format!("/queries/{}/progress", query_id)).await;
            if res.status().is_success() {
                let progress: Value = res.json().await.unwrap();
                if progress["is_running"] == false {
                    return EnrichmentProgress {
                        total: progress["total"].as_u64().unwrap() as usize,
                        completed: progress["completed"].as_u64().unwrap() as usize,
                        successful: progress["successful"].as_u64().unwrap() as usize,
                        failed: progress["failed"].as_u64().unwrap() as usize,
                        is_running: false,
                    };
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("batch for {} did not finish", query_id);
    }
}

pub fn spawn_app(throttle: Duration) -> TestApp {
    let backend = spawn_backend();

    let enricher = LeadEnricher::new(
        &backend.address,
        Some("test-token".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let driver = LeadEnrichmentDriver::new(enricher, throttle);
    let search = SearchResultsClient::new(&backend.address, Duration::from_secs(5)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = run(listener, driver, Arc::new(search), CandidateStore::new()).unwrap();
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        backend,
        client: reqwest::Client::new(),
    }
}

pub fn session(query_id: &str) -> EnrichmentSessionContext {
    EnrichmentSessionContext {
        account_id: "acc-1".to_string(),
        company_id: "co-1".to_string(),
        company_banner_id: "ban-1".to_string(),
        actor_id: "user-1".to_string(),
        source_query_id: query_id.to_string(),
    }
}
