use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::{
    domain::EnrichmentSessionContext,
    services::{BatchError, CandidateStore, EnrichmentDriver, LeadEnricher, SearchResultsProvider},
};

pub type LeadEnrichmentDriver = EnrichmentDriver<LeadEnricher>;

fn error_body(message: impl ToString) -> serde_json::Value {
    json!({ "error": message.to_string() })
}

#[post("/{query_id}/enrich")]
async fn enrich_query(
    path: web::Path<String>,
    session: web::Json<EnrichmentSessionContext>,
    driver: web::Data<LeadEnrichmentDriver>,
    search: web::Data<dyn SearchResultsProvider>,
    store: web::Data<CandidateStore>,
) -> HttpResponse {
    let query_id = path.into_inner();
    let session = session.into_inner();

    if let Err(e) = session.validate() {
        return HttpResponse::BadRequest().json(error_body(e));
    }
    if driver.progress_board().is_running(&query_id) {
        return HttpResponse::Conflict().json(error_body(BatchError::AlreadyRunning(query_id)));
    }

    let mut candidates = match search.fetch_results(&query_id).await {
        Ok(candidates) => candidates,
        Err(e) => {
            log::error!("Could not load search results for query {}: {:?}", query_id, e);
            return HttpResponse::BadGateway().json(error_body(format!("{:#}", e)));
        }
    };
    store.carry_over_processed(&query_id, &mut candidates);

    // no awaits from here until the batch is spawned
    let loaded = candidates.clone();
    let claim = match driver.claim(&query_id, candidates, &session) {
        Ok(claim) => claim,
        Err(e @ BatchError::MissingSession(_)) => {
            return HttpResponse::BadRequest().json(error_body(e))
        }
        Err(e @ BatchError::AlreadyRunning(_)) => {
            return HttpResponse::Conflict().json(error_body(e))
        }
        Err(e @ BatchError::NoCandidates(_)) => {
            return HttpResponse::UnprocessableEntity().json(error_body(e))
        }
    };

    store.put(&query_id, loaded);
    let progress = driver.progress(&query_id);

    let driver = driver.into_inner();
    let store = store.into_inner();
    tokio::spawn(async move {
        driver
            .run_observed(claim, |candidate| {
                if candidate.is_processed {
                    store.mark_processed(&query_id, &candidate.id);
                }
            })
            .await;
    });

    HttpResponse::Accepted().json(progress)
}

#[get("/progress")]
async fn all_progress(driver: web::Data<LeadEnrichmentDriver>) -> HttpResponse {
    HttpResponse::Ok().json(driver.progress_board().snapshot())
}

#[get("/{query_id}/progress")]
async fn query_progress(
    path: web::Path<String>,
    driver: web::Data<LeadEnrichmentDriver>,
) -> HttpResponse {
    let query_id = path.into_inner();
    match driver.progress(&query_id) {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => HttpResponse::NotFound().json(error_body(format!(
            "no enrichment batch for query {}",
            query_id
        ))),
    }
}

#[get("/{query_id}/candidates")]
async fn query_candidates(
    path: web::Path<String>,
    store: web::Data<CandidateStore>,
) -> HttpResponse {
    let query_id = path.into_inner();
    match store.get(&query_id) {
        Some(candidates) => HttpResponse::Ok().json(candidates),
        None => HttpResponse::NotFound().json(error_body(format!(
            "no candidates loaded for query {}",
            query_id
        ))),
    }
}
