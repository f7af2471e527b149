use std::{net::TcpListener, sync::Arc};

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{default_route, enrichment_route, LeadEnrichmentDriver},
    services::{CandidateStore, LeadEnricher, SearchResultsClient, SearchResultsProvider},
};

pub fn build(configuration: &Settings) -> anyhow::Result<Server> {
    let enricher = LeadEnricher::new(
        &configuration.enrichment.base_url,
        configuration.enrichment.api_token.clone(),
        configuration.enrichment.timeout(),
    )?;
    let driver = LeadEnrichmentDriver::new(enricher, configuration.enrichment.throttle());
    let search = SearchResultsClient::new(
        &configuration.search.base_url,
        configuration.search.timeout(),
    )?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("Listening on {}", address);

    Ok(run(listener, driver, Arc::new(search), CandidateStore::new())?)
}

pub fn run(
    listener: TcpListener,
    driver: LeadEnrichmentDriver,
    search: Arc<dyn SearchResultsProvider>,
    store: CandidateStore,
) -> Result<Server, std::io::Error> {
    let driver = web::Data::new(driver);
    let search: web::Data<dyn SearchResultsProvider> = web::Data::from(search);
    let store = web::Data::new(store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::health_check)
            .service(
                web::scope("/queries")
                    .service(enrichment_route::all_progress)
                    .service(enrichment_route::enrich_query)
                    .service(enrichment_route::query_progress)
                    .service(enrichment_route::query_candidates),
            )
            .app_data(driver.clone())
            .app_data(search.clone())
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
