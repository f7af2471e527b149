pub mod default_route;
pub mod enrichment_route;

pub use enrichment_route::LeadEnrichmentDriver;
