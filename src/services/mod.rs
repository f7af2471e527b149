pub mod batch_driver;
pub mod candidate_store;
pub mod lead_enricher;
pub mod progress_board;
pub mod search_results;

pub use batch_driver::*;
pub use candidate_store::*;
pub use lead_enricher::*;
pub use progress_board::*;
pub use search_results::*;
