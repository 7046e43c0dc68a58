pub mod routes;

// Re-export route handlers for convenience
pub use routes::hosts;
pub use routes::index_patterns;
pub use routes::metadata;
pub use routes::policy;
pub use routes::process_lineage;
pub use routes::state::{AppState, SearchIndices};
