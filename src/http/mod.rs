mod error;
mod handlers;
mod router;
mod tracing_layer;
mod types;

pub use router::build_router;
pub use types::{open_store, AppState};
