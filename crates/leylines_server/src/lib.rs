//! HTTP/JSON surface for the leylines post-it board backend.

pub mod api;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
