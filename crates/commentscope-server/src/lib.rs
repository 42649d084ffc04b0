//! CommentScope Server
//!
//! HTTP service and command-line front end for the comment analysis
//! pipeline. Comments arrive in request bodies (or a JSON file for the
//! `analyze` subcommand); the service returns sentiment statistics, complaint
//! topics, and the classified comments grouped by sentiment.

pub mod cli;
pub mod config;
pub mod report;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
