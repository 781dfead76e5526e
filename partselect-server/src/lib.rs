//! `partselect-server` exposes the PartSelect chat pipeline over HTTP and
//! ships the `partselect-seed` tool that loads the sample documents.

pub mod backends;
pub mod config;
pub mod logging;
pub mod server;

pub use config::ServerConfig;
pub use server::{AppState, app_router, run_server};
