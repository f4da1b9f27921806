pub mod api;
pub mod api_doc;
pub mod config;
pub mod server;

pub use config::Config;
pub use server::{load_catalog, run_server};
