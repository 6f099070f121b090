pub mod app;
pub mod auth;
pub mod buckets;
pub mod config;
pub mod duration;
pub mod errors;
pub mod extract;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
