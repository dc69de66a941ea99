pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{RankError, RankResult};
pub use services::Engine;
