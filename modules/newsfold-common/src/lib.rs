pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, DedupConfig};
pub use error::NewsfoldError;
pub use types::*;
