pub mod config;
pub mod logging;

pub use config::ServerConfig;
pub use logging::{DEFAULT_FILTER, init_logging};
