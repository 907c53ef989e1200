mod app;
mod config;
mod executor;
mod transport;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use executor::ExecutorError;
pub use transport::TransportError;
pub use validation::ValidationError;
