//! Runtime settings and configuration file loading.
mod apply;
mod loader;
mod parse;
mod settings;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;
pub use settings::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_INTER_JOB_DELAY, DEFAULT_REDIRECT_LIMIT,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, ExecutorConfig, Settings,
};

pub use loader::load_config_file;
pub use parse::{parse_delay_value, parse_duration_value};
