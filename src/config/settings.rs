use std::time::Duration;

/// Pause the worker takes before each queued job.
pub const DEFAULT_INTER_JOB_DELAY: Duration = Duration::from_millis(500);
/// Upper bound for a single request/response exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REDIRECT_LIMIT: u32 = 10;

pub const DEFAULT_USER_AGENT: &str = concat!("courier/", env!("CARGO_PKG_VERSION"));

/// Per-executor behavior shared by every connector a registry creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub inter_job_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            inter_job_delay: DEFAULT_INTER_JOB_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Settings for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Zero disables redirects.
    pub redirect_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub executor: ExecutorConfig,
    pub client: ClientConfig,
}

impl Settings {
    /// Sets the request timeout on both the executor and the client.
    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.executor.request_timeout = timeout;
        self.client.request_timeout = timeout;
    }
}
