use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;
use courier::config::Settings;
use courier::connector::RequestParams;

use super::defaults::{default_method, default_tag};
use super::parsers::{parse_delay_arg, parse_duration_arg, parse_header};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Send HTTP requests through a per-tag serialized, rate-limited connector."
)]
pub(crate) struct CliArgs {
    /// Target URL
    #[arg(long, short)]
    pub url: String,

    /// HTTP method (case-insensitive)
    #[arg(long = "method", short = 'X', default_value_t = default_method())]
    pub method: String,

    /// Request header, repeatable (e.g. "Accept: application/json")
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body (dropped for GET and HEAD)
    #[arg(long = "data", short = 'd')]
    pub data: Option<String>,

    /// Connector tag the requests are issued under
    #[arg(long = "tag", default_value_t = default_tag())]
    pub tag: String,

    /// Bypass the queue and the inter-job delay
    #[arg(long)]
    pub immediate: bool,

    /// Number of copies of the request to submit
    #[arg(long = "count", short = 'n', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Pause before each queued request (supports ms/s/m/h, 0 disables)
    #[arg(long = "delay", value_parser = parse_delay_arg)]
    pub delay: Option<Duration>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Connection timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg)]
    pub connect_timeout: Option<Duration>,

    /// Maximum redirects to follow (0 disables)
    #[arg(long = "redirect")]
    pub redirect: Option<u32>,

    /// User-Agent sent when no User-Agent header is given
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Path to a config file (.toml or .json)
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,

    /// Print only the body of 200 responses
    #[arg(long)]
    pub content: bool,

    /// Log every metrics update while requests run
    #[arg(long = "watch-metrics")]
    pub watch_metrics: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl CliArgs {
    /// Applies flags given on the command line; they win over config files.
    pub(crate) fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(delay) = self.delay {
            settings.executor.inter_job_delay = delay;
        }
        if let Some(timeout) = self.timeout {
            settings.set_request_timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            settings.client.connect_timeout = connect_timeout;
        }
        if let Some(redirect) = self.redirect {
            settings.client.redirect_limit = redirect;
        }
        if let Some(user_agent) = self.user_agent.as_ref() {
            settings.executor.user_agent.clone_from(user_agent);
        }
    }

    pub(crate) fn request_params(&self) -> RequestParams {
        let headers: HashMap<String, String> = self.headers.iter().cloned().collect();
        RequestParams {
            endpoint: self.url.clone(),
            method: self.method.clone(),
            headers,
            body: self.data.clone().unwrap_or_default(),
            immediate: self.immediate,
        }
    }
}
