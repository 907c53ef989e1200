use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LEVEL: &str = "info";
const VERBOSE_LEVEL: &str = "debug";

/// Installs the global subscriber. Logs go to stderr so stdout stays free
/// for response lines.
pub fn init_logging(verbose: bool) {
    let configured = std::env::var("COURIER_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(resolve_filter(configured.as_deref(), verbose))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// An explicit directive wins over `--verbose`; an unparsable one falls
/// back to `info`.
fn resolve_filter(configured: Option<&str>, verbose: bool) -> EnvFilter {
    configured.map_or_else(
        || EnvFilter::new(if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL }),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    )
}
