use std::sync::Arc;

use clap::Parser;
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use courier::config::{Settings, apply_config, load_config};
use courier::connector::{ConnectorRegistry, RequestParams, Requester};
use courier::error::AppResult;
use courier::executor::MetricsStream;
use courier::response::Response;
use courier::transport::{HttpTransport, Transport, normalize_method};

use crate::args::CliArgs;
use crate::shutdown_handlers::{
    ShutdownReceiver, ShutdownSender, setup_signal_shutdown_handler, shutdown_channel,
};

/// What a single submission printed.
enum Outcome {
    Response(Response),
    Content(Option<String>),
}

pub(crate) fn run() -> AppResult<()> {
    let args = CliArgs::parse();

    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args))
}

fn load_settings(args: &CliArgs) -> AppResult<Settings> {
    let mut settings = Settings::default();
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut settings, &config)?;
    }
    args.apply_overrides(&mut settings);
    debug!("Effective settings: {:?}", settings);
    Ok(settings)
}

async fn run_async(args: &CliArgs) -> AppResult<()> {
    let settings = load_settings(args)?;
    normalize_method(&args.method)?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&settings.client)?);
    let registry = Arc::new(ConnectorRegistry::new(transport, settings.executor));

    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let eviction_handle = spawn_eviction_on_shutdown(&registry, &shutdown_tx);

    let connector = registry.get_or_create(&args.tag);
    if !args.immediate {
        connector.executor().start()?;
    }
    let watcher_handle = args.watch_metrics.then(|| {
        spawn_metrics_watcher(
            args.tag.clone(),
            connector.executor().subscribe_metrics(),
            shutdown_tx.subscribe(),
        )
    });

    let requester = connector.requester().clone();
    let params = args.request_params();
    let submissions = (0..args.count).map(|_| submit(&requester, params.clone(), args.content));
    let outcomes = join_all(submissions).await;

    let mut failures: usize = 0;
    for outcome in &outcomes {
        if !print_outcome(outcome)? {
            failures = failures.saturating_add(1);
        }
    }

    let metrics = connector.executor().metrics_snapshot();
    info!(
        requested = metrics.cumulative_requested,
        executed = metrics.cumulative_executed,
        failures,
        "Finished"
    );

    drop(shutdown_tx.send(()));
    registry.evict_all();
    signal_handle.await?;
    eviction_handle.await?;
    if let Some(handle) = watcher_handle {
        handle.await?;
    }
    Ok(())
}

async fn submit(requester: &Requester, params: RequestParams, content: bool) -> Outcome {
    if content {
        Outcome::Content(requester.load_content(params).await)
    } else {
        Outcome::Response(requester.load_detailed(params).await)
    }
}

/// Prints one outcome to stdout. Returns false for failures.
fn print_outcome(outcome: &Outcome) -> AppResult<bool> {
    match outcome {
        Outcome::Response(response) => {
            println!("{}", serde_json::to_string(response)?);
            Ok(!response.is_failure())
        }
        Outcome::Content(Some(body)) => {
            println!("{}", body);
            Ok(true)
        }
        Outcome::Content(None) => {
            warn!("No content (request failed or status was not 200)");
            Ok(false)
        }
    }
}

/// Evicts every connector once shutdown is broadcast, releasing any caller
/// still waiting on a queued request.
fn spawn_eviction_on_shutdown(
    registry: &Arc<ConnectorRegistry>,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<()> {
    let registry = Arc::clone(registry);
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        if shutdown_rx.recv().await.is_ok() {
            debug!("Evicting {} connector(s)", registry.len());
            registry.evict_all();
        }
    })
}

fn spawn_metrics_watcher(
    tag: String,
    mut stream: MetricsStream,
    mut shutdown_rx: ShutdownReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                update = stream.next_update() => {
                    let Some(metrics) = update else {
                        break;
                    };
                    info!(
                        tag = %tag,
                        requested = metrics.cumulative_requested,
                        executed = metrics.cumulative_executed,
                        in_flight = metrics.in_flight(),
                        "Metrics update"
                    );
                }
            }
        }
    })
}
