use std::sync::{Arc, Weak};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ExecutorConfig;
use crate::error::{ExecutorError, TransportError};
use crate::response::Response;
use crate::transport::{Transport, prepare_request};

use super::{RequestSpec, Shared};

/// Worker loop: pops one job at a time until its token is cancelled.
///
/// Parks on `wake` while the queue is empty, holding only a weak reference
/// so an idle worker never keeps a dropped executor alive. A cancellation
/// observed during the delay or the transport call fails the current job and
/// ends the loop; anything still queued is drained by `stop`.
pub(super) async fn drain_queue(
    owner: Weak<Shared>,
    generation: u64,
    cancel: CancellationToken,
    wake: Arc<Notify>,
) {
    debug!(generation, "Executor worker running");
    loop {
        let Some(shared) = owner.upgrade() else {
            break;
        };
        let next = {
            let mut state = shared.lock_state();
            if cancel.is_cancelled() || !state.enabled {
                break;
            }
            state.queue.pop_front()
        };

        let Some(job) = next else {
            drop(shared);
            let stopped = tokio::select! {
                () = wake.notified() => false,
                () = cancel.cancelled() => true,
            };
            if stopped {
                break;
            }
            continue;
        };

        let response = run_job(&shared, job.request(), &cancel).await;
        shared.complete(job, response);
    }

    if let Some(shared) = owner.upgrade() {
        shared.retire_worker(generation);
    }
    debug!(generation, "Executor worker exited");
}

async fn run_job(shared: &Shared, request: &RequestSpec, cancel: &CancellationToken) -> Response {
    tokio::select! {
        () = cancel.cancelled() => {
            return Response::failure(ExecutorError::Cancelled.to_string());
        }
        () = tokio::time::sleep(shared.config.inter_job_delay) => {}
    }

    tokio::select! {
        () = cancel.cancelled() => Response::failure(ExecutorError::Cancelled.to_string()),
        response = dispatch(shared.transport.as_ref(), request, &shared.config) => response,
    }
}

/// Shapes the request, performs the exchange, and folds any failure into
/// the response. Never returns an error.
pub(super) async fn dispatch(
    transport: &dyn Transport,
    request: &RequestSpec,
    config: &ExecutorConfig,
) -> Response {
    let outbound = match prepare_request(request, config) {
        Ok(outbound) => outbound,
        Err(err) => {
            warn!("Rejected request to {}: {}", request.endpoint, err);
            return Response::failure(err.to_string());
        }
    };

    let timeout = outbound.timeout;
    let url = outbound.url.to_string();
    match tokio::time::timeout(timeout, transport.send(outbound)).await {
        Ok(Ok(reply)) => {
            debug!("{} {} -> {}", request.method, url, reply.status);
            Response::from_reply(reply)
        }
        Ok(Err(err)) => {
            warn!("Request failed: {}", err);
            Response::failure(err.to_string())
        }
        Err(_elapsed) => {
            let err = TransportError::Timeout { url, timeout };
            warn!("Request failed: {}", err);
            Response::failure(err.to_string())
        }
    }
}
