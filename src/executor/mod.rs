//! Serial request executor.
//!
//! Each [`Executor`] owns a FIFO queue drained by exactly one worker task,
//! pausing for the configured inter-job delay before every queued request.
//! Immediate requests skip the queue and the delay. All mutable state sits
//! behind one mutex; the worker and the public operations only touch it in
//! short critical sections and never hold it across an await.
mod job;
mod metrics;
mod worker;


use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::response::Response;
use crate::transport::Transport;

use job::Job;
pub use job::RequestSpec;
pub use metrics::{Metrics, MetricsStream};

use metrics::MetricsHub;

/// Cheaply cloneable handle; clones share the same queue, worker and counters.
#[derive(Clone)]
pub struct Executor {
    shared: Arc<Shared>,
}

pub(crate) struct Shared {
    config: ExecutorConfig,
    transport: Arc<dyn Transport>,
    state: Mutex<State>,
}

struct State {
    enabled: bool,
    queue: VecDeque<Job>,
    worker: Option<WorkerSlot>,
    next_generation: u64,
    /// Bumped by `init_transaction`; completions from older epochs are not
    /// counted against the fresh counters.
    epoch: u64,
    metrics: Metrics,
    metrics_hub: MetricsHub,
}

/// Handles to the live worker. A worker may only pop jobs while its token
/// is uncancelled, which `stop` flips inside the same critical section that
/// clears the slot.
struct WorkerSlot {
    generation: u64,
    cancel: CancellationToken,
    wake: Arc<Notify>,
}

impl State {
    fn worker_alive(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.cancel.is_cancelled())
    }

    fn record_requested(&mut self) {
        self.metrics.cumulative_requested = self.metrics.cumulative_requested.saturating_add(1);
        self.metrics_hub.publish(self.metrics);
    }

    fn record_executed(&mut self, epoch: u64, count: u64) {
        if count == 0 || epoch != self.epoch {
            return;
        }
        self.metrics.cumulative_executed =
            self.metrics.cumulative_executed.saturating_add(count);
        self.metrics_hub.publish(self.metrics);
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts the job as executed, then hands the response to its caller.
    fn complete(&self, job: Job, response: Response) {
        self.lock_state().record_executed(job.epoch(), 1);
        job.resolve(response);
    }

    fn retire_worker(&self, generation: u64) {
        let mut state = self.lock_state();
        if state
            .worker
            .as_ref()
            .is_some_and(|worker| worker.generation == generation)
        {
            state.worker = None;
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(worker) = state.worker.take() {
            worker.cancel.cancel();
        }
    }
}

impl Executor {
    #[must_use]
    pub fn new(config: ExecutorConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                transport,
                state: Mutex::new(State {
                    enabled: false,
                    queue: VecDeque::new(),
                    worker: None,
                    next_generation: 0,
                    epoch: 0,
                    metrics: Metrics::default(),
                    metrics_hub: MetricsHub::default(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.shared.config
    }

    /// Enables the executor and makes sure one worker is running.
    ///
    /// Calling it while a worker is alive does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside a tokio runtime.
    pub fn start(&self) -> Result<(), ExecutorError> {
        let runtime =
            Handle::try_current().map_err(|err| ExecutorError::NoRuntime { source: err })?;
        let mut state = self.shared.lock_state();
        self.ensure_worker(&mut state, &runtime);
        Ok(())
    }

    fn ensure_worker(&self, state: &mut State, runtime: &Handle) {
        state.enabled = true;
        if state.worker_alive() {
            return;
        }

        let generation = state.next_generation;
        state.next_generation = generation.wrapping_add(1);
        let cancel = CancellationToken::new();
        let wake = Arc::new(Notify::new());
        state.worker = Some(WorkerSlot {
            generation,
            cancel: cancel.clone(),
            wake: Arc::clone(&wake),
        });
        debug!(generation, "Starting executor worker");
        runtime.spawn(worker::drain_queue(
            Arc::downgrade(&self.shared),
            generation,
            cancel,
            wake,
        ));
    }

    /// Disables the executor, cancels its worker and fails every queued job.
    ///
    /// Every queued caller receives a failure response and is counted as
    /// executed. A job the worker is currently running is failed by the
    /// worker itself once it observes the cancellation.
    pub fn stop(&self) {
        let drained: Vec<Job> = {
            let mut state = self.shared.lock_state();
            state.enabled = false;
            if let Some(worker) = state.worker.take() {
                worker.cancel.cancel();
                worker.wake.notify_one();
                debug!(generation = worker.generation, "Stopping executor worker");
            }
            let drained: Vec<Job> = state.queue.drain(..).collect();
            let epoch = state.epoch;
            let counted = drained.iter().filter(|job| job.epoch() == epoch).count();
            state.record_executed(epoch, u64::try_from(counted).unwrap_or(u64::MAX));
            drained
        };

        if !drained.is_empty() {
            debug!("Failing {} queued job(s) on stop", drained.len());
        }
        for job in drained {
            job.resolve(Response::failure(ExecutorError::Stopped.to_string()));
        }
    }

    /// Queues the request and waits for its turn and its result.
    ///
    /// Starts the worker if needed. Jobs run strictly in submission order.
    pub async fn enqueue(&self, request: RequestSpec) -> Response {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                let mut state = self.shared.lock_state();
                let epoch = state.epoch;
                state.record_requested();
                state.record_executed(epoch, 1);
                return Response::failure(ExecutorError::NoRuntime { source: err }.to_string());
            }
        };

        let receiver = {
            let mut state = self.shared.lock_state();
            state.record_requested();
            let (job, receiver) = Job::new(request, state.epoch);
            self.ensure_worker(&mut state, &runtime);
            state.queue.push_back(job);
            if let Some(worker) = state.worker.as_ref() {
                worker.wake.notify_one();
            }
            receiver
        };

        match receiver.await {
            Ok(response) => response,
            Err(_closed) => Response::failure(ExecutorError::SlotDropped.to_string()),
        }
    }

    /// Runs the request right away on its own task, outside the queue.
    ///
    /// Not subject to the inter-job delay, and unordered relative to queued
    /// jobs and other immediate requests.
    pub async fn execute_immediate(&self, request: RequestSpec) -> Response {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                let mut state = self.shared.lock_state();
                let epoch = state.epoch;
                state.record_requested();
                state.record_executed(epoch, 1);
                return Response::failure(ExecutorError::NoRuntime { source: err }.to_string());
            }
        };

        let epoch = {
            let mut state = self.shared.lock_state();
            state.record_requested();
            state.epoch
        };
        let shared = Arc::clone(&self.shared);
        let task = runtime.spawn(async move {
            let response =
                worker::dispatch(shared.transport.as_ref(), &request, &shared.config).await;
            shared.lock_state().record_executed(epoch, 1);
            response
        });

        match task.await {
            Ok(response) => response,
            Err(err) => {
                self.shared.lock_state().record_executed(epoch, 1);
                Response::failure(ExecutorError::ImmediateTask { source: err }.to_string())
            }
        }
    }

    #[must_use]
    pub fn metrics_snapshot(&self) -> Metrics {
        self.shared.lock_state().metrics
    }

    /// Subscribes to counter updates; the current value is delivered first.
    #[must_use]
    pub fn subscribe_metrics(&self) -> MetricsStream {
        let (id, receiver) = {
            let mut state = self.shared.lock_state();
            let current = state.metrics;
            state.metrics_hub.subscribe(current)
        };
        MetricsStream::new(id, receiver, Arc::downgrade(&self.shared))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock_state().metrics_hub.len()
    }

    /// Resets both counters to zero and broadcasts the reset.
    ///
    /// Jobs submitted before the reset still run, but their completion is
    /// not counted in the new window.
    pub fn init_transaction(&self) {
        let mut state = self.shared.lock_state();
        state.epoch = state.epoch.wrapping_add(1);
        state.metrics = Metrics::default();
        let metrics = state.metrics;
        state.metrics_hub.publish(metrics);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        let state = self.shared.lock_state();
        state.enabled && state.worker_alive()
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.shared.lock_state().queue.len()
    }

    /// Identity comparison: true when both handles share one executor.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl PartialEq for Executor {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Executor {}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("Executor")
            .field("enabled", &state.enabled)
            .field("queued", &state.queue.len())
            .field("metrics", &state.metrics)
            .finish_non_exhaustive()
    }
}
