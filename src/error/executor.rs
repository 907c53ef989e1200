use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("No tokio runtime is available to run the executor: {source}")]
    NoRuntime {
        #[source]
        source: tokio::runtime::TryCurrentError,
    },
    #[error("Immediate request task failed: {source}")]
    ImmediateTask {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Executor stopped before the request completed.")]
    Stopped,
    #[error("Request was cancelled.")]
    Cancelled,
    #[error("Result slot was dropped before the request completed.")]
    SlotDropped,
}
