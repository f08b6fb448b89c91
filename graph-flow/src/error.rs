use thiserror::Error;

/// Errors raised while building or executing a graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("context error: {0}")]
    ContextError(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("graph {0} has no start task")]
    NoStartTask(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
