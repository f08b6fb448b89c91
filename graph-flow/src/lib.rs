pub mod context;
pub mod error;
pub mod graph;
pub mod task;

// Re-export commonly used types
pub use context::Context;
pub use error::{GraphError, Result};
pub use graph::{ExecutionResult, Graph, GraphBuilder};
pub use task::{NextAction, Task, TaskResult};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UppercaseTask;

    #[async_trait]
    impl Task for UppercaseTask {
        fn id(&self) -> &str {
            "uppercase"
        }

        async fn run(&self, context: Context) -> Result<TaskResult> {
            let input: String = context.get("input").await.unwrap_or_default();
            context.set("upper", input.to_uppercase()).await?;
            Ok(TaskResult::new(None, NextAction::Continue))
        }
    }

    struct ExclaimTask;

    #[async_trait]
    impl Task for ExclaimTask {
        fn id(&self) -> &str {
            "exclaim"
        }

        async fn run(&self, context: Context) -> Result<TaskResult> {
            let upper: String = context
                .get("upper")
                .await
                .ok_or_else(|| GraphError::ContextError("upper not found".to_string()))?;
            Ok(TaskResult::new_with_status(
                Some(format!("{upper}!")),
                NextAction::End,
                Some("done".to_string()),
            ))
        }
    }

    struct FailingTask;

    #[async_trait]
    impl Task for FailingTask {
        async fn run(&self, _context: Context) -> Result<TaskResult> {
            Err(GraphError::TaskExecutionFailed("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_single_task_graph_runs_once() {
        let graph = GraphBuilder::new("single")
            .add_task(Arc::new(UppercaseTask))
            .build();

        let context = Context::new();
        context.set("input", "hello").await.unwrap();

        let result = graph.execute(context.clone()).await.unwrap();

        assert_eq!(result.steps, 1);
        assert_eq!(result.last_task_id, "uppercase");
        let upper: String = context.get("upper").await.unwrap();
        assert_eq!(upper, "HELLO");
    }

    #[tokio::test]
    async fn test_edges_are_followed_until_end() {
        let graph = GraphBuilder::new("chain")
            .add_task(Arc::new(UppercaseTask))
            .add_task(Arc::new(ExclaimTask))
            .add_edge("uppercase", "exclaim")
            .build();

        let context = Context::new();
        context.set("input", "hi").await.unwrap();

        let result = graph.execute(context).await.unwrap();

        assert_eq!(result.steps, 2);
        assert_eq!(result.response.as_deref(), Some("HI!"));
        assert_eq!(result.status_message.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_task_errors_propagate() {
        let task = Arc::new(FailingTask);
        let task_id = task.id().to_string();
        let graph = GraphBuilder::new("failing").add_task(task).build();

        assert!(task_id.ends_with("FailingTask"));
        let err = graph.execute(Context::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::TaskExecutionFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_graph_has_no_start_task() {
        let graph = GraphBuilder::new("empty").build();
        let err = graph.execute(Context::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::NoStartTask(id) if id == "empty"));
    }

    #[tokio::test]
    async fn test_dangling_edge_reports_missing_task() {
        let graph = GraphBuilder::new("dangling")
            .add_task(Arc::new(UppercaseTask))
            .add_edge("uppercase", "missing")
            .build();

        let err = graph.execute(Context::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::TaskNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_context_get_with_wrong_type_is_none() {
        let context = Context::new();
        context.set("n", 3).await.unwrap();
        assert_eq!(context.get::<String>("n").await, None);
        assert_eq!(context.get::<i32>("n").await, Some(3));
        assert!(context.remove("n").await.is_some());
        assert!(context.is_empty());
    }
}
