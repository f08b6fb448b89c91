use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    context::Context,
    error::{GraphError, Result},
    task::{NextAction, Task, TaskResult},
};

/// Edge between tasks in the graph
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A graph of tasks that can be executed
pub struct Graph {
    pub id: String,
    tasks: HashMap<String, Arc<dyn Task>>,
    edges: Vec<Edge>,
    start_task_id: Option<String>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: HashMap::new(),
            edges: Vec::new(),
            start_task_id: None,
        }
    }

    /// Run the graph from its start task until a task ends it or has no outgoing edge.
    ///
    /// All tasks share the given `context`, so values written by one task are visible
    /// to the next and to the caller afterwards.
    pub async fn execute(&self, context: Context) -> Result<ExecutionResult> {
        let mut current = self
            .start_task_id
            .clone()
            .ok_or_else(|| GraphError::NoStartTask(self.id.clone()))?;
        let mut steps = 0;

        loop {
            let result = self.execute_single_task(&current, context.clone()).await?;
            steps += 1;

            let next = match result.next_action {
                NextAction::End => None,
                NextAction::Continue => self.find_next_task(&current),
            };

            match next {
                Some(next_task_id) => {
                    debug!(graph = %self.id, from = %current, to = %next_task_id, "following edge");
                    current = next_task_id;
                }
                None => {
                    return Ok(ExecutionResult {
                        response: result.response,
                        status_message: result.status_message,
                        last_task_id: result.task_id,
                        steps,
                    });
                }
            }
        }
    }

    async fn execute_single_task(&self, task_id: &str, context: Context) -> Result<TaskResult> {
        let task = self
            .tasks
            .get(task_id)
            .ok_or_else(|| GraphError::TaskNotFound(task_id.to_string()))?;

        let mut result = task.run(context).await?;
        result.task_id = task_id.to_string();
        Ok(result)
    }

    /// First edge leaving `current_task_id`, if any
    pub fn find_next_task(&self, current_task_id: &str) -> Option<String> {
        self.edges
            .iter()
            .find(|edge| edge.from == current_task_id)
            .map(|edge| edge.to.clone())
    }

    pub fn start_task_id(&self) -> Option<&str> {
        self.start_task_id.as_deref()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
        }
    }

    /// Add a task. The first task added becomes the start task.
    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        let task_id = task.id().to_string();
        if self.graph.tasks.is_empty() {
            self.graph.start_task_id = Some(task_id.clone());
        }
        self.graph.tasks.insert(task_id, task);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.edges.push(Edge {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Outcome of a completed graph run
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Response of the last task that ran
    pub response: Option<String>,
    pub status_message: Option<String>,
    pub last_task_id: String,
    /// Number of tasks executed
    pub steps: usize,
}
