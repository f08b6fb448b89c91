use graph_flow::{Context, Graph, GraphBuilder, GraphError, Result};
use std::sync::Arc;
use tracing::debug;

use crate::extraction::InteractionExtractor;
use crate::models::Interaction;
use crate::tasks::{ExtractInteractionTask, context_keys};

/// One-node graph: extract, then stop.
pub fn build_extraction_workflow(extractor: InteractionExtractor) -> Graph {
    GraphBuilder::new("interaction_extraction")
        .add_task(Arc::new(ExtractInteractionTask::new(extractor)))
        .build()
}

/// Run the workflow once for `message` and return the extracted record.
pub async fn run_extraction(graph: &Graph, message: &str) -> Result<Interaction> {
    let context = Context::new();
    context.set(context_keys::MESSAGE, message).await?;

    let result = graph.execute(context.clone()).await?;
    debug!(
        graph = %graph.id,
        steps = result.steps,
        status = ?result.status_message,
        "workflow finished"
    );

    context
        .get(context_keys::INTERACTION)
        .await
        .ok_or_else(|| GraphError::ContextError("interaction not found".to_string()))
}
