use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::context_keys;
use crate::extraction::{EXTRACTION_ERROR_NAME, InteractionExtractor};

/// Reads the note from the context, extracts a record and stores it back.
pub struct ExtractInteractionTask {
    extractor: InteractionExtractor,
}

impl ExtractInteractionTask {
    pub fn new(extractor: InteractionExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Task for ExtractInteractionTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let message: String = context
            .get(context_keys::MESSAGE)
            .await
            .ok_or_else(|| GraphError::ContextError("message not found".to_string()))?;

        info!(
            task_id = %self.id(),
            message_length = message.len(),
            "Starting interaction extraction"
        );

        let interaction = self.extractor.extract(&message).await;
        let status_message = if interaction.hcp_name == EXTRACTION_ERROR_NAME {
            "Extraction failed, returning placeholder record".to_string()
        } else {
            format!("Extracted interaction with {}", interaction.hcp_name)
        };

        context
            .set(context_keys::INTERACTION, interaction)
            .await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::End,
            Some(status_message),
        ))
    }
}
