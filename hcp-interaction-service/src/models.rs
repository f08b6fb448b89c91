use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel the model uses for a value the note does not state.
pub const UNKNOWN: &str = "UNKNOWN";

/// A sales rep's interaction with a healthcare professional, as extracted from a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub hcp_name: String,
    pub date_of_interaction: NaiveDate,
    pub time: Option<String>,
    pub interaction_type: Option<String>,
    pub key_discussion_points: String,
    #[serde(default)]
    pub products_discussed: Vec<String>,
    pub follow_up_needed: bool,
    pub outcome: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
}

/// Body of `POST /interactions/save`: the reviewed record plus the note it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionSaveRequest {
    pub hcp_name: String,
    pub date_of_interaction: NaiveDate,
    pub time: Option<String>,
    pub interaction_type: Option<String>,
    pub key_discussion_points: String,
    pub products_discussed: Option<Vec<String>>,
    pub follow_up_needed: bool,
    pub outcome: Option<String>,
    pub original_message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub id: i64,
}

/// Row about to be written to `interaction_logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteractionLog {
    pub hcp_name: String,
    pub date_of_interaction: NaiveDate,
    pub time: Option<String>,
    pub interaction_type: Option<String>,
    pub key_discussion_points: String,
    /// Comma-joined product names, `None` when no products were discussed
    pub products_discussed: Option<String>,
    pub follow_up_needed: bool,
    pub outcome: Option<String>,
    pub original_message: String,
}

impl From<InteractionSaveRequest> for NewInteractionLog {
    fn from(request: InteractionSaveRequest) -> Self {
        Self {
            hcp_name: request.hcp_name,
            date_of_interaction: request.date_of_interaction,
            time: request.time,
            interaction_type: request.interaction_type,
            key_discussion_points: request.key_discussion_points,
            products_discussed: join_products(request.products_discussed),
            follow_up_needed: request.follow_up_needed,
            outcome: request.outcome,
            original_message: request.original_message,
        }
    }
}

/// Flatten a product list into the single column the table stores.
///
/// Blank entries are skipped; an absent or effectively empty list becomes `None`.
pub fn join_products(products: Option<Vec<String>>) -> Option<String> {
    let products: Vec<String> = products?
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if products.is_empty() {
        None
    } else {
        Some(products.join(", "))
    }
}
