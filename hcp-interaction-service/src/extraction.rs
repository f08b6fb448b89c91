//! Turns a free-text sales-rep note into an [`Interaction`].
//!
//! The model is given a fixed instruction prompt (role, per-field rules and a worked
//! example) and is called in JSON mode. Its reply must deserialize into the record
//! shape and pass date validation; anything else degrades to a placeholder record.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    error::{Result, ServiceError},
    llm::ChatModel,
    models::{Interaction, UNKNOWN},
};

/// `hcp_name` of the placeholder record returned when extraction fails.
pub const EXTRACTION_ERROR_NAME: &str = "Extraction Error";

/// Builds the system prompt, anchored to `today` so relative dates resolve.
pub fn system_prompt(today: NaiveDate) -> String {
    let long_date = today.format("%B %-d, %Y");
    let iso_date = today.format("%Y-%m-%d");
    let year = today.year();

    format!(
        r#"You are an assistant for a healthcare CRM. Read a sales representative's notes about an interaction with a healthcare professional (HCP) and return one JSON object that follows the schema below exactly.

Today's date is {long_date}. Resolve relative dates such as "today" or "yesterday" against it.

Rules, one per field:
1. hcp_name (string): the healthcare professional's name, e.g. "Dr. Sharma". If no name is given, use "UNKNOWN".
2. date_of_interaction (string): the date of the interaction in YYYY-MM-DD format. "today" means {iso_date}. A date without a year, such as "July 27", is in {year}.
3. time (string): the time of the interaction, e.g. "04:45 PM". If no time is given, use "UNKNOWN".
4. interaction_type (string): the kind of interaction, e.g. "Email", "Meeting" or "Call". If it is not stated, infer it from the wording (a note that says "got email" is an "Email").
5. key_discussion_points (string): a short summary of what was discussed. Summarize; do not copy the note.
6. products_discussed (array of strings): every product name mentioned. If there are none, use [].
7. follow_up_needed (boolean): true if the note mentions any follow-up, otherwise false.
8. outcome (string): the result of the interaction, e.g. "Requested samples". If there is none, use "UNKNOWN".

Example note:
"Met with Dr. Evelyn Reed today at 3:00 PM about the new trial for Solara. She needs the phase III data sheet. I'll send it tomorrow."

Expected output:
{{
    "hcp_name": "Dr. Evelyn Reed",
    "date_of_interaction": "{iso_date}",
    "time": "3:00 PM",
    "interaction_type": "Meeting",
    "key_discussion_points": "Discussed the new Solara trial. Dr. Reed asked for the phase III data sheet.",
    "products_discussed": ["Solara"],
    "follow_up_needed": true,
    "outcome": "Requested phase III data sheet"
}}

Reply with the JSON object only. No commentary, no markdown."#
    )
}

/// Wraps the note between delimiter lines.
pub fn user_prompt(note: &str) -> String {
    format!("Text of the interaction:\n---\n{note}\n---\n")
}

/// Shape the model is asked to produce, before validation.
#[derive(Debug, Deserialize)]
struct ExtractedInteraction {
    hcp_name: String,
    date_of_interaction: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    interaction_type: Option<String>,
    key_discussion_points: String,
    #[serde(default)]
    products_discussed: Option<Vec<String>>,
    follow_up_needed: bool,
    #[serde(default)]
    outcome: Option<String>,
}

impl TryFrom<ExtractedInteraction> for Interaction {
    type Error = ServiceError;

    fn try_from(raw: ExtractedInteraction) -> Result<Self> {
        let date_text = raw.date_of_interaction.trim();
        let date_of_interaction = NaiveDate::parse_from_str(date_text, "%Y-%m-%d").map_err(|e| {
            ServiceError::Validation(format!(
                "date_of_interaction {date_text:?} is not a YYYY-MM-DD date: {e}"
            ))
        })?;

        let hcp_name = match raw.hcp_name.trim() {
            "" => UNKNOWN.to_string(),
            name => name.to_string(),
        };

        let products_discussed = raw
            .products_discussed
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Interaction {
            hcp_name,
            date_of_interaction,
            time: known(raw.time),
            interaction_type: known(raw.interaction_type),
            key_discussion_points: raw.key_discussion_points.trim().to_string(),
            products_discussed,
            follow_up_needed: raw.follow_up_needed,
            outcome: known(raw.outcome),
        })
    }
}

/// Drops blanks and the "UNKNOWN" sentinel.
fn known(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(UNKNOWN))
}

/// Locate the JSON object in a model reply, tolerating code fences or stray prose.
fn json_object_in(reply: &str) -> Result<Value> {
    let text = reply.trim().trim_matches('\u{feff}');

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(ServiceError::Extraction(
        "no JSON object found in model output".to_string(),
    ))
}

/// Parse and validate a raw model reply into an [`Interaction`].
pub fn parse_interaction(reply: &str) -> Result<Interaction> {
    let value = json_object_in(reply)?;
    let raw: ExtractedInteraction = serde_json::from_value(value)
        .map_err(|e| ServiceError::Extraction(format!("output does not match schema: {e}")))?;
    Interaction::try_from(raw)
}

/// Placeholder returned instead of an error when extraction fails.
pub fn degraded_record(today: NaiveDate, error: impl Display) -> Interaction {
    Interaction {
        hcp_name: EXTRACTION_ERROR_NAME.to_string(),
        date_of_interaction: today,
        time: None,
        interaction_type: None,
        key_discussion_points: format!("Failed to parse content. Error: {error}"),
        products_discussed: Vec::new(),
        follow_up_needed: false,
        outcome: None,
    }
}

/// Single entry point for turning notes into records.
#[derive(Clone)]
pub struct InteractionExtractor {
    model: Arc<dyn ChatModel>,
}

impl InteractionExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Extract a record using the current UTC date as the reference date.
    pub async fn extract(&self, note: &str) -> Interaction {
        self.extract_as_of(note, Utc::now().date_naive()).await
    }

    /// Extract a record; failures yield [`degraded_record`] rather than an error.
    pub async fn extract_as_of(&self, note: &str, today: NaiveDate) -> Interaction {
        match self.try_extract(note, today).await {
            Ok(interaction) => {
                info!(
                    hcp_name = %interaction.hcp_name,
                    products = interaction.products_discussed.len(),
                    follow_up_needed = interaction.follow_up_needed,
                    "interaction extracted"
                );
                interaction
            }
            Err(e) => {
                error!(error = %e, "interaction extraction failed");
                degraded_record(today, e)
            }
        }
    }

    async fn try_extract(&self, note: &str, today: NaiveDate) -> Result<Interaction> {
        let reply = self
            .model
            .complete_json(&system_prompt(today), &user_prompt(note))
            .await
            .map_err(|e| ServiceError::Llm(e.to_string()))?;
        parse_interaction(&reply)
    }
}
