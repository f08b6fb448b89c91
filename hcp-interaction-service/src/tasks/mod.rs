pub mod extract_interaction;
pub mod types;

pub use extract_interaction::ExtractInteractionTask;
pub use types::context_keys;
