pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod models;
pub mod service;
pub mod storage;
pub mod tasks;
pub mod workflow;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use extraction::InteractionExtractor;
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use workflow::{build_extraction_workflow, run_extraction};
