use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use graph_flow::Graph;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    error::ServiceError,
    extraction::InteractionExtractor,
    llm::{ChatModel, GroqChatModel},
    models::{
        AgentRequest, AgentResponse, Interaction, InteractionSaveRequest, NewInteractionLog,
        SaveResponse,
    },
    storage::{InMemoryInteractionStore, InteractionStore, PostgresInteractionStore},
    workflow::{build_extraction_workflow, run_extraction},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ChatModel>,
    pub workflow: Arc<Graph>,
    pub store: Arc<dyn InteractionStore>,
}

impl AppState {
    pub fn new(model: Arc<dyn ChatModel>, store: Arc<dyn InteractionStore>) -> Self {
        let extractor = InteractionExtractor::new(model.clone());
        Self {
            model,
            workflow: Arc::new(build_extraction_workflow(extractor)),
            store,
        }
    }
}

pub async fn create_app(config: &Config) -> Router {
    let model: Arc<dyn ChatModel> = Arc::new(GroqChatModel::new(
        &config.groq_api_key,
        config.groq_model.clone(),
    ));
    info!(model = %config.groq_model, "Using Groq chat model");

    let store = create_interaction_store(config).await;
    build_router(AppState::new(model, store))
}

async fn create_interaction_store(config: &Config) -> Arc<dyn InteractionStore> {
    let Some(database_url) = &config.database_url else {
        info!("Using in-memory interaction store (set DATABASE_URL to use PostgreSQL)");
        return Arc::new(InMemoryInteractionStore::new());
    };

    match PostgresInteractionStore::connect(database_url.expose_secret()).await {
        Ok(store) => {
            info!("Using PostgreSQL interaction store");
            Arc::new(store)
        }
        Err(e) => {
            error!(
                "Failed to connect to PostgreSQL: {}. Falling back to in-memory storage.",
                e
            );
            Arc::new(InMemoryInteractionStore::new())
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/agent/invoke", post(invoke_agent))
        .route("/agent/invoke/graph", post(invoke_graph_agent))
        .route("/interactions/save", post(save_interaction))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags every request with a fresh correlation id and runs it inside a span carrying it.
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "HCP Interaction Logger",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Extracts structured HCP interaction records from sales-rep notes",
        "endpoints": {
            "POST /agent/invoke": "Send a message straight to the LLM",
            "POST /agent/invoke/graph": "Extract a structured interaction record from a note",
            "POST /interactions/save": "Store a reviewed interaction record",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn invoke_agent(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> ApiResult<AgentResponse> {
    info!(message_length = request.message.len(), "Invoking LLM");

    match state.model.complete(&request.message).await {
        Ok(response) => Ok(Json(AgentResponse { response })),
        Err(e) => {
            error!(error = %e, "Error in invoke_agent");
            Err(internal_error(
                "Failed to generate response from LLM",
                &e.to_string(),
            ))
        }
    }
}

async fn invoke_graph_agent(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> ApiResult<Interaction> {
    info!(
        message_length = request.message.len(),
        "Running extraction workflow"
    );

    match run_extraction(&state.workflow, &request.message).await {
        Ok(interaction) => Ok(Json(interaction)),
        Err(e) => {
            error!(error = %e, "Extraction workflow failed");
            Err(internal_error("Extraction workflow failed", &e.to_string()))
        }
    }
}

async fn save_interaction(
    State(state): State<AppState>,
    Json(request): Json<InteractionSaveRequest>,
) -> ApiResult<SaveResponse> {
    validate_save_request(&request)?;

    let record = NewInteractionLog::from(request);
    info!(
        hcp_name = %record.hcp_name,
        date_of_interaction = %record.date_of_interaction,
        "Saving interaction"
    );

    match state.store.insert(record).await {
        Ok(id) => {
            info!(id, "Interaction saved");
            Ok(Json(SaveResponse {
                status: "success".to_string(),
                id,
            }))
        }
        Err(ServiceError::Validation(message)) => {
            warn!(%message, "Interaction rejected by store");
            Err(bad_request_error(&message))
        }
        Err(e) => {
            error!(error = %e, "Error saving interaction");
            Err(internal_error("Failed to save to database", &e.to_string()))
        }
    }
}

fn validate_save_request(request: &InteractionSaveRequest) -> Result<(), ApiError> {
    if request.hcp_name.trim().is_empty() {
        return Err(bad_request_error("hcp_name is required"));
    }
    if request.original_message.trim().is_empty() {
        return Err(bad_request_error("original_message is required"));
    }
    Ok(())
}
