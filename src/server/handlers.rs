// HTTP request handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ChatServer;
use crate::analysis::Summary;
use crate::errors::ServiceError;
use crate::knowledge::{Framework, SafetyGuidelines};
use crate::lexicon::{Emotion, Technique};
use crate::matcher::Classification;
use crate::service::{AnalysisDetail, ChatOutcome};
use crate::store::{Analysis, AnalysisId, Conversation, ConversationId, User, UserId};

/// Create the main application router
pub fn create_router(server: Arc<ChatServer>) -> Router {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/chat/send-message", post(send_message))
        .route("/api/chat/conversations/:user_id", get(list_conversations))
        .route("/api/analysis/analyze", post(analyze))
        .route("/api/analysis/results/:user_id", get(list_analyses))
        .route("/api/analysis/detail/:user_id/:analysis_id", get(analysis_detail))
        .route("/api/classify", post(classify))
        .route("/api/summarize", post(summarize))
        .route("/api/knowledge/frameworks/:name", get(framework_info))
        .route("/api/knowledge/safety", get(safety_guidelines))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: UserId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EmotionQuery {
    /// Emotion label, e.g. 焦虑
    pub emotion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversationList {
    pub conversations: Vec<Conversation>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisList {
    pub analyses: Vec<Analysis>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct FrameworkInfo {
    pub key: String,
    pub framework: Framework,
    pub suggested_techniques: Vec<Technique>,
}

/// Handle POST /api/users
async fn create_user(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = server
        .chat()
        .create_user(&request.username, request.is_admin)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handle POST /api/chat/send-message
async fn send_message(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    let outcome = server
        .chat()
        .send_message(request.user_id, &request.message)
        .await?;
    Ok(Json(outcome))
}

/// Handle GET /api/chat/conversations/:user_id
async fn list_conversations(
    State(server): State<Arc<ChatServer>>,
    Path(user_id): Path<UserId>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ConversationList>, AppError> {
    let conversations = server.chat().conversations(user_id, query.limit).await?;
    Ok(Json(ConversationList {
        total: conversations.len(),
        conversations,
    }))
}

/// Handle POST /api/analysis/analyze
async fn analyze(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Analysis>, AppError> {
    let analysis = server
        .analysis()
        .analyze(request.user_id, request.conversation_id)
        .await?;
    Ok(Json(analysis))
}

/// Handle GET /api/analysis/results/:user_id
async fn list_analyses(
    State(server): State<Arc<ChatServer>>,
    Path(user_id): Path<UserId>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<AnalysisList>, AppError> {
    let analyses = server.analysis().history(user_id, query.limit).await?;
    Ok(Json(AnalysisList {
        total: analyses.len(),
        analyses,
    }))
}

/// Handle GET /api/analysis/detail/:user_id/:analysis_id
async fn analysis_detail(
    State(server): State<Arc<ChatServer>>,
    Path((user_id, analysis_id)): Path<(UserId, AnalysisId)>,
) -> Result<Json<AnalysisDetail>, AppError> {
    let detail = server.analysis().detail(user_id, analysis_id).await?;
    Ok(Json(detail))
}

/// Handle POST /api/classify
async fn classify(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<TextRequest>,
) -> Json<Classification> {
    Json(server.engine().classify(&request.text))
}

/// Handle POST /api/summarize
async fn summarize(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<TextRequest>,
) -> Json<Summary> {
    Json(server.engine().summarize(&request.text))
}

/// Handle GET /api/knowledge/frameworks/:name
async fn framework_info(
    State(server): State<Arc<ChatServer>>,
    Path(name): Path<String>,
    Query(query): Query<EmotionQuery>,
) -> Result<Json<FrameworkInfo>, AppError> {
    let kb = server
        .engine()
        .knowledge()
        .ok_or(ServiceError::KnowledgeDisabled)?;

    let emotion = match query.emotion.as_deref() {
        Some(label) => Some(Emotion::from_label(label).ok_or_else(|| {
            ServiceError::InvalidInput(format!("unknown emotion label '{}'", label))
        })?),
        None => None,
    };

    let framework = kb
        .framework(&name)
        .cloned()
        .ok_or_else(|| ServiceError::FrameworkNotFound(name.clone()))?;

    Ok(Json(FrameworkInfo {
        suggested_techniques: kb.suggest_techniques(&name, emotion),
        key: name,
        framework,
    }))
}

/// Handle GET /api/knowledge/safety
async fn safety_guidelines(
    State(server): State<Arc<ChatServer>>,
) -> Result<Json<SafetyGuidelines>, AppError> {
    let kb = server
        .engine()
        .knowledge()
        .ok_or(ServiceError::KnowledgeDisabled)?;
    Ok(Json(kb.safety_guidelines().clone()))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: u64,
    pub knowledge_enabled: bool,
}

/// Handle GET /health - Health check endpoint
pub async fn health_check(State(server): State<Arc<ChatServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        uptime_seconds: server.uptime_seconds(),
        knowledge_enabled: server.engine().knowledge().is_some(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(
    State(server): State<Arc<ChatServer>>,
) -> Result<Response, AppError> {
    let body = server.metrics().encode()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Application error wrapper for proper HTTP error responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self.0.downcast_ref::<ServiceError>() {
            Some(err) => {
                let status = match err {
                    ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    ServiceError::UserNotFound(_)
                    | ServiceError::ConversationNotFound(_)
                    | ServiceError::NothingToAnalyze
                    | ServiceError::AnalysisNotFound(_)
                    | ServiceError::FrameworkNotFound(_)
                    | ServiceError::KnowledgeDisabled => StatusCode::NOT_FOUND,
                    ServiceError::UsernameTaken(_) => StatusCode::CONFLICT,
                    ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.kind())
            }
            None => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        let body = serde_json::json!({
            "error": {
                "message": self.0.to_string(),
                "type": error_type
            }
        });

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
