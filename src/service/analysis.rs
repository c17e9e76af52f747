// Analysis service
// Summarize stored conversations and keep the results

use serde::Serialize;
use std::sync::Arc;

use crate::engine::Engine;
use crate::errors::ServiceError;
use crate::metrics::ServiceMetrics;
use crate::store::{
    Analysis, AnalysisId, ConversationId, ConversationStore, NewAnalysis, User, UserId,
};

use super::validate_limit;

/// An analysis together with the exchange it was made from
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDetail {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub user_input: String,
    pub assistant_response: String,
}

pub struct AnalysisService {
    engine: Engine,
    store: Arc<dyn ConversationStore>,
    metrics: ServiceMetrics,
}

impl AnalysisService {
    pub fn new(engine: Engine, store: Arc<dyn ConversationStore>, metrics: ServiceMetrics) -> Self {
        Self {
            engine,
            store,
            metrics,
        }
    }

    /// Analyze one conversation, or the user's newest unanalyzed one
    pub async fn analyze(
        &self,
        user_id: UserId,
        conversation_id: Option<ConversationId>,
    ) -> Result<Analysis, ServiceError> {
        self.require_user(user_id).await?;

        let conversation = match conversation_id {
            Some(id) => self
                .store
                .conversation(user_id, id)
                .await?
                .ok_or(ServiceError::ConversationNotFound(id))?,
            None => self
                .store
                .latest_unanalyzed(user_id)
                .await?
                .ok_or(ServiceError::NothingToAnalyze)?,
        };

        let summary = self.engine.summarize(&conversation.user_input);
        let analysis = self
            .store
            .record_analysis(NewAnalysis {
                user_id,
                conversation_id: conversation.id,
                summary,
            })
            .await?;
        self.metrics.record_analysis();

        tracing::info!(
            user_id,
            conversation_id = conversation.id,
            analysis_id = analysis.id,
            core_issue = %analysis.core_issue,
            "Conversation analyzed"
        );

        Ok(analysis)
    }

    /// Past analyses, newest first
    pub async fn history(&self, user_id: UserId, limit: Option<usize>) -> Result<Vec<Analysis>, ServiceError> {
        let limit = validate_limit(limit)?;
        self.require_user(user_id).await?;
        Ok(self.store.analyses(user_id, limit).await?)
    }

    pub async fn detail(&self, user_id: UserId, analysis_id: AnalysisId) -> Result<AnalysisDetail, ServiceError> {
        let analysis = self
            .store
            .analysis(user_id, analysis_id)
            .await?
            .ok_or(ServiceError::AnalysisNotFound(analysis_id))?;

        let conversation = self
            .store
            .conversation(user_id, analysis.conversation_id)
            .await?
            .ok_or(ServiceError::ConversationNotFound(analysis.conversation_id))?;

        Ok(AnalysisDetail {
            analysis,
            user_input: conversation.user_input,
            assistant_response: conversation.assistant_response,
        })
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.store
            .user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))
    }
}
