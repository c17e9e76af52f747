// Persisted records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Summary;
use crate::lexicon::{emotion_or_neutral, CoreIssue, Emotion};

pub type UserId = u64;
pub type ConversationId = u64;
pub type AnalysisId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// One user message and the reply it received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub user_input: String,
    pub assistant_response: String,
    pub created_at: DateTime<Utc>,
    pub is_analyzed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: AnalysisId,
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub core_issue: CoreIssue,
    #[serde(with = "emotion_or_neutral")]
    pub emotion: Option<Emotion>,
    pub conclusion: String,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewConversation {
    pub user_id: UserId,
    pub user_input: String,
    pub assistant_response: String,
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub summary: Summary,
}
