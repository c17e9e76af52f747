// Chat service
// Classify, recall recent turns, respond, persist, remember

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::engine::Engine;
use crate::errors::ServiceError;
use crate::lexicon::{emotion_or_neutral, Emotion, Technique};
use crate::metrics::{text_digest, ServiceMetrics};
use crate::respond::{Reply, ResponseSource};
use crate::store::{Conversation, ConversationId, ConversationStore, NewConversation, User, UserId};

use super::validate_limit;

const MAX_USERNAME_CHARS: usize = 64;

/// Turns consulted when inferring an emotion the current message lacks
const EMOTION_LOOKBACK: usize = 2;

/// One remembered turn, holding the emotion detected in its own text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryTurn {
    pub conversation_id: ConversationId,
    pub emotion: Option<Emotion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub conversation_id: ConversationId,
    pub response: String,
    #[serde(with = "emotion_or_neutral")]
    pub emotion: Option<Emotion>,
    pub confidence: f64,
    pub source: ResponseSource,
    pub has_memory: bool,
    pub is_crisis: bool,
    pub framework: Option<String>,
    pub techniques: Vec<Technique>,
    pub created_at: DateTime<Utc>,
}

pub struct ChatService {
    engine: Engine,
    store: Arc<dyn ConversationStore>,
    config: ChatConfig,
    metrics: ServiceMetrics,
    /// Newest first, at most `config.memory_depth` per user
    memory: DashMap<UserId, VecDeque<MemoryTurn>>,
}

impl ChatService {
    pub fn new(
        engine: Engine,
        store: Arc<dyn ConversationStore>,
        mut config: ChatConfig,
        metrics: ServiceMetrics,
    ) -> Self {
        let p = config.continuity_probability;
        let clamped = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        if clamped != p {
            tracing::warn!(
                configured = p,
                used = clamped,
                "continuity_probability out of range, clamped"
            );
            config.continuity_probability = clamped;
        }

        Self {
            engine,
            store,
            config,
            metrics,
            memory: DashMap::new(),
        }
    }

    pub async fn create_user(&self, username: &str, is_admin: bool) -> Result<User, ServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::InvalidInput("username must not be empty".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "username must be at most {} characters",
                MAX_USERNAME_CHARS
            )));
        }

        let user = self.store.create_user(username, is_admin).await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn send_message(&self, user_id: UserId, text: &str) -> Result<ChatOutcome, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidInput("message must not be empty".to_string()));
        }

        self.require_user(user_id).await?;

        let mut classification = self.engine.classify(text);
        let detected = classification.emotion;
        let memory = self.recall(user_id).await;
        let has_memory = !memory.is_empty();

        if detected.is_none() {
            classification.emotion = infer_emotion(&memory);
            if let Some(emotion) = classification.emotion {
                tracing::debug!(user_id, emotion = %emotion, "Emotion carried over from memory");
            }
        }

        let reply = self.engine.respond_to(&classification);
        let response = self.with_continuity(&reply, has_memory);

        let conversation = self
            .store
            .insert_conversation(NewConversation {
                user_id,
                user_input: text.to_string(),
                assistant_response: response.clone(),
            })
            .await?;

        self.remember(
            user_id,
            MemoryTurn {
                conversation_id: conversation.id,
                emotion: detected,
            },
        );
        self.metrics.record_message(reply.source);

        tracing::info!(
            user_id,
            conversation_id = conversation.id,
            text = %text_digest(text),
            emotion = classification.emotion_label(),
            source = reply.source.as_str(),
            route = reply.route,
            has_memory,
            "Message answered"
        );

        Ok(ChatOutcome {
            conversation_id: conversation.id,
            response,
            emotion: classification.emotion,
            confidence: classification.confidence,
            source: reply.source,
            has_memory,
            is_crisis: classification.is_crisis,
            framework: reply.framework,
            techniques: reply.techniques,
            created_at: conversation.created_at,
        })
    }

    /// Conversation history, newest first
    pub async fn conversations(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Conversation>, ServiceError> {
        let limit = validate_limit(limit)?;
        self.require_user(user_id).await?;
        Ok(self.store.recent_conversations(user_id, limit).await?)
    }

    /// Remembered turns for a user, newest first
    pub fn memory_of(&self, user_id: UserId) -> Vec<MemoryTurn> {
        self.memory
            .get(&user_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.store
            .user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))
    }

    /// Cached turns, loading them from the store on first use
    ///
    /// A store failure degrades to an empty memory; the message is still answered.
    async fn recall(&self, user_id: UserId) -> Vec<MemoryTurn> {
        if self.config.memory_depth == 0 {
            return Vec::new();
        }
        if let Some(turns) = self.memory.get(&user_id) {
            return turns.iter().cloned().collect();
        }

        let recent = match self
            .store
            .recent_conversations(user_id, self.config.memory_depth)
            .await
        {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load conversation memory");
                return Vec::new();
            }
        };

        let turns: VecDeque<MemoryTurn> = recent
            .iter()
            .map(|c| MemoryTurn {
                conversation_id: c.id,
                emotion: self.engine.classify(&c.user_input).emotion,
            })
            .collect();
        let snapshot = turns.iter().cloned().collect();
        self.memory.insert(user_id, turns);
        snapshot
    }

    fn remember(&self, user_id: UserId, turn: MemoryTurn) {
        if self.config.memory_depth == 0 {
            return;
        }
        let mut turns = self.memory.entry(user_id).or_default();
        turns.push_front(turn);
        turns.truncate(self.config.memory_depth);
    }

    /// Maybe prefix a continuity phrase; crisis replies are never altered
    fn with_continuity(&self, reply: &Reply, has_memory: bool) -> String {
        if !has_memory || reply.source == ResponseSource::Crisis {
            return reply.text.clone();
        }

        let phrases = &self.engine.lexicon().responses.continuity_phrases;
        let mut rng = rand::thread_rng();
        if !rng.gen_bool(self.config.continuity_probability) {
            return reply.text.clone();
        }

        match phrases.choose(&mut rng) {
            Some(phrase) => format!("{}{}", phrase, reply.text),
            None => reply.text.clone(),
        }
    }
}

/// Most recent emotion among the last turns
fn infer_emotion(memory: &[MemoryTurn]) -> Option<Emotion> {
    memory
        .iter()
        .take(EMOTION_LOOKBACK)
        .find_map(|turn| turn.emotion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service(continuity_probability: f64) -> ChatService {
        ChatService::new(
            Engine::builtin().unwrap(),
            Arc::new(MemoryStore::new()),
            ChatConfig {
                memory_depth: 3,
                continuity_probability,
            },
            ServiceMetrics::new().unwrap(),
        )
    }

    #[test]
    fn test_continuity_probability_clamped() {
        assert_eq!(service(1.5).config.continuity_probability, 1.0);
        assert_eq!(service(-0.2).config.continuity_probability, 0.0);
        assert_eq!(service(f64::NAN).config.continuity_probability, 0.0);
        assert_eq!(service(0.3).config.continuity_probability, 0.3);
    }

    fn turn(id: ConversationId, emotion: Option<Emotion>) -> MemoryTurn {
        MemoryTurn {
            conversation_id: id,
            emotion,
        }
    }

    #[test]
    fn test_infer_emotion_prefers_newest() {
        let memory = vec![
            turn(3, Some(Emotion::Anger)),
            turn(2, Some(Emotion::Anxiety)),
        ];
        assert_eq!(infer_emotion(&memory), Some(Emotion::Anger));
    }

    #[test]
    fn test_infer_emotion_only_looks_two_back() {
        let memory = vec![
            turn(3, None),
            turn(2, None),
            turn(1, Some(Emotion::Depression)),
        ];
        assert_eq!(infer_emotion(&memory), None);

        let memory = vec![turn(3, None), turn(2, Some(Emotion::Stress))];
        assert_eq!(infer_emotion(&memory), Some(Emotion::Stress));
    }
}
