// Response assembler
// Turns a routing decision into reply text, optionally enriched by the knowledge base

use serde::Serialize;
use std::sync::Arc;

use super::guide::GuideBook;
use crate::knowledge::{KnowledgeBase, KnowledgeMatch};
use crate::lexicon::{Emotion, Lexicon, Scene, Technique, Topic};
use crate::matcher::Classification;
use crate::router::{ResponseRouter, RouteDecision, RouteSignals};

/// Where the reply text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Crisis,
    Knowledge,
    Basic,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Crisis => "crisis",
            ResponseSource::Knowledge => "knowledge",
            ResponseSource::Basic => "basic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub follow_ups: Vec<String>,
    pub framework: Option<String>,
    pub response_template: Option<String>,
    pub techniques: Vec<Technique>,
    /// Routing decision that produced the reply
    pub route: &'static str,
    pub source: ResponseSource,
}

impl Reply {
    /// First follow-up question, if any
    pub fn follow_up(&self) -> Option<&str> {
        self.follow_ups.first().map(String::as_str)
    }
}

/// Builds replies from immutable tables shared across requests
#[derive(Debug, Clone)]
pub struct ResponseAssembler {
    lexicon: Arc<Lexicon>,
    router: ResponseRouter,
    guides: Arc<GuideBook>,
    knowledge: Option<Arc<KnowledgeBase>>,
}

impl ResponseAssembler {
    /// Assembler in basic mode
    pub fn new(lexicon: Arc<Lexicon>, guides: Arc<GuideBook>) -> Self {
        let router = ResponseRouter::new(Arc::clone(&lexicon));
        Self {
            lexicon,
            router,
            guides,
            knowledge: None,
        }
    }

    /// Prefer knowledge-base content where the route has an entry
    pub fn with_knowledge(mut self, knowledge: Arc<KnowledgeBase>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn knowledge(&self) -> Option<&Arc<KnowledgeBase>> {
        self.knowledge.as_ref()
    }

    pub fn guides(&self) -> &Arc<GuideBook> {
        &self.guides
    }

    /// Reply from labels only
    pub fn respond(&self, emotion: Option<Emotion>, topic: Option<Topic>, is_crisis: bool) -> Reply {
        self.assemble(RouteSignals {
            emotion,
            topic,
            is_crisis,
            combination: None,
            labels_only: true,
        })
    }

    /// Reply for a full classification, including text-level combination matches
    pub fn respond_to(&self, classification: &Classification) -> Reply {
        self.assemble(RouteSignals {
            emotion: classification.emotion,
            topic: classification.topic,
            is_crisis: classification.is_crisis,
            combination: classification.combination.as_deref(),
            labels_only: false,
        })
    }

    fn assemble(&self, signals: RouteSignals<'_>) -> Reply {
        let decision = self.router.route(&signals);

        match decision {
            RouteDecision::Crisis => self.crisis_reply(),
            RouteDecision::Default => self.basic_reply(&decision, signals.emotion),
            _ => self
                .knowledge_reply(&decision, signals.emotion)
                .unwrap_or_else(|| self.basic_reply(&decision, signals.emotion)),
        }
    }

    fn crisis_reply(&self) -> Reply {
        let crisis = &self.lexicon.responses.crisis;
        let text = join_sentence(&crisis.immediate_response, crisis.follow_up_questions.first());

        Reply {
            text,
            follow_ups: crisis.follow_up_questions.clone(),
            framework: Some(crisis.framework.clone()),
            response_template: Some(crisis.template.clone()),
            techniques: crisis.techniques.clone(),
            route: RouteDecision::Crisis.as_str(),
            source: ResponseSource::Crisis,
        }
    }

    fn knowledge_reply(&self, decision: &RouteDecision<'_>, emotion: Option<Emotion>) -> Option<Reply> {
        let kb = self.knowledge.as_ref()?;

        let matched: KnowledgeMatch = match decision {
            RouteDecision::Combination(rule) => {
                let profile = kb.emotion_profile(rule.emotion)?;
                kb.match_profile(profile, Some(rule.framework.as_str()), Some(rule.emotion))?
            }
            RouteDecision::Topic(topic) => {
                let profile = kb.topic_profile(*topic)?;
                kb.match_profile(profile, None, emotion)?
            }
            RouteDecision::Emotion(e) => {
                let profile = kb.emotion_profile(*e)?;
                kb.match_profile(profile, None, Some(*e))?
            }
            RouteDecision::Crisis | RouteDecision::Default => return None,
        };

        let follow_ups = if matched.follow_up_questions.is_empty() {
            self.guide_questions(decision, emotion)
        } else {
            matched.follow_up_questions
        };

        Some(Reply {
            text: join_sentence(&matched.immediate_response, follow_ups.first()),
            follow_ups,
            framework: Some(matched.framework),
            response_template: Some(matched.response_template),
            techniques: matched.techniques,
            route: decision.as_str(),
            source: ResponseSource::Knowledge,
        })
    }

    fn basic_reply(&self, decision: &RouteDecision<'_>, emotion: Option<Emotion>) -> Reply {
        let emotion = match decision {
            RouteDecision::Combination(rule) => emotion.or(Some(rule.emotion)),
            _ => emotion,
        };
        let acknowledgment = self.lexicon.responses.acknowledgment(emotion);
        let follow_ups = self.guide_questions(decision, emotion);

        Reply {
            text: join_sentence(acknowledgment, follow_ups.first()),
            follow_ups,
            framework: None,
            response_template: None,
            techniques: Vec::new(),
            route: decision.as_str(),
            source: ResponseSource::Basic,
        }
    }

    /// Questions of the most specific scene that has any, else the built-in defaults
    fn guide_questions(&self, decision: &RouteDecision<'_>, emotion: Option<Emotion>) -> Vec<String> {
        let mut scenes = Vec::with_capacity(3);
        match decision {
            RouteDecision::Combination(rule) => {
                scenes.push(Scene::Topic(rule.topic));
                scenes.push(Scene::Emotion(rule.emotion));
            }
            RouteDecision::Topic(topic) => {
                scenes.push(Scene::Topic(*topic));
                if let Some(e) = emotion {
                    scenes.push(Scene::Emotion(e));
                }
            }
            RouteDecision::Emotion(e) => scenes.push(Scene::Emotion(*e)),
            RouteDecision::Crisis | RouteDecision::Default => {}
        }
        scenes.push(Scene::General);

        let questions = self.guides.pick_all(&scenes);
        if questions.is_empty() {
            return self.lexicon.responses.default_questions.clone();
        }
        questions.into_iter().map(|q| q.question_text.clone()).collect()
    }
}

fn join_sentence(lead: &str, follow_up: Option<&String>) -> String {
    match follow_up {
        Some(question) => format!("{} {}", lead, question),
        None => lead.to_string(),
    }
}
