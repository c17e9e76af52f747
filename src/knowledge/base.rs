// Psychology knowledge base
// Frameworks, per-category issue profiles and safety guidelines

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::lexicon::{Emotion, Technique, Topic};

const BUILTIN_KNOWLEDGE: &str = include_str!("../../data/knowledge_base.json");

/// At most this many techniques are suggested per reply
const MAX_TECHNIQUES: usize = 2;

const FALLBACK_TEMPLATE: &str =
    "我理解你现在的感受，这确实不容易。能告诉我更多关于这个情况的细节吗？";
const FALLBACK_IMMEDIATE: &str = "我理解你的感受，让我们一起来看看这个情况。";

/// A named therapeutic approach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub response_templates: Vec<String>,
    #[serde(default)]
    pub intervention_techniques: Vec<Technique>,
}

/// How to respond to one emotion or topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueProfile {
    pub suggested_framework: String,
    #[serde(default)]
    pub immediate_responses: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueTable {
    #[serde(default)]
    pub emotions: HashMap<Emotion, IssueProfile>,
    #[serde(default)]
    pub topics: HashMap<Topic, IssueProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyGuidelines {
    pub disclaimer: String,
    pub crisis_hotline: String,
    pub refer_to_professional: Vec<String>,
    pub boundaries: Vec<String>,
}

/// Knowledge-base fields selected for one reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeMatch {
    pub framework: String,
    pub response_template: String,
    pub immediate_response: String,
    pub follow_up_questions: Vec<String>,
    pub techniques: Vec<Technique>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    frameworks: BTreeMap<String, Framework>,
    #[serde(default)]
    issues: IssueTable,
    safety: SafetyGuidelines,
}

impl KnowledgeBase {
    /// Knowledge base shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_KNOWLEDGE).context("Built-in knowledge base is invalid")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge base: {}", path.display()))?;

        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to load knowledge base from {}", path.display()))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let kb: KnowledgeBase =
            serde_json::from_str(contents).context("Failed to parse knowledge base JSON")?;

        for (emotion, profile) in &kb.issues.emotions {
            if !kb.frameworks.contains_key(&profile.suggested_framework) {
                tracing::warn!(
                    emotion = %emotion,
                    framework = %profile.suggested_framework,
                    "Issue profile names an unknown framework"
                );
            }
        }
        for (topic, profile) in &kb.issues.topics {
            if !kb.frameworks.contains_key(&profile.suggested_framework) {
                tracing::warn!(
                    topic = %topic,
                    framework = %profile.suggested_framework,
                    "Issue profile names an unknown framework"
                );
            }
        }

        Ok(kb)
    }

    pub fn framework(&self, name: &str) -> Option<&Framework> {
        self.frameworks.get(name)
    }

    pub fn framework_names(&self) -> impl Iterator<Item = &str> {
        self.frameworks.keys().map(String::as_str)
    }

    pub fn emotion_profile(&self, emotion: Emotion) -> Option<&IssueProfile> {
        self.issues.emotions.get(&emotion)
    }

    pub fn topic_profile(&self, topic: Topic) -> Option<&IssueProfile> {
        self.issues.topics.get(&topic)
    }

    pub fn safety_guidelines(&self) -> &SafetyGuidelines {
        &self.safety
    }

    /// Techniques of a framework that fit the emotion; empty for unknown frameworks
    pub fn suggest_techniques(&self, framework: &str, emotion: Option<Emotion>) -> Vec<Technique> {
        self.framework(framework)
            .map(|f| relevant_techniques(f, emotion))
            .unwrap_or_default()
    }

    /// Render a profile into reply fields
    ///
    /// `framework_override` replaces the profile's suggested framework (used by
    /// combination rules). Returns `None` when the framework is not in the
    /// knowledge base, so the caller can fall back to the basic mode.
    pub fn match_profile(
        &self,
        profile: &IssueProfile,
        framework_override: Option<&str>,
        emotion: Option<Emotion>,
    ) -> Option<KnowledgeMatch> {
        let framework_name = framework_override.unwrap_or(&profile.suggested_framework);
        let framework = self.framework(framework_name)?;

        let response_template = framework
            .response_templates
            .first()
            .or_else(|| profile.immediate_responses.first())
            .cloned()
            .unwrap_or_else(|| FALLBACK_TEMPLATE.to_string());

        let immediate_response = profile
            .immediate_responses
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_IMMEDIATE.to_string());

        Some(KnowledgeMatch {
            framework: framework_name.to_string(),
            response_template,
            immediate_response,
            follow_up_questions: profile.follow_up_questions.clone(),
            techniques: relevant_techniques(framework, emotion),
        })
    }
}

fn relevant_techniques(framework: &Framework, emotion: Option<Emotion>) -> Vec<Technique> {
    framework
        .intervention_techniques
        .iter()
        .filter(|t| t.applies_to(emotion))
        .take(MAX_TECHNIQUES)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_knowledge_base_loads() {
        let kb = KnowledgeBase::builtin().unwrap();

        let names: Vec<&str> = kb.framework_names().collect();
        for expected in ["CBT", "正念疗法", "人际关系疗法", "积极心理学"] {
            assert!(names.contains(&expected), "missing framework {}", expected);
        }
        for emotion in Emotion::ALL {
            assert!(kb.emotion_profile(emotion).is_some());
        }
        for topic in Topic::ALL {
            assert!(kb.topic_profile(topic).is_some());
        }
    }

    #[test]
    fn test_suggested_frameworks() {
        let kb = KnowledgeBase::builtin().unwrap();

        let framework_of = |e: Emotion| kb.emotion_profile(e).unwrap().suggested_framework.clone();
        assert_eq!(framework_of(Emotion::Anger), "正念疗法");
        assert_eq!(framework_of(Emotion::Happiness), "积极心理学");
        assert_eq!(framework_of(Emotion::Loneliness), "人际关系疗法");
    }

    #[test]
    fn test_techniques_filtered_and_capped() {
        let kb = KnowledgeBase::builtin().unwrap();

        let techniques = kb.suggest_techniques("CBT", Some(Emotion::Depression));
        assert_eq!(techniques.len(), 2);
        assert!(techniques.iter().all(|t| t.applies_to(Some(Emotion::Depression))));

        // Only the universal technique applies without an emotion
        let techniques = kb.suggest_techniques("正念疗法", None);
        assert_eq!(techniques.len(), 1);
        assert_eq!(techniques[0].name, "情绪命名");

        assert!(kb.suggest_techniques("精神分析", Some(Emotion::Anxiety)).is_empty());
    }

    #[test]
    fn test_match_profile_with_override() {
        let kb = KnowledgeBase::builtin().unwrap();
        let profile = kb.emotion_profile(Emotion::Depression).unwrap();

        let m = kb
            .match_profile(profile, Some("正念疗法"), Some(Emotion::Depression))
            .unwrap();
        assert_eq!(m.framework, "正念疗法");
        assert_eq!(m.immediate_response, profile.immediate_responses[0]);
        assert_eq!(m.follow_up_questions, profile.follow_up_questions);

        assert!(kb.match_profile(profile, Some("精神分析"), None).is_none());
    }

    #[test]
    fn test_safety_guidelines() {
        let kb = KnowledgeBase::builtin().unwrap();
        let safety = kb.safety_guidelines();

        assert!(safety.crisis_hotline.contains("400-161-9995"));
        assert_eq!(safety.boundaries.len(), 4);
    }
}
