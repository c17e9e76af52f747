// Keyword tables and canned text
// Loaded from JSON: the copy embedded at build time, or a user-provided file

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::labels::{Emotion, Topic};

const BUILTIN_LEXICON: &str = include_str!("../../data/lexicon.json");

/// Keyword list for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryKeywords<C> {
    pub category: C,
    pub keywords: Vec<String>,
}

impl<C> CategoryKeywords<C> {
    /// Distinct keywords of this category present in lower-cased text
    pub fn hits<'a>(&'a self, text_lower: &str) -> Vec<&'a str> {
        self.keywords
            .iter()
            .filter(|keyword| text_lower.contains(keyword.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Phrase sets used by the crisis detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisKeywords {
    /// Any one of these is a crisis on its own
    pub direct: Vec<String>,
    pub life: Vec<String>,
    pub pain: Vec<String>,
    pub ending: Vec<String>,
}

/// Emotion + topic pair that maps to a dedicated framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRule {
    pub name: String,
    pub emotion: Emotion,
    pub topic: Topic,
    pub framework: String,
    pub topic_keywords: Vec<String>,
    pub emotion_keywords: Vec<String>,
}

impl CombinationRule {
    /// Both keyword sets occur in the lower-cased text
    pub fn matches_text(&self, text_lower: &str) -> bool {
        let any = |set: &[String]| set.iter().any(|kw| text_lower.contains(kw.as_str()));
        any(&self.topic_keywords) && any(&self.emotion_keywords)
    }

    pub fn matches_labels(&self, emotion: Option<Emotion>, topic: Option<Topic>) -> bool {
        emotion == Some(self.emotion) && topic == Some(self.topic)
    }
}

/// Intervention technique attached to a framework or the crisis template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub name: String,
    pub description: String,
    pub example: String,
    /// Emotions the technique suits; empty means any
    #[serde(default)]
    pub applicable_when: Vec<Emotion>,
}

impl Technique {
    pub fn applies_to(&self, emotion: Option<Emotion>) -> bool {
        self.applicable_when.is_empty()
            || emotion.map_or(false, |e| self.applicable_when.contains(&e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisTemplate {
    pub framework: String,
    pub template: String,
    pub immediate_response: String,
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub techniques: Vec<Technique>,
}

/// Canned sentences for the basic (no knowledge base) response mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTexts {
    pub acknowledgments: HashMap<Emotion, String>,
    /// Emotion detected but no acknowledgment configured for it
    pub fallback_acknowledgment: String,
    /// No emotion detected
    pub neutral_acknowledgment: String,
    pub default_questions: Vec<String>,
    pub crisis: CrisisTemplate,
    #[serde(default)]
    pub continuity_phrases: Vec<String>,
}

impl ResponseTexts {
    pub fn acknowledgment(&self, emotion: Option<Emotion>) -> &str {
        match emotion {
            Some(e) => self
                .acknowledgments
                .get(&e)
                .map(String::as_str)
                .unwrap_or(&self.fallback_acknowledgment),
            None => &self.neutral_acknowledgment,
        }
    }
}

/// Conclusion clauses and thresholds for the analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTexts {
    pub emotion_clauses: HashMap<Emotion, String>,
    pub topic_clauses: HashMap<Topic, String>,
    pub explore_clause: String,
    pub fallback_conclusion: String,
    pub decision_words: Vec<String>,
    /// Characters above which the explore clause is added
    pub explore_threshold: usize,
    /// Characters above which an unmatched text counts as a complex situation
    pub complex_threshold: usize,
}

/// All keyword dictionaries and templates, immutable once loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Order matters: earlier categories win ties
    pub emotions: Vec<CategoryKeywords<Emotion>>,
    pub topics: Vec<CategoryKeywords<Topic>>,
    pub crisis: CrisisKeywords,
    /// Checked in order, first match wins
    pub combinations: Vec<CombinationRule>,
    pub responses: ResponseTexts,
    pub summary: SummaryTexts,
}

impl Lexicon {
    /// Lexicon shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_LEXICON).context("Built-in lexicon is invalid")
    }

    /// Load a lexicon from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;

        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to load lexicon from {}", path.display()))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let mut lexicon: Lexicon =
            serde_json::from_str(contents).context("Failed to parse lexicon JSON")?;
        lexicon.normalize();
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Matching runs on lower-cased text, so keywords are stored lower-cased
    fn normalize(&mut self) {
        let lower_all = |words: &mut Vec<String>| {
            for word in words.iter_mut() {
                *word = word.to_lowercase();
            }
            words.retain(|w| !w.is_empty());
        };

        for table in &mut self.emotions {
            lower_all(&mut table.keywords);
        }
        for table in &mut self.topics {
            lower_all(&mut table.keywords);
        }
        lower_all(&mut self.crisis.direct);
        lower_all(&mut self.crisis.life);
        lower_all(&mut self.crisis.pain);
        lower_all(&mut self.crisis.ending);
        for rule in &mut self.combinations {
            lower_all(&mut rule.topic_keywords);
            lower_all(&mut rule.emotion_keywords);
        }
        lower_all(&mut self.summary.decision_words);
    }

    fn validate(&self) -> Result<()> {
        if self.emotions.is_empty() || self.topics.is_empty() {
            bail!("Lexicon must define at least one emotion and one topic category");
        }

        let mut seen_emotions = Vec::new();
        for table in &self.emotions {
            if seen_emotions.contains(&table.category) {
                bail!("Emotion category '{}' is defined twice", table.category);
            }
            seen_emotions.push(table.category);
        }

        let mut seen_topics = Vec::new();
        for table in &self.topics {
            if seen_topics.contains(&table.category) {
                bail!("Topic category '{}' is defined twice", table.category);
            }
            seen_topics.push(table.category);
        }

        if self.crisis.direct.is_empty() {
            bail!("Lexicon crisis section has no direct phrases");
        }
        if self.responses.crisis.follow_up_questions.is_empty() {
            bail!("Crisis template needs at least one follow-up question");
        }

        Ok(())
    }

    pub fn combination(&self, name: &str) -> Option<&CombinationRule> {
        self.combinations.iter().find(|rule| rule.name == name)
    }
}
