// Scene/emotion matcher
// Keyword hit counting over the lexicon tables

use serde::Serialize;
use std::sync::Arc;

use crate::crisis::{CrisisDetector, CrisisSignal};
use crate::lexicon::{CategoryKeywords, Emotion, Lexicon, Topic};

/// Base confidence when no emotion keyword was found
const BASE_CONFIDENCE: f64 = 0.3;

/// Result of classifying one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub emotion: Option<Emotion>,
    pub topic: Option<Topic>,
    pub is_crisis: bool,
    /// Why the crisis flag was raised
    pub crisis: Option<CrisisSignal>,
    /// Name of the first combination rule whose keyword sets both occur
    pub combination: Option<String>,
    /// Distinct keywords of the winning emotion category
    pub emotion_hits: usize,
    /// Distinct keywords of the winning topic category
    pub topic_hits: usize,
    /// Emotion keywords found in the text, across all categories
    pub keywords: Vec<String>,
    pub confidence: f64,
}

impl Classification {
    pub fn emotion_label(&self) -> &'static str {
        Emotion::label_or_neutral(self.emotion)
    }

    pub fn topic_label(&self) -> &'static str {
        Topic::label_or_general(self.topic)
    }
}

/// Category with the most keyword hits; ties go to the earlier table entry
pub fn dominant<C: Copy>(tables: &[CategoryKeywords<C>], text_lower: &str) -> Option<(C, usize)> {
    let mut best: Option<(C, usize)> = None;

    for table in tables {
        let hits = table.hits(text_lower).len();
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if best_hits >= hits => {}
            _ => best = Some((table.category, hits)),
        }
    }

    best
}

/// Stateless classifier over an injected lexicon
#[derive(Debug, Clone)]
pub struct SceneMatcher {
    lexicon: Arc<Lexicon>,
    crisis: CrisisDetector,
}

impl SceneMatcher {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        let crisis = CrisisDetector::new(lexicon.crisis.clone());
        Self { lexicon, crisis }
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Classify a message into emotion, topic and crisis flag
    pub fn classify(&self, text: &str) -> Classification {
        let text_lower = text.to_lowercase();

        let emotion = dominant(&self.lexicon.emotions, &text_lower);
        let topic = dominant(&self.lexicon.topics, &text_lower);
        let crisis = self.crisis.assess(text);

        let combination = self
            .lexicon
            .combinations
            .iter()
            .find(|rule| rule.matches_text(&text_lower))
            .map(|rule| rule.name.clone());

        let keywords: Vec<String> = self
            .lexicon
            .emotions
            .iter()
            .flat_map(|table| table.hits(&text_lower))
            .map(str::to_string)
            .collect();

        let emotion_hits = emotion.map_or(0, |(_, hits)| hits);
        let confidence = match emotion {
            Some(_) => (0.5 + emotion_hits as f64 * 0.2).min(1.0),
            None => BASE_CONFIDENCE,
        };

        let classification = Classification {
            emotion: emotion.map(|(e, _)| e),
            topic: topic.map(|(t, _)| t),
            is_crisis: crisis.is_some(),
            crisis,
            combination,
            emotion_hits,
            topic_hits: topic.map_or(0, |(_, hits)| hits),
            keywords,
            confidence,
        };

        tracing::debug!(
            emotion = classification.emotion_label(),
            topic = classification.topic_label(),
            is_crisis = classification.is_crisis,
            combination = ?classification.combination,
            "Classified message"
        );

        classification
    }

    pub fn dominant_emotion(&self, text: &str) -> Option<Emotion> {
        dominant(&self.lexicon.emotions, &text.to_lowercase()).map(|(e, _)| e)
    }

    pub fn dominant_topic(&self, text: &str) -> Option<Topic> {
        dominant(&self.lexicon.topics, &text.to_lowercase()).map(|(t, _)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> SceneMatcher {
        SceneMatcher::new(Arc::new(Lexicon::builtin().unwrap()))
    }

    #[test]
    fn test_no_keywords_yields_defaults() {
        let c = matcher().classify("今天去了趟超市");

        assert_eq!(c.emotion, None);
        assert_eq!(c.topic, None);
        assert!(!c.is_crisis);
        assert_eq!(c.emotion_label(), "中性");
        assert_eq!(c.topic_label(), "通用");
        assert_eq!(c.confidence, 0.3);
    }

    #[test]
    fn test_empty_input() {
        let c = matcher().classify("");

        assert_eq!(c.emotion, None);
        assert_eq!(c.topic, None);
        assert!(!c.is_crisis);
        assert!(c.keywords.is_empty());
    }

    #[test]
    fn test_most_hits_wins() {
        // Two anxiety keywords against one anger keyword
        let c = matcher().classify("我很担心，也很紧张，还有点生气");

        assert_eq!(c.emotion, Some(Emotion::Anxiety));
        assert_eq!(c.emotion_hits, 2);
        assert_eq!(c.keywords, vec!["担心", "紧张", "生气"]);
    }

    #[test]
    fn test_more_hits_beats_table_order() {
        // One anxiety keyword against two anger keywords
        let c = matcher().classify("有点担心，但更多是生气和烦躁");
        assert_eq!(c.emotion, Some(Emotion::Anger));
    }

    #[test]
    fn test_tie_goes_to_earlier_category() {
        // 焦虑 and 压力 both hit once; anxiety comes first in the table
        let c = matcher().classify("我最近工作压力特别大，每天都感觉很焦虑");

        assert_eq!(c.emotion, Some(Emotion::Anxiety));
        assert_eq!(c.topic, Some(Topic::Work));
        assert_eq!(c.combination.as_deref(), Some("work_anxiety"));
    }

    #[test]
    fn test_breakup_combination() {
        let c = matcher().classify("和男朋友分手了，感觉很难过很绝望");

        assert_eq!(c.emotion, Some(Emotion::Depression));
        assert_eq!(c.topic, Some(Topic::Relationship));
        assert_eq!(c.combination.as_deref(), Some("breakup_depression"));
    }

    #[test]
    fn test_crisis_flag_with_other_keywords() {
        let c = matcher().classify("工作好累，想要伤害自己");

        assert!(c.is_crisis);
        assert!(matches!(c.crisis, Some(CrisisSignal::Direct { .. })));
        // Emotion and topic are still reported
        assert_eq!(c.emotion, Some(Emotion::Stress));
        assert_eq!(c.topic, Some(Topic::Work));
    }

    #[test]
    fn test_confidence_grows_with_hits() {
        let m = matcher();

        assert!((m.classify("我很担心").confidence - 0.7).abs() < 1e-9);
        assert!((m.classify("担心 紧张 害怕").confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_uppercase_input_is_matched() {
        let mut lexicon = Lexicon::builtin().unwrap();
        lexicon.emotions[0].keywords.push("nervous".to_string());
        let m = SceneMatcher::new(Arc::new(lexicon));

        assert_eq!(m.dominant_emotion("I am NERVOUS"), Some(Emotion::Anxiety));
    }
}
