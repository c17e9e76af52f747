// Conversation summarizer
// Dominant emotion, core issue and a templated conclusion for one message

use serde::{Deserialize, Serialize};

use crate::lexicon::{emotion_or_neutral, CoreIssue, Emotion, SummaryTexts};
use crate::matcher::SceneMatcher;

const CLAUSE_SEPARATOR: &str = "，";
const CONCLUSION_END: &str = "。";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(with = "emotion_or_neutral")]
    pub emotion: Option<Emotion>,
    pub core_issue: CoreIssue,
    pub conclusion: String,
}

/// Uses the chat matcher so analysis and classification agree on the same text
#[derive(Debug, Clone)]
pub struct Summarizer {
    matcher: SceneMatcher,
}

impl Summarizer {
    pub fn new(matcher: SceneMatcher) -> Self {
        Self { matcher }
    }

    fn texts(&self) -> &SummaryTexts {
        &self.matcher.lexicon().summary
    }

    pub fn summarize(&self, text: &str) -> Summary {
        let emotion = self.matcher.dominant_emotion(text);
        let core_issue = self.core_issue(text);
        let conclusion = self.conclusion(emotion, core_issue, text);

        Summary {
            emotion,
            core_issue,
            conclusion,
        }
    }

    /// Topic with the most hits, else a label inferred from the text's shape
    pub fn core_issue(&self, text: &str) -> CoreIssue {
        if let Some(topic) = self.matcher.dominant_topic(text) {
            return CoreIssue::Topic(topic);
        }

        let texts = self.texts();
        let text_lower = text.to_lowercase();

        if text.chars().count() > texts.complex_threshold {
            CoreIssue::ComplexSituation
        } else if texts
            .decision_words
            .iter()
            .any(|word| text_lower.contains(word.as_str()))
        {
            CoreIssue::DecisionDifficulty
        } else {
            CoreIssue::DailySharing
        }
    }

    pub fn conclusion(&self, emotion: Option<Emotion>, core_issue: CoreIssue, text: &str) -> String {
        let texts = self.texts();
        let mut parts: Vec<String> = Vec::with_capacity(3);

        if let Some(emotion) = emotion {
            let clause = texts
                .emotion_clauses
                .get(&emotion)
                .cloned()
                .unwrap_or_else(|| format!("主要情绪为{}", emotion));
            parts.push(clause);
        }

        if core_issue != CoreIssue::DailySharing {
            let clause = core_issue
                .topic()
                .and_then(|topic| texts.topic_clauses.get(&topic).cloned())
                .unwrap_or_else(|| format!("主要关注{}相关问题", core_issue));
            parts.push(clause);
        }

        if text.chars().count() > texts.explore_threshold {
            parts.push(texts.explore_clause.clone());
        }

        if parts.is_empty() {
            return texts.fallback_conclusion.clone();
        }

        let mut conclusion = parts.join(CLAUSE_SEPARATOR);
        conclusion.push_str(CONCLUSION_END);
        conclusion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Lexicon, Topic};
    use std::sync::Arc;

    fn summarizer() -> Summarizer {
        Summarizer::new(SceneMatcher::new(Arc::new(Lexicon::builtin().unwrap())))
    }

    #[test]
    fn test_full_conclusion() {
        let text = "最近工作上的事情让我很焦虑，每天上班前都会紧张，晚上也睡不好，\
                    脑子里总是在想明天的会议会不会出问题，领导会不会批评，这种状态已经持续好几周了";
        let summary = summarizer().summarize(text);

        assert_eq!(summary.emotion, Some(Emotion::Anxiety));
        assert_eq!(summary.core_issue, CoreIssue::Topic(Topic::Work));
        assert_eq!(
            summary.conclusion,
            "当前表现出一定程度的焦虑情绪，工作方面的压力需要合理管理和调节，建议继续深入探讨，寻找更好的应对方式。"
        );
    }

    #[test]
    fn test_empty_text() {
        let summary = summarizer().summarize("");

        assert_eq!(summary.emotion, None);
        assert_eq!(summary.core_issue, CoreIssue::DailySharing);
        assert_eq!(summary.conclusion, "这是一次很好的自我表达，继续保持开放的沟通");
    }

    #[test]
    fn test_decision_difficulty() {
        let summary = summarizer().summarize("我不知道怎么办");

        assert_eq!(summary.core_issue, CoreIssue::DecisionDifficulty);
        assert_eq!(summary.conclusion, "主要关注决策困难相关问题。");
    }

    #[test]
    fn test_complex_situation_by_length() {
        let text = "今天天气不错".repeat(20);
        let summary = summarizer().summarize(&text);

        assert_eq!(summary.core_issue, CoreIssue::ComplexSituation);
        assert_eq!(
            summary.conclusion,
            "主要关注复杂情况相关问题，建议继续深入探讨，寻找更好的应对方式。"
        );
    }

    #[test]
    fn test_emotion_only() {
        let summary = summarizer().summarize("今天很开心");

        assert_eq!(summary.core_issue, CoreIssue::DailySharing);
        assert_eq!(summary.conclusion, "情绪状态良好，保持积极心态。");
    }

    #[test]
    fn test_summary_serializes_labels() {
        let summary = summarizer().summarize("");
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["emotion"], "中性");
        assert_eq!(json["core_issue"], "日常分享");
    }
}
