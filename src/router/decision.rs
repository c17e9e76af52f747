// Response routing decision

use std::sync::Arc;

use crate::lexicon::{CombinationRule, Emotion, Lexicon, Topic};

#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision<'a> {
    /// Crisis language; bypasses every other rule
    Crisis,
    /// Special emotion + topic rule with its own framework
    Combination(&'a CombinationRule),
    Topic(Topic),
    Emotion(Emotion),
    Default,
}

impl RouteDecision<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Crisis => "crisis",
            RouteDecision::Combination(_) => "combination",
            RouteDecision::Topic(_) => "topic",
            RouteDecision::Emotion(_) => "emotion",
            RouteDecision::Default => "default",
        }
    }
}

/// What the router looks at
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSignals<'s> {
    pub emotion: Option<Emotion>,
    pub topic: Option<Topic>,
    pub is_crisis: bool,
    /// Combination rule already matched against the raw text, by name
    pub combination: Option<&'s str>,
    /// No text was seen; combination rules may match on the labels alone
    pub labels_only: bool,
}

#[derive(Debug, Clone)]
pub struct ResponseRouter {
    lexicon: Arc<Lexicon>,
}

impl ResponseRouter {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Priority scan: crisis, combination, topic, emotion, default
    pub fn route(&self, signals: &RouteSignals<'_>) -> RouteDecision<'_> {
        if signals.is_crisis {
            tracing::info!("Routing decision: CRISIS");
            return RouteDecision::Crisis;
        }

        let rule = match signals.combination {
            Some(name) => self.lexicon.combination(name),
            None if signals.labels_only => self
                .lexicon
                .combinations
                .iter()
                .find(|rule| rule.matches_labels(signals.emotion, signals.topic)),
            None => None,
        };
        if let Some(rule) = rule {
            tracing::debug!(rule = %rule.name, framework = %rule.framework, "Routing decision: COMBINATION");
            return RouteDecision::Combination(rule);
        }

        let decision = match (signals.topic, signals.emotion) {
            (Some(topic), _) => RouteDecision::Topic(topic),
            (None, Some(emotion)) => RouteDecision::Emotion(emotion),
            (None, None) => RouteDecision::Default,
        };
        tracing::debug!(decision = decision.as_str(), "Routing decision");
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> ResponseRouter {
        ResponseRouter::new(Arc::new(Lexicon::builtin().unwrap()))
    }

    #[test]
    fn test_crisis_bypasses_everything() {
        let router = router();
        let signals = RouteSignals {
            emotion: Some(Emotion::Anxiety),
            topic: Some(Topic::Work),
            is_crisis: true,
            combination: Some("work_anxiety"),
            ..Default::default()
        };
        assert_eq!(router.route(&signals), RouteDecision::Crisis);
    }

    #[test]
    fn test_combination_from_labels() {
        let router = router();
        let signals = RouteSignals {
            emotion: Some(Emotion::Anxiety),
            topic: Some(Topic::Work),
            labels_only: true,
            ..Default::default()
        };

        match router.route(&signals) {
            RouteDecision::Combination(rule) => assert_eq!(rule.framework, "正念疗法"),
            other => panic!("expected combination, got {:?}", other),
        }
    }

    #[test]
    fn test_labels_ignored_when_text_matched_no_rule() {
        let router = router();
        let signals = RouteSignals {
            emotion: Some(Emotion::Anxiety),
            topic: Some(Topic::Work),
            combination: None,
            ..Default::default()
        };
        assert_eq!(router.route(&signals), RouteDecision::Topic(Topic::Work));
    }

    #[test]
    fn test_combination_from_text_overrides_labels() {
        let router = router();
        // Labels alone would route to the topic
        let signals = RouteSignals {
            emotion: Some(Emotion::Anger),
            topic: Some(Topic::Family),
            combination: Some("breakup_depression"),
            ..Default::default()
        };

        match router.route(&signals) {
            RouteDecision::Combination(rule) => assert_eq!(rule.framework, "CBT"),
            other => panic!("expected combination, got {:?}", other),
        }
    }

    #[test]
    fn test_topic_before_emotion() {
        let router = router();
        let signals = RouteSignals {
            emotion: Some(Emotion::Anger),
            topic: Some(Topic::Family),
            ..Default::default()
        };
        assert_eq!(router.route(&signals), RouteDecision::Topic(Topic::Family));

        let emotion_only = RouteSignals {
            emotion: Some(Emotion::Anger),
            ..Default::default()
        };
        assert_eq!(router.route(&emotion_only), RouteDecision::Emotion(Emotion::Anger));

        assert_eq!(router.route(&RouteSignals::default()), RouteDecision::Default);
    }

    #[test]
    fn test_unknown_rule_name_falls_through() {
        let router = router();
        let signals = RouteSignals {
            emotion: Some(Emotion::Happiness),
            combination: Some("no_such_rule"),
            ..Default::default()
        };
        assert_eq!(router.route(&signals), RouteDecision::Emotion(Emotion::Happiness));
    }
}
