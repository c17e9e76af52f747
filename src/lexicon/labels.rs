// Category labels shared by the matcher, the assembler and the summarizer
//
// Every label serializes as its Chinese display form, which is also the
// form used as key in the JSON data files.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Coarse affect label detected via keyword presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "焦虑")]
    Anxiety,
    #[serde(rename = "抑郁")]
    Depression,
    #[serde(rename = "愤怒")]
    Anger,
    #[serde(rename = "压力")]
    Stress,
    #[serde(rename = "快乐")]
    Happiness,
    #[serde(rename = "孤独")]
    Loneliness,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Anxiety,
        Emotion::Depression,
        Emotion::Anger,
        Emotion::Stress,
        Emotion::Happiness,
        Emotion::Loneliness,
    ];

    /// Label reported when no emotion keyword matched
    pub const NEUTRAL_LABEL: &'static str = "中性";

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Anxiety => "焦虑",
            Emotion::Depression => "抑郁",
            Emotion::Anger => "愤怒",
            Emotion::Stress => "压力",
            Emotion::Happiness => "快乐",
            Emotion::Loneliness => "孤独",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }

    /// Label of an optional emotion, neutral when absent
    pub fn label_or_neutral(emotion: Option<Emotion>) -> &'static str {
        emotion.map_or(Self::NEUTRAL_LABEL, |e| e.label())
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user's message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "家庭关系")]
    Family,
    #[serde(rename = "工作压力")]
    Work,
    #[serde(rename = "学习问题")]
    Study,
    #[serde(rename = "情感关系")]
    Relationship,
    #[serde(rename = "人际关系")]
    Interpersonal,
    #[serde(rename = "自我认知")]
    SelfConcept,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Family,
        Topic::Work,
        Topic::Study,
        Topic::Relationship,
        Topic::Interpersonal,
        Topic::SelfConcept,
    ];

    /// Label reported when no topic keyword matched
    pub const GENERAL_LABEL: &'static str = "通用";

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Family => "家庭关系",
            Topic::Work => "工作压力",
            Topic::Study => "学习问题",
            Topic::Relationship => "情感关系",
            Topic::Interpersonal => "人际关系",
            Topic::SelfConcept => "自我认知",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn label_or_general(topic: Option<Topic>) -> &'static str {
        topic.map_or(Self::GENERAL_LABEL, |t| t.label())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scene a guide question is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    Emotion(Emotion),
    Topic(Topic),
    General,
}

impl Scene {
    pub fn label(&self) -> &'static str {
        match self {
            Scene::Emotion(e) => e.label(),
            Scene::Topic(t) => t.label(),
            Scene::General => Topic::GENERAL_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label == Topic::GENERAL_LABEL {
            return Some(Scene::General);
        }
        Emotion::from_label(label)
            .map(Scene::Emotion)
            .or_else(|| Topic::from_label(label).map(Scene::Topic))
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Scene {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Scene::from_label(&label)
            .ok_or_else(|| de::Error::custom(format!("unknown scene label '{}'", label)))
    }
}

/// Core issue extracted by the analysis pass
///
/// A topic when topic keywords matched, otherwise one of the three fallback
/// labels chosen from the shape of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreIssue {
    Topic(Topic),
    /// Long text without any topic keyword
    ComplexSituation,
    /// Text asking what to do
    DecisionDifficulty,
    /// Everything else
    DailySharing,
}

impl CoreIssue {
    pub fn label(&self) -> &'static str {
        match self {
            CoreIssue::Topic(t) => t.label(),
            CoreIssue::ComplexSituation => "复杂情况",
            CoreIssue::DecisionDifficulty => "决策困难",
            CoreIssue::DailySharing => "日常分享",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "复杂情况" => Some(CoreIssue::ComplexSituation),
            "决策困难" => Some(CoreIssue::DecisionDifficulty),
            "日常分享" => Some(CoreIssue::DailySharing),
            other => Topic::from_label(other).map(CoreIssue::Topic),
        }
    }

    pub fn topic(&self) -> Option<Topic> {
        match self {
            CoreIssue::Topic(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for CoreIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CoreIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for CoreIssue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        CoreIssue::from_label(&label)
            .ok_or_else(|| de::Error::custom(format!("unknown core issue label '{}'", label)))
    }
}

/// Serde adapter storing `Option<Emotion>` as a label, `中性` for `None`
pub mod emotion_or_neutral {
    use super::Emotion;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Emotion>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Emotion::label_or_neutral(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Emotion>, D::Error> {
        let label = String::deserialize(deserializer)?;
        if label == Emotion::NEUTRAL_LABEL {
            return Ok(None);
        }
        Emotion::from_label(&label)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown emotion label '{}'", label)))
    }
}
