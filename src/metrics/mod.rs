// Service metrics
// Prometheus counters for chat traffic, crisis detections and analyses

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use sha2::{Digest, Sha256};

use crate::respond::ResponseSource;

/// Counters owned by one server instance; each instance has its own registry
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    messages: IntCounterVec,
    crises: IntCounter,
    analyses: IntCounter,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let messages = IntCounterVec::new(
            Opts::new("solace_messages_total", "Chat messages answered, by response source"),
            &["source"],
        )?;
        let crises = IntCounter::new(
            "solace_crisis_detections_total",
            "Messages flagged by the crisis detector",
        )?;
        let analyses = IntCounter::new("solace_analyses_total", "Conversation analyses recorded")?;

        registry.register(Box::new(messages.clone()))?;
        registry.register(Box::new(crises.clone()))?;
        registry.register(Box::new(analyses.clone()))?;

        Ok(Self {
            registry,
            messages,
            crises,
            analyses,
        })
    }

    pub fn record_message(&self, source: ResponseSource) {
        self.messages.with_label_values(&[source.as_str()]).inc();
        if source == ResponseSource::Crisis {
            self.crises.inc();
        }
    }

    pub fn record_analysis(&self) {
        self.analyses.inc();
    }

    pub fn messages(&self, source: ResponseSource) -> u64 {
        self.messages.with_label_values(&[source.as_str()]).get()
    }

    pub fn crises(&self) -> u64 {
        self.crises.get()
    }

    pub fn analyses(&self) -> u64 {
        self.analyses.get()
    }

    /// Prometheus text exposition format
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }
}

/// Short stable identifier for user text, so logs never carry the text itself
pub fn text_digest(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_encoding() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record_message(ResponseSource::Basic);
        metrics.record_message(ResponseSource::Crisis);
        metrics.record_analysis();

        assert_eq!(metrics.messages(ResponseSource::Basic), 1);
        assert_eq!(metrics.crises(), 1);
        assert_eq!(metrics.analyses(), 1);

        let text = metrics.encode().unwrap();
        assert!(text.contains("solace_messages_total{source=\"crisis\"} 1"));
        assert!(text.contains("solace_analyses_total 1"));
    }

    #[test]
    fn test_text_digest_is_stable_and_short() {
        let a = text_digest("我很焦虑");
        assert_eq!(a.len(), 12);
        assert_eq!(a, text_digest("我很焦虑"));
        assert_ne!(a, text_digest("我很开心"));
    }
}
