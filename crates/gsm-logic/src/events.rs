//! Event cards as the director sees them.
//!
//! Events are owned by the content pack and are never mutated here.
//! The only derived property is the event's [`Mode`], classified from
//! its id, topic, pressure, and question link.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::modes::Mode;

/// Pressure at or above which an event is treated as boss setup.
pub const BOSS_PRESSURE: u32 = 4;

/// Named meter deltas applied when an event resolves, plus a summary line.
///
/// Serialized flat: `{ "compliance": 3, "ownerROI": -2, "summary": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterImpact {
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub effects: BTreeMap<String, f64>,
}

impl MeterImpact {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            effects: BTreeMap::new(),
        }
    }

    /// Builder-style delta for one meter.
    pub fn with(mut self, meter: impl Into<String>, delta: f64) -> Self {
        self.effects.insert(meter.into(), delta);
        self
    }

    pub fn get(&self, meter: &str) -> Option<f64> {
        self.effects.get(meter).copied()
    }

    /// Numeric deltas only; non-finite values are skipped.
    pub fn deltas(&self) -> impl Iterator<Item = (&str, f64)> {
        self.effects
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(k, v)| (k.as_str(), *v))
    }
}

/// A scripted scenario card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub topic: String,
    pub pressure: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_impact: Option<MeterImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_question_id: Option<String>,
}

impl Event {
    pub fn new(id: impl Into<String>, topic: impl Into<String>, pressure: u32) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            pressure,
            description: String::new(),
            meter_impact: None,
            citation: None,
            related_question_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_impact(mut self, impact: MeterImpact) -> Self {
        self.meter_impact = Some(impact);
        self
    }

    pub fn with_question(mut self, question_id: impl Into<String>) -> Self {
        self.related_question_id = Some(question_id.into());
        self
    }

    /// Case-insensitive substring test on the topic.
    pub fn topic_mentions(&self, needle: &str) -> bool {
        mentions(&self.topic, needle)
    }

    /// Pedagogical mode of this event.
    ///
    /// Boss setup if the id or topic mentions "boss" or pressure is high;
    /// otherwise application if it links a question; otherwise recall.
    pub fn mode(&self) -> Mode {
        if mentions(&self.id, "boss") || self.topic_mentions("boss") || self.pressure >= BOSS_PRESSURE
        {
            Mode::BossSetup
        } else if self.related_question_id.is_some() {
            Mode::Application
        } else {
            Mode::Recall
        }
    }
}

/// Case-insensitive substring test.
pub(crate) fn mentions(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_by_id_topic_or_pressure() {
        assert_eq!(Event::new("boss-eviction", "notice", 1).mode(), Mode::BossSetup);
        assert_eq!(Event::new("e1", "Boss Hearing", 1).mode(), Mode::BossSetup);
        assert_eq!(Event::new("e2", "rent", 4).mode(), Mode::BossSetup);
        // Pressure wins even when a question is linked.
        assert_eq!(
            Event::new("e3", "rent", 5).with_question("q1").mode(),
            Mode::BossSetup
        );
    }

    #[test]
    fn application_when_question_linked() {
        let event = Event::new("e1", "deposit", 2).with_question("q-deposit-1");
        assert_eq!(event.mode(), Mode::Application);
    }

    #[test]
    fn recall_otherwise() {
        assert_eq!(Event::new("e1", "habitability", 3).mode(), Mode::Recall);
    }

    #[test]
    fn topic_mentions_ignores_case() {
        let event = Event::new("e1", "NJLAD Screening", 2);
        assert!(event.topic_mentions("njlad"));
        assert!(!event.topic_mentions("deposit"));
    }

    #[test]
    fn parses_pack_event_json() {
        let json = r#"{
            "id": "evt-lease-1",
            "topic": "rent",
            "pressure": 2,
            "description": "Tenant disputes a rent increase.",
            "meterImpact": { "compliance": 4, "ownerROI": -3, "summary": "Lawful increase" },
            "citation": "https://example.org/rent",
            "relatedQuestionId": "q-rent-1"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "evt-lease-1");
        let impact = event.meter_impact.as_ref().unwrap();
        assert_eq!(impact.summary, "Lawful increase");
        assert_eq!(impact.get("compliance"), Some(4.0));
        assert_eq!(impact.get("ownerROI"), Some(-3.0));
        assert!(impact.get("summary").is_none());
        assert_eq!(event.mode(), Mode::Application);
    }

    #[test]
    fn minimal_event_json() {
        let event: Event =
            serde_json::from_str(r#"{"id":"e","topic":"t","pressure":0}"#).unwrap();
        assert!(event.meter_impact.is_none());
        assert!(event.description.is_empty());
    }
}
