//! Per-call plan input and its normalized form.
//!
//! The game loop hands the director a loosely-typed snapshot every day:
//! mastery scores that may be fractions or percentages, meters that may have
//! drifted out of range, mistakes recorded either as a bare topic or as a
//! detailed record. [`PlanInput::normalize`] turns that into a
//! [`PlanContext`] the scorer and rule modules can trust. Nothing here
//! rejects input; bad numbers are clamped or dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyCurve;
use crate::events::mentions;
use crate::meters::clamp_meter;

/// Mastery assumed for a topic the learner has never been scored on.
pub const DEFAULT_MASTERY: f64 = 0.5;

/// A recorded mistake as stored by the caller: either just the topic or a
/// full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MistakeEntry {
    Topic(String),
    Detailed(MistakeRecord),
}

/// Normalized mistake shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeRecord {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl MistakeRecord {
    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            timestamp: None,
            event_id: None,
        }
    }
}

impl From<MistakeEntry> for MistakeRecord {
    fn from(entry: MistakeEntry) -> Self {
        match entry {
            MistakeEntry::Topic(topic) => MistakeRecord::topic(topic),
            MistakeEntry::Detailed(record) => record,
        }
    }
}

impl From<&str> for MistakeEntry {
    fn from(topic: &str) -> Self {
        MistakeEntry::Topic(topic.to_string())
    }
}

/// Caller-supplied snapshot for one `plan_next` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    pub day: i64,
    #[serde(default)]
    pub mastery_by_topic: BTreeMap<String, f64>,
    #[serde(default)]
    pub recent_mistakes: Vec<MistakeEntry>,
    #[serde(default)]
    pub meter_states: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_curve: Option<DifficultyCurve>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_map_modifiers: Vec<String>,
}

impl PlanInput {
    pub fn for_day(day: i64) -> Self {
        Self {
            day,
            ..Self::default()
        }
    }

    /// Clamp and copy everything into a [`PlanContext`].
    ///
    /// Day is floored at 1. Meters are rounded and clamped into 0–100;
    /// non-finite meter values are dropped. Mastery is copied as given and
    /// normalized lazily by [`PlanContext::mastery`].
    pub fn normalize(&self) -> PlanContext {
        let day = self.day.clamp(1, u32::MAX as i64) as u32;
        let meter_states = self
            .meter_states
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(k, v)| (k.clone(), clamp_meter(*v)))
            .collect();
        PlanContext {
            day,
            mastery_by_topic: self.mastery_by_topic.clone(),
            recent_mistakes: self
                .recent_mistakes
                .iter()
                .cloned()
                .map(MistakeRecord::from)
                .collect(),
            meter_states,
        }
    }
}

/// Normalized context retained by the director for scoring and debug.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanContext {
    pub day: u32,
    pub mastery_by_topic: BTreeMap<String, f64>,
    pub recent_mistakes: Vec<MistakeRecord>,
    pub meter_states: BTreeMap<String, i32>,
}

impl PlanContext {
    /// Normalized mastery for `topic`, defaulting to [`DEFAULT_MASTERY`].
    pub fn mastery(&self, topic: &str) -> f64 {
        normalize_mastery(self.mastery_by_topic.get(topic).copied())
    }

    pub fn meter(&self, name: &str) -> Option<i32> {
        self.meter_states.get(name).copied()
    }

    pub fn mistake_count(&self) -> usize {
        self.recent_mistakes.len()
    }

    pub fn mistakes_for_topic(&self, topic: &str) -> usize {
        self.recent_mistakes
            .iter()
            .filter(|m| m.topic == topic)
            .count()
    }

    /// Whether any recent mistake's topic mentions `needle`, ignoring case.
    pub fn any_mistake_mentions(&self, needle: &str) -> bool {
        self.recent_mistakes.iter().any(|m| mentions(&m.topic, needle))
    }
}

/// Map a raw mastery value into 0–1.
///
/// Values above 1 are read as percentages. Missing or non-finite values
/// fall back to [`DEFAULT_MASTERY`].
pub fn normalize_mastery(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => {
            let scaled = if v > 1.0 { v / 100.0 } else { v };
            scaled.clamp(0.0, 1.0)
        }
        _ => DEFAULT_MASTERY,
    }
}

/// Right/wrong answer tallies for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryStats {
    pub right: u32,
    pub wrong: u32,
}

/// Mastery map from answer tallies. Topics without attempts are omitted so
/// they fall back to the default.
pub fn mastery_from_stats(stats: &BTreeMap<String, MasteryStats>) -> BTreeMap<String, f64> {
    stats
        .iter()
        .filter_map(|(topic, s)| {
            let attempts = s.right + s.wrong;
            (attempts > 0).then(|| (topic.clone(), s.right as f64 / attempts as f64))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_normalization() {
        assert_eq!(normalize_mastery(Some(150.0)), 1.0);
        assert_eq!(normalize_mastery(Some(0.5)), 0.5);
        assert_eq!(normalize_mastery(None), 0.5);
        assert_eq!(normalize_mastery(Some(80.0)), 0.8);
        assert_eq!(normalize_mastery(Some(-3.0)), 0.0);
        assert_eq!(normalize_mastery(Some(f64::NAN)), 0.5);
        assert_eq!(normalize_mastery(Some(f64::INFINITY)), 0.5);
        assert_eq!(normalize_mastery(Some(1.0)), 1.0);
    }

    #[test]
    fn day_is_floored_at_one() {
        assert_eq!(PlanInput::for_day(0).normalize().day, 1);
        assert_eq!(PlanInput::for_day(-12).normalize().day, 1);
        assert_eq!(PlanInput::for_day(9).normalize().day, 9);
    }

    #[test]
    fn meters_are_clamped_and_rounded() {
        let mut input = PlanInput::for_day(1);
        input.meter_states.insert("compliance".into(), 140.0);
        input.meter_states.insert("risk".into(), -5.0);
        input.meter_states.insert("ownerROI".into(), 54.6);
        input.meter_states.insert("residentTrust".into(), f64::NAN);
        let ctx = input.normalize();
        assert_eq!(ctx.meter("compliance"), Some(100));
        assert_eq!(ctx.meter("risk"), Some(0));
        assert_eq!(ctx.meter("ownerROI"), Some(55));
        assert_eq!(ctx.meter("residentTrust"), None);
    }

    #[test]
    fn mistakes_accept_both_shapes() {
        let json = r#"{
            "day": 2,
            "recentMistakes": ["deposit", {"topic": "njlad", "timestamp": "2024-01-01T00:00:00Z", "eventId": "e4"}]
        }"#;
        let input: PlanInput = serde_json::from_str(json).unwrap();
        let ctx = input.normalize();
        assert_eq!(ctx.recent_mistakes.len(), 2);
        assert_eq!(ctx.recent_mistakes[0], MistakeRecord::topic("deposit"));
        assert_eq!(ctx.recent_mistakes[1].event_id.as_deref(), Some("e4"));
        assert!(ctx.any_mistake_mentions("NJLAD"));
        assert_eq!(ctx.mistakes_for_topic("deposit"), 1);
        assert_eq!(ctx.mistakes_for_topic("rent"), 0);
    }

    #[test]
    fn normalize_copies_input() {
        let mut input = PlanInput::for_day(3);
        input.mastery_by_topic.insert("rent".into(), 0.9);
        let ctx = input.normalize();
        input.mastery_by_topic.insert("rent".into(), 0.1);
        assert_eq!(ctx.mastery("rent"), 0.9);
        assert_eq!(ctx.mastery("unseen"), DEFAULT_MASTERY);
    }

    #[test]
    fn mastery_from_tallies() {
        let mut stats = BTreeMap::new();
        stats.insert("rent".to_string(), MasteryStats { right: 3, wrong: 1 });
        stats.insert("notice".to_string(), MasteryStats::default());
        let mastery = mastery_from_stats(&stats);
        assert_eq!(mastery.get("rent"), Some(&0.75));
        assert!(!mastery.contains_key("notice"));
    }
}
