//! Campaign map modifiers — run-wide rules picked on the campaign map.
//!
//! A map modifier can narrow which events the director may pick and can
//! reshape an event's outcome when it resolves. Each one also carries a
//! short note that is surfaced alongside the director's decision.

use crate::events::{Event, MeterImpact};
use crate::meters::names;

pub const RENT_CONTROL_CITY: &str = "modifier.rentControlCity";
pub const HQS_REINSPECTION_WEEK: &str = "modifier.hqsReinspectionWeek";

const RENT_CONTROL_SUFFIX: &str = "Rent control caps ROI gains and raises compliance scrutiny.";
const REINSPECTION_SUFFIX: &str = "Inspection blitz boosts trust for equity-aligned work.";

/// A run-wide modifier definition.
pub struct MapModifier {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub effect_summary: &'static str,
    pub director_note: &'static str,
    /// Events for which this returns false are withheld from the director.
    pub event_filter: Option<fn(&Event) -> bool>,
    pub adjust_outcome: Option<fn(Option<&Event>, MeterImpact) -> MeterImpact>,
}

fn with_suffix(summary: &str, suffix: &str) -> String {
    if summary.contains(suffix) {
        summary.to_string()
    } else {
        format!("{summary} ({suffix})")
    }
}

fn apply_rent_control(event: Option<&Event>, mut outcome: MeterImpact) -> MeterImpact {
    let Some(event) = event else {
        return outcome;
    };
    if !event.topic_mentions("rent") {
        return outcome;
    }

    let roi = outcome.get(names::OWNER_ROI).unwrap_or(0.0);
    let compliance = outcome.get(names::COMPLIANCE).unwrap_or(0.0);
    let capped_roi = if roi > 0.0 {
        (roi * 0.5).ceil().max(-10.0)
    } else {
        roi
    };
    let stricter = if compliance >= 0.0 {
        compliance + 1.0
    } else {
        compliance - 1.0
    };

    outcome.effects.insert(names::OWNER_ROI.to_string(), capped_roi);
    outcome.effects.insert(names::COMPLIANCE.to_string(), stricter);
    outcome.summary = with_suffix(&outcome.summary, RENT_CONTROL_SUFFIX);
    outcome
}

fn apply_reinspection_week(event: Option<&Event>, mut outcome: MeterImpact) -> MeterImpact {
    let Some(event) = event else {
        return outcome;
    };
    if !(event.topic_mentions("notice") || event.topic_mentions("njlad")) {
        return outcome;
    }

    let trust = outcome.get(names::RESIDENT_TRUST).unwrap_or(0.0);
    let compliance = outcome.get(names::COMPLIANCE).unwrap_or(0.0);
    outcome.effects.insert(names::RESIDENT_TRUST.to_string(), trust + 1.0);
    outcome.effects.insert(names::COMPLIANCE.to_string(), compliance + 1.0);
    outcome.summary = with_suffix(&outcome.summary, REINSPECTION_SUFFIX);
    outcome
}

fn no_deposit_events(event: &Event) -> bool {
    !event.topic_mentions("deposit")
}

pub static MAP_MODIFIERS: [MapModifier; 2] = [
    MapModifier {
        id: RENT_CONTROL_CITY,
        name: "Rent Control City",
        description: "Cap rent adjustments and lean into habitability enforcement for this run.",
        effect_summary: "Owner ROI gains from rent events are halved while compliance scoring climbs when rent moves stay lawful.",
        director_note: "Rent Control City active — prioritize affordability optics and tempered rent strategies.",
        event_filter: None,
        adjust_outcome: Some(apply_rent_control),
    },
    MapModifier {
        id: HQS_REINSPECTION_WEEK,
        name: "HQS Re-inspection Week",
        description: "HUD re-checks push staff to clear equity and notice items before deposits.",
        effect_summary: "Deposit actions are paused; NJLAD and Notice events grant extra trust when resolved during the blitz.",
        director_note: "HQS Re-inspection Week — deposit playbooks are off the table while inspection teams chase equity wins.",
        event_filter: Some(no_deposit_events),
        adjust_outcome: Some(apply_reinspection_week),
    },
];

pub fn get_map_modifier(id: &str) -> Option<&'static MapModifier> {
    MAP_MODIFIERS.iter().find(|m| m.id == id)
}

fn active<'a, S: AsRef<str>>(ids: &'a [S]) -> impl Iterator<Item = &'static MapModifier> + 'a {
    MAP_MODIFIERS
        .iter()
        .filter(move |m| ids.iter().any(|id| id.as_ref() == m.id))
}

/// Events that pass every active filter. If the filters would remove every
/// event, the full list is returned instead.
pub fn filter_events_for_active_modifiers<'e, S: AsRef<str>>(
    events: &'e [Event],
    active_ids: &[S],
) -> Vec<&'e Event> {
    let filters: Vec<fn(&Event) -> bool> =
        active(active_ids).filter_map(|m| m.event_filter).collect();
    if filters.is_empty() {
        return events.iter().collect();
    }

    let filtered: Vec<&Event> = events
        .iter()
        .filter(|e| filters.iter().all(|keep| keep(e)))
        .collect();
    if filtered.is_empty() {
        log::warn!("map modifier filters removed every event; ignoring filters");
        return events.iter().collect();
    }
    filtered
}

/// Run the outcome through every active modifier in catalog order.
pub fn apply_modifiers_to_outcome<S: AsRef<str>>(
    event: Option<&Event>,
    outcome: MeterImpact,
    active_ids: &[S],
) -> MeterImpact {
    active(active_ids)
        .filter_map(|m| m.adjust_outcome)
        .fold(outcome, |current, adjust| adjust(event, current))
}

/// Director notes for the active modifiers, in catalog order.
pub fn collect_modifier_notes<S: AsRef<str>>(active_ids: &[S]) -> Vec<String> {
    active(active_ids)
        .map(|m| m.director_note.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<Event> {
        vec![
            Event::new("e1", "Security Deposit", 2),
            Event::new("e2", "rent increase", 2),
            Event::new("e3", "Notice to Quit", 3),
        ]
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(get_map_modifier(RENT_CONTROL_CITY).unwrap().name, "Rent Control City");
        assert!(get_map_modifier("modifier.unknown").is_none());
    }

    #[test]
    fn reinspection_filters_deposits() {
        let events = events();
        let kept = filter_events_for_active_modifiers(&events, &[HQS_REINSPECTION_WEEK]);
        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e3"]);

        let none: [&str; 0] = [];
        assert_eq!(filter_events_for_active_modifiers(&events, &none).len(), 3);
    }

    #[test]
    fn filter_falls_back_when_everything_removed() {
        let only_deposits = vec![Event::new("d1", "deposit", 1), Event::new("d2", "Deposit returns", 2)];
        let kept = filter_events_for_active_modifiers(&only_deposits, &[HQS_REINSPECTION_WEEK]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn rent_control_halves_roi_gains() {
        let events = events();
        let outcome = MeterImpact::new("Raised rent")
            .with(names::OWNER_ROI, 7.0)
            .with(names::COMPLIANCE, -2.0);
        let adjusted = apply_modifiers_to_outcome(Some(&events[1]), outcome, &[RENT_CONTROL_CITY]);
        assert_eq!(adjusted.get(names::OWNER_ROI), Some(4.0));
        assert_eq!(adjusted.get(names::COMPLIANCE), Some(-3.0));
        assert!(adjusted.summary.ends_with(&format!("({RENT_CONTROL_SUFFIX})")));

        // Applying twice does not stack the suffix.
        let again = apply_modifiers_to_outcome(Some(&events[1]), adjusted, &[RENT_CONTROL_CITY]);
        assert_eq!(again.summary.matches(RENT_CONTROL_SUFFIX).count(), 1);
    }

    #[test]
    fn rent_control_ignores_other_topics_and_losses() {
        let events = events();
        let outcome = MeterImpact::new("Quiet").with(names::OWNER_ROI, 6.0);
        let same = apply_modifiers_to_outcome(Some(&events[2]), outcome.clone(), &[RENT_CONTROL_CITY]);
        assert_eq!(same, outcome);
        assert_eq!(apply_modifiers_to_outcome(None, outcome.clone(), &[RENT_CONTROL_CITY]), outcome);

        let loss = MeterImpact::new("Refund").with(names::OWNER_ROI, -5.0);
        let adjusted = apply_modifiers_to_outcome(Some(&events[1]), loss, &[RENT_CONTROL_CITY]);
        assert_eq!(adjusted.get(names::OWNER_ROI), Some(-5.0));
        assert_eq!(adjusted.get(names::COMPLIANCE), Some(1.0));
    }

    #[test]
    fn reinspection_rewards_notice_work() {
        let events = events();
        let outcome = MeterImpact::new("Served notice").with(names::RESIDENT_TRUST, 2.0);
        let adjusted =
            apply_modifiers_to_outcome(Some(&events[2]), outcome, &[HQS_REINSPECTION_WEEK]);
        assert_eq!(adjusted.get(names::RESIDENT_TRUST), Some(3.0));
        assert_eq!(adjusted.get(names::COMPLIANCE), Some(1.0));
    }

    #[test]
    fn notes_in_catalog_order() {
        let notes = collect_modifier_notes(&[HQS_REINSPECTION_WEEK, RENT_CONTROL_CITY]);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].starts_with("Rent Control City"));
        assert!(notes[1].starts_with("HQS Re-inspection Week"));
    }
}
