//! Contextual modifier labels attached to each decision.
//!
//! A fixed, ordered catalog of condition → label rules. Every rule that holds
//! contributes its label; the survivors are shuffled and cut to
//! [`MAX_MODIFIERS`]. When nothing fires there is a chance of a single filler
//! label so quiet days still get some flavor.

use crate::context::PlanContext;
use crate::events::Event;
use crate::meters::names;
use crate::rng::RandomSource;

pub const MAX_MODIFIERS: usize = 2;

/// Draw above which the filler label is added on a quiet day.
pub const FILLER_THRESHOLD: f64 = 0.6;

pub const FILLER_LABEL: &str = "Regional Policy Brief Released";

/// A single condition → label rule.
pub struct ModifierRule {
    pub label: &'static str,
    pub applies: fn(&PlanContext, Option<&Event>) -> bool,
}

fn meter_below(ctx: &PlanContext, meter: &str, threshold: i32) -> bool {
    ctx.meter(meter).is_some_and(|v| v < threshold)
}

fn rent_control(ctx: &PlanContext, _: Option<&Event>) -> bool {
    meter_below(ctx, names::OWNER_ROI, 55)
}

fn voucher_inspection(ctx: &PlanContext, _: Option<&Event>) -> bool {
    meter_below(ctx, names::COMPLIANCE, 60) || ctx.any_mistake_mentions("njlad")
}

fn court_backlog(ctx: &PlanContext, _: Option<&Event>) -> bool {
    ctx.day % 5 == 0
}

fn advocacy_spotlight(ctx: &PlanContext, event: Option<&Event>) -> bool {
    event.is_some_and(|e| e.topic_mentions("njlad")) || meter_below(ctx, names::RESIDENT_TRUST, 50)
}

/// Rules in evaluation order.
pub const MODIFIER_RULES: [ModifierRule; 4] = [
    ModifierRule {
        label: "Municipal Rent Control in effect",
        applies: rent_control,
    },
    ModifierRule {
        label: "Voucher Inspection this week",
        applies: voucher_inspection,
    },
    ModifierRule {
        label: "Housing Court Backlog slowing filings",
        applies: court_backlog,
    },
    ModifierRule {
        label: "Community Advocacy Spotlight hits the property",
        applies: advocacy_spotlight,
    },
];

/// Labels of every rule that holds, in catalog order.
pub fn matching_labels(ctx: &PlanContext, event: Option<&Event>) -> Vec<&'static str> {
    MODIFIER_RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx, event))
        .map(|rule| rule.label)
        .collect()
}

/// Final modifier list for a decision.
///
/// Draws once when no rule fires, otherwise once per matching label.
pub fn generate_modifiers<R>(ctx: &PlanContext, event: Option<&Event>, rng: &mut R) -> Vec<String>
where
    R: RandomSource + ?Sized,
{
    let labels = matching_labels(ctx, event);

    if labels.is_empty() {
        return if rng.next_f64() > FILLER_THRESHOLD {
            vec![FILLER_LABEL.to_string()]
        } else {
            Vec::new()
        };
    }

    let mut keyed: Vec<(f64, &'static str)> =
        labels.into_iter().map(|label| (rng.next_f64(), label)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    keyed
        .into_iter()
        .take(MAX_MODIFIERS)
        .map(|(_, label)| label.to_string())
        .collect()
}
