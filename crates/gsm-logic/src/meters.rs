//! Player meters and event outcome application.
//!
//! Meters are 0–100 gauges of how the property is doing. Events carry a
//! [`MeterImpact`](crate::events::MeterImpact) that moves them when the case
//! resolves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::MeterImpact;

/// Meter names as they appear in content packs and plan input.
pub mod names {
    pub const COMPLIANCE: &str = "compliance";
    pub const RESIDENT_TRUST: &str = "residentTrust";
    pub const OWNER_ROI: &str = "ownerROI";
    pub const RISK: &str = "risk";
}

pub const METER_MIN: i32 = 0;
pub const METER_MAX: i32 = 100;

/// Round and clamp a raw meter value into 0–100.
pub fn clamp_meter(value: f64) -> i32 {
    if !value.is_finite() {
        return if value > 0.0 { METER_MAX } else { METER_MIN };
    }
    (value.round() as i32).clamp(METER_MIN, METER_MAX)
}

/// The four core meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterSnapshot {
    pub compliance: i32,
    pub resident_trust: i32,
    #[serde(rename = "ownerROI")]
    pub owner_roi: i32,
    pub risk: i32,
}

impl Default for MeterSnapshot {
    fn default() -> Self {
        Self {
            compliance: 70,
            resident_trust: 70,
            owner_roi: 60,
            risk: 40,
        }
    }
}

impl MeterSnapshot {
    /// Meter map in the shape `PlanInput::meter_states` expects.
    pub fn to_meter_states(&self) -> BTreeMap<String, f64> {
        [
            (names::COMPLIANCE, self.compliance),
            (names::RESIDENT_TRUST, self.resident_trust),
            (names::OWNER_ROI, self.owner_roi),
            (names::RISK, self.risk),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v as f64))
        .collect()
    }
}

/// Apply an outcome's deltas and clamp. Unknown meters in the impact are ignored.
pub fn apply_outcome(snapshot: &MeterSnapshot, impact: &MeterImpact) -> MeterSnapshot {
    let moved = |current: i32, meter: &str| {
        let delta = impact.get(meter).filter(|d| d.is_finite()).unwrap_or(0.0);
        clamp_meter(current as f64 + delta)
    };
    MeterSnapshot {
        compliance: moved(snapshot.compliance, names::COMPLIANCE),
        resident_trust: moved(snapshot.resident_trust, names::RESIDENT_TRUST),
        owner_roi: moved(snapshot.owner_roi, names::OWNER_ROI),
        risk: moved(snapshot.risk, names::RISK),
    }
}

/// One-line "Compliance up · Resident Trust steady · ..." description.
pub fn describe_outcome(snapshot: &MeterSnapshot, impact: &MeterImpact) -> String {
    let next = apply_outcome(snapshot, impact);
    let direction = |after: i32, before: i32| match after.cmp(&before) {
        std::cmp::Ordering::Greater => "up",
        std::cmp::Ordering::Less => "down",
        std::cmp::Ordering::Equal => "steady",
    };

    [
        format!("Compliance {}", direction(next.compliance, snapshot.compliance)),
        format!(
            "Resident Trust {}",
            direction(next.resident_trust, snapshot.resident_trust)
        ),
        format!("Owner ROI {}", direction(next.owner_roi, snapshot.owner_roi)),
        format!("Risk {}", direction(next.risk, snapshot.risk)),
        impact.summary.clone(),
    ]
    .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_rounds_and_bounds() {
        assert_eq!(clamp_meter(54.5), 55);
        assert_eq!(clamp_meter(54.4), 54);
        assert_eq!(clamp_meter(-1.0), 0);
        assert_eq!(clamp_meter(250.0), 100);
        assert_eq!(clamp_meter(f64::INFINITY), 100);
        assert_eq!(clamp_meter(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn apply_outcome_moves_and_clamps() {
        let snapshot = MeterSnapshot {
            compliance: 98,
            ..MeterSnapshot::default()
        };
        let impact = MeterImpact::new("Fixed the boiler")
            .with(names::COMPLIANCE, 5.0)
            .with(names::OWNER_ROI, -8.0)
            .with("morale", 30.0);
        let next = apply_outcome(&snapshot, &impact);
        assert_eq!(next.compliance, 100);
        assert_eq!(next.owner_roi, 52);
        assert_eq!(next.resident_trust, 70);
        assert_eq!(next.risk, 40);
    }

    #[test]
    fn describe_reports_directions() {
        let snapshot = MeterSnapshot::default();
        let impact = MeterImpact::new("Tenant satisfied")
            .with(names::COMPLIANCE, 2.0)
            .with(names::OWNER_ROI, -1.0);
        assert_eq!(
            describe_outcome(&snapshot, &impact),
            "Compliance up · Resident Trust steady · Owner ROI down · Risk steady · Tenant satisfied"
        );
    }

    #[test]
    fn snapshot_to_states_uses_pack_names() {
        let states = MeterSnapshot::default().to_meter_states();
        assert_eq!(states.get("ownerROI"), Some(&60.0));
        assert_eq!(states.get("residentTrust"), Some(&70.0));
        assert_eq!(states.len(), 4);

        let json = serde_json::to_value(MeterSnapshot::default()).unwrap();
        assert_eq!(json["ownerROI"], 60);
        assert_eq!(json["residentTrust"], 70);
    }
}
