use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::numeric::{clamp_unit, outside_percent_range, pct, safe_div};
use crate::state::ProjectState;
use crate::types::{with_metadata, ComputationOutput, Feet, Score};

/// Comfortable walking radius (~5 minutes).
pub const FIVE_MINUTE_WALK_FT: Feet = dec!(1200);

/// Shade coverage at which the shade sub-score saturates.
const SHADE_TARGET_PCT: Decimal = dec!(70);
/// Heat-mitigation features at which the heat sub-score saturates.
const HEAT_TARGET_COUNT: Decimal = dec!(3);
/// Maximum deduction for fully visible parking.
const PARKING_PENALTY_MAX: Decimal = dec!(15);
/// Deduction per car / pedestrian crossing. Uncapped.
const CONFLICT_PENALTY_PER_CROSSING: Decimal = dec!(3);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Qualitative band for the final walkability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WalkabilityGrade {
    #[serde(rename = "Car Dependent")]
    CarDependent,
    #[serde(rename = "Walkable But Fragile")]
    WalkableButFragile,
    #[serde(rename = "Strong Suburban")]
    StrongSuburban,
    #[serde(rename = "Destination Grade")]
    DestinationGrade,
}

impl WalkabilityGrade {
    /// Grade bands, highest first. The first threshold the score reaches wins.
    pub const THRESHOLDS: [(Score, WalkabilityGrade); 3] = [
        (dec!(85), WalkabilityGrade::DestinationGrade),
        (dec!(75), WalkabilityGrade::StrongSuburban),
        (dec!(65), WalkabilityGrade::WalkableButFragile),
    ];

    pub fn from_score(score: Score) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, grade)| *grade)
            .unwrap_or(WalkabilityGrade::CarDependent)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WalkabilityGrade::DestinationGrade => "Destination Grade",
            WalkabilityGrade::StrongSuburban => "Strong Suburban",
            WalkabilityGrade::WalkableButFragile => "Walkable But Fragile",
            WalkabilityGrade::CarDependent => "Car Dependent",
        }
    }
}

impl fmt::Display for WalkabilityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pedestrian-experience score for a project snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkabilityResult {
    /// Spine length divided by node count (0 without nodes)
    pub avg_walk_distance: Feet,
    /// avg_walk_distance <= 1,200 ft
    pub five_min_walk_compliant: bool,
    pub shade_score: Score,
    pub seating_score: Score,
    pub tree_score: Score,
    pub heat_score: Score,
    /// 35% shade, 25% seating, 25% trees, 15% heat mitigation
    pub comfort_score: Score,
    pub frontage_score: Score,
    pub avg_operating_hours: Decimal,
    pub hours_score: Score,
    pub uses_per_node: Decimal,
    pub node_score: Score,
    pub night_life_pct: Decimal,
    /// 30% frontage, 25% hours, 25% node density, 20% night life
    pub activation_score: Score,
    pub parking_penalty: Decimal,
    pub conflict_penalty: Decimal,
    /// Parking + conflict penalties
    pub penalty: Decimal,
    /// Equal blend of comfort and activation before penalties
    pub raw_score: Score,
    /// max(0, raw - penalty)
    pub final_score: Score,
    pub grade: WalkabilityGrade,
}

#[derive(Debug, Clone, Serialize)]
struct ScoringAssumptions {
    five_minute_walk_ft: Feet,
    comfort_weight: Decimal,
    activation_weight: Decimal,
    parking_penalty_max: Decimal,
    conflict_penalty_per_crossing: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score the pedestrian experience of a project.
///
/// Comfort (shade, seating, trees, heat mitigation) and activation
/// (frontage, hours, node density, night life) are blended equally, then
/// visible parking and car crossings are deducted. The result is floored
/// at zero but not capped; the sub-score caps keep it at or below 100 for
/// in-range inputs.
pub fn compute_walkability(state: &ProjectState) -> WalkabilityResult {
    let num_nodes = Decimal::from(state.num_nodes);
    let tenant_count = Decimal::from(state.tenants.len() as u64);

    let avg_walk_distance = safe_div(state.ped_spine_length_ft, num_nodes, Decimal::ZERO);
    let five_min_walk_compliant = avg_walk_distance <= FIVE_MINUTE_WALK_FT;

    // --- Comfort ---
    let shade_score = clamp_unit(state.shade_pct / SHADE_TARGET_PCT) * dec!(100);
    let seating_score = step_down(state.seating_interval_ft, dec!(150), dec!(250));
    let tree_score = step_down(state.tree_interval_ft, dec!(40), dec!(60));
    let heat_score =
        clamp_unit(Decimal::from(state.heat_mitigation_count) / HEAT_TARGET_COUNT) * dec!(100);
    let comfort_score = shade_score * dec!(0.35)
        + seating_score * dec!(0.25)
        + tree_score * dec!(0.25)
        + heat_score * dec!(0.15);

    // --- Activation ---
    let frontage_score = state.active_frontage_pct;
    let total_hours: Decimal = state.tenants.iter().map(|t| t.operating_hours).sum();
    let avg_operating_hours = safe_div(total_hours, tenant_count, Decimal::ZERO);
    let hours_score = step_up(avg_operating_hours, dec!(12), dec!(9));
    let uses_per_node = safe_div(tenant_count, num_nodes, Decimal::ZERO);
    let node_score = step_up(uses_per_node, dec!(4), dec!(3));
    let night_active = Decimal::from(state.tenants.iter().filter(|t| t.night_active).count() as u64);
    let night_life_pct = safe_div(night_active, tenant_count, Decimal::ZERO) * dec!(100);
    let activation_score = frontage_score * dec!(0.30)
        + hours_score * dec!(0.25)
        + node_score * dec!(0.25)
        + night_life_pct * dec!(0.20);

    // --- Penalties ---
    let parking_penalty = pct(state.parking_visible_pct) * PARKING_PENALTY_MAX;
    let conflict_penalty = Decimal::from(state.car_crossings_count) * CONFLICT_PENALTY_PER_CROSSING;
    let penalty = parking_penalty + conflict_penalty;

    let raw_score = comfort_score * dec!(0.50) + activation_score * dec!(0.50);
    let final_score = (raw_score - penalty).max(Decimal::ZERO);
    let grade = WalkabilityGrade::from_score(final_score);

    tracing::debug!(%comfort_score, %activation_score, %penalty, %final_score, %grade, "computed walkability");

    WalkabilityResult {
        avg_walk_distance,
        five_min_walk_compliant,
        shade_score,
        seating_score,
        tree_score,
        heat_score,
        comfort_score,
        frontage_score,
        avg_operating_hours,
        hours_score,
        uses_per_node,
        node_score,
        night_life_pct,
        activation_score,
        parking_penalty,
        conflict_penalty,
        penalty,
        raw_score,
        final_score,
        grade,
    }
}

/// [`compute_walkability`] wrapped in the standard output envelope.
pub fn score_walkability(state: &ProjectState) -> ComputationOutput<WalkabilityResult> {
    let start = Instant::now();
    let result = compute_walkability(state);
    let warnings = collect_warnings(state, &result);

    let assumptions = ScoringAssumptions {
        five_minute_walk_ft: FIVE_MINUTE_WALK_FT,
        comfort_weight: dec!(0.50),
        activation_weight: dec!(0.50),
        parking_penalty_max: PARKING_PENALTY_MAX,
        conflict_penalty_per_crossing: CONFLICT_PENALTY_PER_CROSSING,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Pedestrian Walkability Score (Comfort x Activation less Penalties)",
        &assumptions,
        warnings,
        elapsed,
        result,
    )
}

// ---------------------------------------------------------------------------
// Sub-score steps
// ---------------------------------------------------------------------------

/// Shorter is better: 100 within `best`, 70 within `good`, else 40.
fn step_down(value: Decimal, best: Decimal, good: Decimal) -> Score {
    if value <= best {
        dec!(100)
    } else if value <= good {
        dec!(70)
    } else {
        dec!(40)
    }
}

/// Higher is better: 100 from `best`, 70 from `good`, else 40.
fn step_up(value: Decimal, best: Decimal, good: Decimal) -> Score {
    if value >= best {
        dec!(100)
    } else if value >= good {
        dec!(70)
    } else {
        dec!(40)
    }
}

fn collect_warnings(state: &ProjectState, result: &WalkabilityResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if state.num_nodes == 0 {
        warnings.push("No activity nodes; walk distance and node density default to 0".into());
    }
    if !result.five_min_walk_compliant {
        warnings.push(format!(
            "Average walk of {:.0} ft between nodes exceeds the {FIVE_MINUTE_WALK_FT} ft five-minute radius",
            result.avg_walk_distance
        ));
    }
    for (field, value) in [
        ("shade_pct", state.shade_pct),
        ("active_frontage_pct", state.active_frontage_pct),
        ("parking_visible_pct", state.parking_visible_pct),
    ] {
        if outside_percent_range(value) {
            warnings.push(format!("{field} = {value} is outside 0-100%"));
        }
    }
    if state.seating_interval_ft <= Decimal::ZERO {
        warnings.push("Seating interval is not positive".into());
    }
    if state.tree_interval_ft <= Decimal::ZERO {
        warnings.push("Tree interval is not positive".into());
    }
    if result.conflict_penalty > PARKING_PENALTY_MAX {
        warnings.push(format!(
            "{} car crossings cost {} points; more than the maximum parking penalty",
            state.car_crossings_count, result.conflict_penalty
        ));
    }
    if result.raw_score > result.penalty && result.final_score.is_zero() {
        warnings.push("Final score floored at 0".into());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Tenant;

    #[test]
    fn test_reference_project_scores() {
        let walk = compute_walkability(&ProjectState::default());

        // 800 ft spine / 3 nodes
        assert_eq!(walk.avg_walk_distance, dec!(800) / dec!(3));
        assert!(walk.five_min_walk_compliant);

        assert_eq!(walk.seating_score, dec!(70));
        assert_eq!(walk.tree_score, dec!(70));
        assert!((walk.heat_score - dec!(33.3333)).abs() < dec!(0.0001));
        assert!((walk.comfort_score - dec!(62.5)).abs() < dec!(0.0001));

        // Hours average 11.75 -> 70; 4 tenants / 3 nodes -> 40; 1 of 4 at night
        assert_eq!(walk.avg_operating_hours, dec!(11.75));
        assert_eq!(walk.hours_score, dec!(70));
        assert_eq!(walk.node_score, dec!(40));
        assert_eq!(walk.night_life_pct, dec!(25));
        assert_eq!(walk.activation_score, dec!(52));

        // 20% visible parking -> 3 points; 2 crossings -> 6 points
        assert_eq!(walk.parking_penalty, dec!(3));
        assert_eq!(walk.conflict_penalty, dec!(6));
        assert_eq!(walk.penalty, dec!(9));
        // raw 57.25 less 9 points
        assert!((walk.final_score - dec!(48.25)).abs() < dec!(0.0001));
        assert_eq!(walk.grade, WalkabilityGrade::CarDependent);
    }

    #[test]
    fn test_shade_partial_coverage() {
        let walk = compute_walkability(&ProjectState::default());
        let diff = (walk.shade_score - dec!(64.29)).abs();
        assert!(diff < dec!(0.01), "shade score {}", walk.shade_score);
    }

    #[test]
    fn test_shade_saturates() {
        let mut state = ProjectState::default();
        state.shade_pct = dec!(95);
        assert_eq!(compute_walkability(&state).shade_score, dec!(100));
    }

    #[test]
    fn test_step_boundaries() {
        assert_eq!(step_down(dec!(150), dec!(150), dec!(250)), dec!(100));
        assert_eq!(step_down(dec!(150.01), dec!(150), dec!(250)), dec!(70));
        assert_eq!(step_down(dec!(250), dec!(150), dec!(250)), dec!(70));
        assert_eq!(step_down(dec!(251), dec!(150), dec!(250)), dec!(40));

        assert_eq!(step_up(dec!(12), dec!(12), dec!(9)), dec!(100));
        assert_eq!(step_up(dec!(11.99), dec!(12), dec!(9)), dec!(70));
        assert_eq!(step_up(dec!(9), dec!(12), dec!(9)), dec!(70));
        assert_eq!(step_up(dec!(8.5), dec!(12), dec!(9)), dec!(40));
    }

    #[test]
    fn test_no_nodes() {
        let mut state = ProjectState::default();
        state.num_nodes = 0;
        let walk = compute_walkability(&state);

        assert_eq!(walk.avg_walk_distance, Decimal::ZERO);
        assert!(walk.five_min_walk_compliant);
        assert_eq!(walk.uses_per_node, Decimal::ZERO);
        assert_eq!(walk.node_score, dec!(40));
    }

    #[test]
    fn test_no_tenants() {
        let mut state = ProjectState::default();
        state.tenants.clear();
        let walk = compute_walkability(&state);

        assert_eq!(walk.avg_operating_hours, Decimal::ZERO);
        assert_eq!(walk.hours_score, dec!(40));
        assert_eq!(walk.night_life_pct, Decimal::ZERO);
        assert_eq!(walk.uses_per_node, Decimal::ZERO);
    }

    #[test]
    fn test_penalty_floor() {
        let mut state = ProjectState::default();
        state.car_crossings_count = 1000;
        let walk = compute_walkability(&state);

        assert_eq!(walk.conflict_penalty, dec!(3000));
        assert_eq!(walk.final_score, Decimal::ZERO);
        assert_eq!(walk.grade, WalkabilityGrade::CarDependent);
    }

    #[test]
    fn test_best_case_reaches_100() {
        let mut state = ProjectState::default();
        state.shade_pct = dec!(70);
        state.seating_interval_ft = dec!(100);
        state.tree_interval_ft = dec!(30);
        state.heat_mitigation_count = 5;
        state.active_frontage_pct = dec!(100);
        state.parking_visible_pct = Decimal::ZERO;
        state.car_crossings_count = 0;
        state.num_nodes = 1;
        for t in state.tenants.iter_mut() {
            t.operating_hours = dec!(16);
            t.night_active = true;
        }
        let walk = compute_walkability(&state);

        assert_eq!(walk.comfort_score, dec!(100));
        assert_eq!(walk.activation_score, dec!(100));
        assert_eq!(walk.final_score, dec!(100));
        assert_eq!(walk.grade, WalkabilityGrade::DestinationGrade);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(WalkabilityGrade::from_score(dec!(100)), WalkabilityGrade::DestinationGrade);
        assert_eq!(WalkabilityGrade::from_score(dec!(85)), WalkabilityGrade::DestinationGrade);
        assert_eq!(WalkabilityGrade::from_score(dec!(84.99)), WalkabilityGrade::StrongSuburban);
        assert_eq!(WalkabilityGrade::from_score(dec!(75)), WalkabilityGrade::StrongSuburban);
        assert_eq!(WalkabilityGrade::from_score(dec!(74.99)), WalkabilityGrade::WalkableButFragile);
        assert_eq!(WalkabilityGrade::from_score(dec!(65)), WalkabilityGrade::WalkableButFragile);
        assert_eq!(WalkabilityGrade::from_score(dec!(64.99)), WalkabilityGrade::CarDependent);
        assert_eq!(WalkabilityGrade::from_score(dec!(-5)), WalkabilityGrade::CarDependent);
    }

    #[test]
    fn test_grade_monotonic_over_range() {
        let mut previous = WalkabilityGrade::CarDependent;
        let mut score = dec!(-10);
        while score <= dec!(120) {
            let grade = WalkabilityGrade::from_score(score);
            assert!(grade >= previous, "grade dropped at {score}");
            previous = grade;
            score += dec!(0.5);
        }
        assert_eq!(previous, WalkabilityGrade::DestinationGrade);
    }

    #[test]
    fn test_grade_serializes_as_label() {
        let json = serde_json::to_string(&WalkabilityGrade::WalkableButFragile).unwrap();
        assert_eq!(json, "\"Walkable But Fragile\"");
        assert_eq!(WalkabilityGrade::StrongSuburban.to_string(), "Strong Suburban");
    }

    #[test]
    fn test_nodes_density_steps() {
        let mut state = ProjectState::default();
        state.num_nodes = 1;
        for i in 0..4 {
            state.tenants.push(Tenant::placeholder(format!("n{i}")));
        }
        // 8 tenants on one node
        assert_eq!(compute_walkability(&state).node_score, dec!(100));

        state.num_nodes = 2;
        // 4 per node is still top band
        assert_eq!(compute_walkability(&state).node_score, dec!(100));

        state.num_nodes = 3;
        // 2.67 per node
        assert_eq!(compute_walkability(&state).node_score, dec!(40));
    }

    #[test]
    fn test_score_walkability_warnings() {
        let mut state = ProjectState::default();
        state.num_nodes = 0;
        state.car_crossings_count = 10;
        let out = score_walkability(&state);

        assert!(out.warnings.iter().any(|w| w.contains("No activity nodes")));
        assert!(out.warnings.iter().any(|w| w.contains("car crossings")));
    }

    #[test]
    fn test_long_spine_not_compliant() {
        let mut state = ProjectState::default();
        state.ped_spine_length_ft = dec!(4000);
        let out = score_walkability(&state);

        assert!(!out.result.five_min_walk_compliant);
        assert!(out.warnings.iter().any(|w| w.contains("five-minute")));
    }
}
