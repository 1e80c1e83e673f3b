/// Rule-based narration of simulated risk trajectories.
///
/// A narrative is built from fixed sentence templates:
///   1. overall trend with start and end risk
///   2. the factor with the largest net change
///   3. whether change is accelerating or slowing (horizons over 5 years)
///   4. the risk band of the final year
///
/// The service layer appends scenario or model details afterwards with
/// `enrich_with_scenario` / `enrich_without_scenario`.

use crate::importance::FeatureImportance;
use crate::model::{Factor, FactorScores};
use crate::simulation::Trajectories;

/// Factor scores at or above this are reported as high impact.
pub const HIGH_IMPACT_SCORE: f64 = 7.0;
/// Factor scores at or below this are reported as low impact.
pub const LOW_IMPACT_SCORE: f64 = 3.0;

const PATTERN_MIN_POINTS: usize = 5;
const PATTERN_RATIO: f64 = 1.5;

// ---------------------------------------------------------------------------
// Trend classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    IncreasingRapidly,
    ModeratelyIncreasing,
    SlightlyIncreasing,
    Stable,
    SlightlyDecreasing,
    Decreasing,
}

impl Trend {
    /// Classifies the net change between the first and last yearly risk.
    pub fn classify(change: f64) -> Trend {
        if change > 5.0 {
            Trend::IncreasingRapidly
        } else if change > 2.0 {
            Trend::ModeratelyIncreasing
        } else if change > 0.5 {
            Trend::SlightlyIncreasing
        } else if change.abs() <= 0.5 {
            Trend::Stable
        } else if change > -2.0 {
            Trend::SlightlyDecreasing
        } else {
            Trend::Decreasing
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Trend::IncreasingRapidly => "increasing rapidly",
            Trend::ModeratelyIncreasing => "moderately increasing",
            Trend::SlightlyIncreasing => "slightly increasing",
            Trend::Stable => "relatively stable",
            Trend::SlightlyDecreasing => "slightly decreasing",
            Trend::Decreasing => "decreasing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Accelerating,
    Slowing,
    Steady,
}

/// Compares the change over the first half of the horizon with the second.
/// Returns `None` for horizons of 5 years or fewer.
pub fn classify_pattern(risks: &[f64]) -> Option<Pattern> {
    if risks.len() <= PATTERN_MIN_POINTS {
        return None;
    }
    let mid = risks.len() / 2;
    let first_half = risks[mid] - risks[0];
    let second_half = risks[risks.len() - 1] - risks[mid];

    if second_half.abs() > first_half.abs() * PATTERN_RATIO {
        Some(Pattern::Accelerating)
    } else if first_half.abs() > second_half.abs() * PATTERN_RATIO {
        Some(Pattern::Slowing)
    } else {
        Some(Pattern::Steady)
    }
}

/// The factor with the largest absolute net change. Ties keep
/// `Factor::ALL` order.
pub fn dominant_driver(trajectories: &Trajectories) -> Option<(Factor, f64)> {
    let mut changes: Vec<(Factor, f64)> = Factor::ALL
        .into_iter()
        .filter(|f| !trajectories.get(*f).is_empty())
        .map(|f| (f, trajectories.net_change(f)))
        .collect();
    changes.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    changes.into_iter().next()
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

/// Narrates a simulated horizon. Returns an empty string when `risks` is
/// empty.
pub fn narrate(risks: &[f64], trajectories: &Trajectories, years: usize) -> String {
    let (Some(&start), Some(&end)) = (risks.first(), risks.last()) else {
        return String::new();
    };
    let trend = Trend::classify(end - start);

    let mut narrative = format!(
        "Over {} years, flood risk is {}, from {:.2} to {:.2} on a 10-point scale.",
        years,
        trend.phrase(),
        start,
        end
    );

    if let Some((factor, change)) = dominant_driver(trajectories) {
        let direction = if change > 0.0 { "increase" } else { "decrease" };
        narrative.push_str(&format!(
            " The most significant driver is a {:.1}-point {} in {}.",
            change.abs(),
            direction,
            factor.display_phrase()
        ));
    }

    match classify_pattern(risks) {
        Some(Pattern::Accelerating) => {
            narrative.push_str(" The rate of change is accelerating in later years.")
        }
        Some(Pattern::Slowing) => narrative.push_str(" The rate of change is slowing in later years."),
        _ => {}
    }

    if end >= 7.0 {
        narrative.push_str(
            " This scenario indicates a high-risk situation requiring significant preventive measures.",
        );
    } else if end >= 4.0 {
        narrative.push_str(" This represents a moderate risk level that should be monitored closely.");
    } else {
        narrative.push_str(" This suggests a manageable risk level with proper planning.");
    }

    narrative
}

/// Percentage as a decimal with at least one fractional digit, e.g. `40.0`
/// or `12.34`.
fn percent(value: f64) -> String {
    format!("{:?}", value)
}

/// Appends scenario details: the model importance sentence (when a risk
/// model exists) and the high- and low-impact factor lists.
pub fn enrich_with_scenario(
    narrative: &str,
    scores: &FactorScores,
    importance: Option<&FeatureImportance>,
) -> String {
    let mut detailed = format!("{}\n\n", narrative);

    if let Some(report) = importance {
        detailed.push_str(&format!(
            "Based on our trained model, environmental factors account for {}% of flood risk, \
             with Rainfall having {}% importance and Water Level at {}% importance.\n\n",
            percent(report.environmental.value),
            percent(report.rainfall_pct()),
            percent(report.water_level_pct())
        ));
    }

    let high: Vec<&str> = scores
        .scenario_ordered()
        .filter(|(_, v)| *v >= HIGH_IMPACT_SCORE)
        .map(|(f, _)| f.name())
        .collect();
    let low: Vec<&str> = scores
        .scenario_ordered()
        .filter(|(_, v)| *v <= LOW_IMPACT_SCORE)
        .map(|(f, _)| f.name())
        .collect();

    if !high.is_empty() {
        detailed.push_str(&format!("High-impact factors: {}. ", high.join(", ")));
    }
    if !low.is_empty() {
        detailed.push_str(&format!("Low-impact factors: {}. ", low.join(", ")));
    }
    detailed
}

/// Appends the model importance sentence used when no scenario was scored.
pub fn enrich_without_scenario(narrative: &str, importance: Option<&FeatureImportance>) -> String {
    match importance {
        Some(report) => format!(
            "{}\n\nModel analysis shows Rainfall ({}%) and Water Level ({}%) are the most \
             critical environmental factors for flood risk.",
            narrative,
            percent(report.rainfall_pct()),
            percent(report.water_level_pct())
        ),
        None => narrative.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FactorScores;

    /// Each factor moves linearly from `start` by `delta` over `years`.
    fn linear_trajectories(start: [f64; 5], delta: [f64; 5], years: usize) -> Trajectories {
        let series = std::array::from_fn(|i| {
            (0..=years)
                .map(|y| start[i] + delta[i] * y as f64 / years as f64)
                .collect()
        });
        Trajectories::from_series(series)
    }

    #[test]
    fn test_trend_boundaries() {
        assert_eq!(Trend::classify(5.1), Trend::IncreasingRapidly);
        assert_eq!(Trend::classify(5.0), Trend::ModeratelyIncreasing);
        assert_eq!(Trend::classify(2.0), Trend::SlightlyIncreasing);
        assert_eq!(Trend::classify(0.5), Trend::Stable);
        assert_eq!(Trend::classify(-0.5), Trend::Stable);
        assert_eq!(Trend::classify(-0.6), Trend::SlightlyDecreasing);
        assert_eq!(Trend::classify(-2.0), Trend::Decreasing);
    }

    #[test]
    fn test_pattern_requires_more_than_five_points() {
        assert_eq!(classify_pattern(&[1.0, 2.0, 3.0, 4.0, 9.0]), None);
    }

    #[test]
    fn test_pattern_detects_acceleration_and_slowing() {
        let accelerating = [1.0, 1.1, 1.2, 1.3, 3.0, 6.0];
        assert_eq!(classify_pattern(&accelerating), Some(Pattern::Accelerating));
        let slowing = [1.0, 4.0, 6.0, 6.1, 6.2, 6.3];
        assert_eq!(classify_pattern(&slowing), Some(Pattern::Slowing));
        let steady = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(classify_pattern(&steady), Some(Pattern::Steady));
    }

    #[test]
    fn test_dominant_driver_prefers_largest_absolute_change() {
        let t = linear_trajectories([5.0; 5], [1.0, 0.5, 0.2, -2.0, -0.1], 10);
        let (factor, change) = dominant_driver(&t).unwrap();
        assert_eq!(factor, Factor::DrainageSystems);
        assert!((change + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_driver_ties_keep_simulation_order() {
        let t = linear_trajectories([5.0; 5], [1.0, -1.0, 0.0, 0.0, 0.0], 4);
        assert_eq!(dominant_driver(&t).unwrap().0, Factor::ClimateChange);
    }

    #[test]
    fn test_full_narrative_for_rising_high_risk() {
        let risks = [2.0, 2.5, 3.0, 3.5, 4.0, 6.0, 8.0, 9.0];
        let t = linear_trajectories([5.0; 5], [3.2, 1.0, 0.5, -0.8, -0.4], 8);
        let text = narrate(&risks, &t, 8);
        assert_eq!(
            text,
            "Over 8 years, flood risk is increasing rapidly, from 2.00 to 9.00 on a 10-point scale. \
             The most significant driver is a 3.2-point increase in climate change impacts. \
             The rate of change is accelerating in later years. \
             This scenario indicates a high-risk situation requiring significant preventive measures."
        );
    }

    #[test]
    fn test_short_stable_narrative_omits_pattern() {
        let risks = [3.0, 3.1, 3.2];
        let t = linear_trajectories([5.0; 5], [0.0, 0.0, 0.0, -0.3, 0.0], 3);
        let text = narrate(&risks, &t, 3);
        assert!(text.contains("relatively stable, from 3.00 to 3.20"));
        assert!(text.contains("0.3-point decrease in drainage infrastructure"));
        assert!(!text.contains("rate of change"));
        assert!(text.ends_with("manageable risk level with proper planning."));
    }

    #[test]
    fn test_moderate_band() {
        let risks = [5.0, 5.0];
        let t = linear_trajectories([5.0; 5], [0.0; 5], 2);
        assert!(narrate(&risks, &t, 2).ends_with("should be monitored closely."));
    }

    #[test]
    fn test_empty_risks_give_empty_narrative() {
        assert_eq!(narrate(&[], &Trajectories::default(), 0), "");
    }

    #[test]
    fn test_scenario_enrichment_lists_high_and_low_factors_in_scenario_order() {
        let scores = FactorScores::from_scenario_order([9.0, 8.0, 6.0, 2.0, 4.0]);
        let text = enrich_with_scenario("Base.", &scores, None);
        assert_eq!(
            text,
            "Base.\n\nHigh-impact factors: Urbanization, Deforestation. Low-impact factors: DrainageSystems. "
        );
    }

    #[test]
    fn test_scenario_enrichment_with_importance_sentence() {
        let scores = FactorScores::neutral();
        let report = FeatureImportance::from_model([0.5, 0.25, 0.125, 0.125], None);
        let text = enrich_with_scenario("Base.", &scores, Some(&report));
        assert!(text.contains(
            "environmental factors account for 100.0% of flood risk, with Rainfall having 50.0% importance \
             and Water Level at 25.0% importance."
        ));
        assert!(!text.contains("High-impact"));
    }

    #[test]
    fn test_fallback_enrichment_only_with_model() {
        assert_eq!(enrich_without_scenario("Base.", None), "Base.");
        let report = FeatureImportance::from_model([0.5, 0.25, 0.125, 0.125], None);
        assert!(enrich_without_scenario("Base.", Some(&report))
            .ends_with("Rainfall (50.0%) and Water Level (25.0%) are the most critical environmental factors for flood risk."));
    }

    #[test]
    fn test_percentages_keep_a_fractional_digit() {
        assert_eq!(percent(40.0), "40.0");
        assert_eq!(percent(100.0), "100.0");
        assert_eq!(percent(33.33), "33.33");
        let report = FeatureImportance::from_model([0.4, 0.3, 0.2, 0.1], None);
        assert!(enrich_without_scenario("Base.", Some(&report)).contains("Rainfall (40.0%) and Water Level (30.0%)"));
    }
}
