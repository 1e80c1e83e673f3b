/// Labelled scenario corpus used to train the scenario factor model.
///
/// Each entry pairs a short description of a catchment's trajectory with
/// expert scores (1–10) for the five factors. Labels are listed in
/// `Factor::SCENARIO_ORDER`: Urbanization, Deforestation, ClimateChange,
/// DrainageSystems, DamsQuality.

use crate::model::FactorScores;

/// A single labelled scenario.
pub struct LabelledScenario {
    pub text: &'static str,
    /// Scores in `Factor::SCENARIO_ORDER`.
    pub labels: [f64; 5],
}

impl LabelledScenario {
    pub fn scores(&self) -> FactorScores {
        FactorScores::from_scenario_order(self.labels)
    }
}

const fn scenario(text: &'static str, labels: [f64; 5]) -> LabelledScenario {
    LabelledScenario { text, labels }
}

pub static TRAINING_SCENARIOS: &[LabelledScenario] = &[
    scenario("Rapid urban sprawl and deforestation with failing drainage systems.", [9.0, 8.0, 6.0, 2.0, 4.0]),
    scenario("Rising sea levels and torrential rain from climate change.", [4.0, 3.0, 9.0, 3.0, 3.0]),
    scenario("Forest restoration and dam reinforcement in a temperate climate.", [2.0, 2.0, 4.0, 7.0, 9.0]),
    scenario("Extreme heat and drying wetlands with urban expansion and poor dams.", [7.0, 7.0, 9.0, 4.0, 2.0]),
    scenario("Excellent drainage and strong dam systems in low urban density areas.", [3.0, 3.0, 4.0, 9.0, 9.0]),
    scenario("Massive deforestation and heatwaves with weak infrastructure.", [6.0, 9.0, 8.0, 2.0, 3.0]),
    scenario("Reforestation efforts and green policies reduce climate impact.", [3.0, 2.0, 3.0, 8.0, 8.0]),
    scenario("Torrential rain due to warming oceans and blocked city drainage.", [6.0, 4.0, 9.0, 1.0, 4.0]),
    scenario("Urban development in floodplains with increased impervious surfaces.", [9.0, 5.0, 6.0, 3.0, 5.0]),
    scenario("Restoration of wetlands and natural water retention areas.", [4.0, 2.0, 5.0, 8.0, 7.0]),
    scenario("Aging dams and levees with deferred maintenance in areas with heavy rainfall.", [5.0, 4.0, 7.0, 5.0, 2.0]),
    scenario("Green infrastructure implementation with permeable surfaces in urban areas.", [6.0, 3.0, 5.0, 8.0, 6.0]),
    scenario("Coastal erosion with sea level rise and storm surges.", [5.0, 6.0, 9.0, 4.0, 3.0]),
    scenario("Mountain deforestation leading to increased runoff and soil erosion.", [6.0, 9.0, 7.0, 3.0, 4.0]),
    scenario("River basin management with integrated flood control measures.", [5.0, 4.0, 5.0, 8.0, 8.0]),
    scenario("Agricultural expansion with soil compaction and drainage modifications.", [7.0, 8.0, 6.0, 3.0, 4.0]),
    scenario("Dense urban centers with outdated stormwater systems.", [9.0, 4.0, 6.0, 2.0, 5.0]),
    scenario("Smart city development with rainfall capture and storage systems.", [8.0, 3.0, 5.0, 9.0, 7.0]),
    scenario("Severe drought followed by intense rainfall on dry soil.", [5.0, 6.0, 8.0, 4.0, 5.0]),
    scenario("Polar ice melting rapidly with stronger hurricanes.", [4.0, 5.0, 10.0, 3.0, 5.0]),
    scenario("Complete ecosystem restoration and nature-based solutions for flood management.", [2.0, 1.0, 3.0, 9.0, 8.0]),
    scenario("Catastrophic dam failure in area with extreme precipitation events.", [5.0, 6.0, 8.0, 5.0, 1.0]),
    scenario("Improved urban planning with flood-resilient building codes and zoning.", [6.0, 4.0, 5.0, 7.0, 7.0]),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
