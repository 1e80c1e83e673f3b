/// Multi-year flood risk simulation.
///
/// The engine evolves the five latent factors year by year, applies the
/// cross-factor interaction rules, and scores each year either with a
/// trained environmental risk model or with the closed-form formula.
///
/// # State
/// The state holds the four environmental features after scaling and the
/// five factors divided by 10, so every factor lives on [0, 1] once drift
/// has been applied. Environmental features do not drift; only the factors
/// evolve.
///
/// # Yearly step
/// 1. Drift: climate, urbanization and deforestation grow (capped at 1);
///    drainage and dams decay at half rate (floored at 0). Climate change
///    accelerates after year 10 and urban growth slows above 0.7.
/// 2. Interactions: heavy deforestation feeds climate change; good drainage
///    dampens the effect of urbanization, poor drainage amplifies it.
/// 3. Risk on a 0–10 scale.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::logging::{self, Component};
use crate::model::{round2, Factor, FloodRiskError, Result, SimulationFeatures};
use crate::narrative;
use crate::noise::GaussianNoise;
use crate::risk_model::EnvironmentalRiskModel;
use crate::scaler::FeatureScaler;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Per-year drift for each factor, in `Factor::ALL` order.
pub const BASE_DRIFT: [f64; 5] = [0.03, 0.04, 0.015, 0.02, 0.01];

/// Climate change drifts faster once the year index exceeds this.
pub const CLIMATE_ACCELERATION_AFTER_YEAR: usize = 10;
pub const CLIMATE_ACCELERATION: f64 = 1.2;

/// Urban growth slows once urbanization exceeds this level.
pub const URBAN_SATURATION_LEVEL: f64 = 0.7;
pub const URBAN_SATURATION_DAMPING: f64 = 0.7;

/// Infrastructure decays at this fraction of its drift.
pub const INFRASTRUCTURE_DECAY_RATE: f64 = 0.5;

pub const DEFORESTATION_FEEDBACK_LEVEL: f64 = 0.6;
pub const DEFORESTATION_CLIMATE_FEEDBACK: f64 = 0.01;

pub const GOOD_DRAINAGE_LEVEL: f64 = 0.7;
pub const DRAINAGE_URBAN_RELIEF: f64 = 0.2;
pub const POOR_DRAINAGE_URBAN_AMPLIFIER: f64 = 1.2;

pub const MAX_RISK: f64 = 10.0;

// ---------------------------------------------------------------------------
// Trajectories
// ---------------------------------------------------------------------------

/// Yearly value of each factor on the 0–10 scale. Each series starts with
/// the input score and gains one entry per simulated year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectories {
    series: [Vec<f64>; 5],
}

impl Trajectories {
    /// Series in `Factor::ALL` order.
    pub fn from_series(series: [Vec<f64>; 5]) -> Self {
        Self { series }
    }

    pub fn get(&self, factor: Factor) -> &[f64] {
        &self.series[factor.index()]
    }

    fn push(&mut self, factor: Factor, value: f64) {
        self.series[factor.index()].push(value);
    }

    /// Last minus first value of a factor's series.
    pub fn net_change(&self, factor: Factor) -> f64 {
        let s = self.get(factor);
        match (s.first(), s.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Copy with every value rounded to two decimals.
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        for series in out.series.iter_mut() {
            series.iter_mut().for_each(|v| *v = round2(*v));
        }
        out
    }
}

impl Serialize for Trajectories {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for factor in Factor::ALL {
            map.serialize_entry(factor.name(), self.get(factor))?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Derived quantities produced by the interaction rules for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interactions {
    pub urban_impact: f64,
    pub dam_effectiveness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Scaled rainfall, water level, humidity, temperature.
    pub environment: [f64; 4],
    /// Factors in `Factor::ALL` order, nominally on [0, 1].
    pub factors: [f64; 5],
}

impl SimulationState {
    pub fn initial(features: &SimulationFeatures, scaler: &FeatureScaler) -> Self {
        let mut factors = features.factors.as_array();
        factors.iter_mut().for_each(|f| *f /= 10.0);
        Self {
            environment: scaler.transform(features.conditions.as_array()),
            factors,
        }
    }

    pub fn factor(&self, factor: Factor) -> f64 {
        self.factors[factor.index()]
    }

    fn factor_mut(&mut self, factor: Factor) -> &mut f64 {
        &mut self.factors[factor.index()]
    }

    /// Applies one year of drift. `year` is the zero-based year index.
    pub fn apply_drift(&mut self, year: usize) {
        for factor in Factor::ALL {
            let current = self.factor(factor);
            let mut modifier = 1.0;
            if factor == Factor::ClimateChange && year > CLIMATE_ACCELERATION_AFTER_YEAR {
                modifier = CLIMATE_ACCELERATION;
            }
            if factor == Factor::Urbanization && current > URBAN_SATURATION_LEVEL {
                modifier = URBAN_SATURATION_DAMPING;
            }
            let drift = BASE_DRIFT[factor.index()] * modifier;

            let value = self.factor_mut(factor);
            if factor.is_infrastructure() {
                *value = (*value - drift * INFRASTRUCTURE_DECAY_RATE).max(0.0);
            } else {
                *value = (*value + drift).min(1.0);
            }
        }
    }

    /// Applies the cross-factor rules and returns the derived quantities.
    pub fn apply_interactions(&mut self) -> Interactions {
        if self.factor(Factor::Deforestation) > DEFORESTATION_FEEDBACK_LEVEL {
            let climate = self.factor_mut(Factor::ClimateChange);
            *climate = (*climate + DEFORESTATION_CLIMATE_FEEDBACK).min(1.0);
        }

        let urban = self.factor(Factor::Urbanization);
        let urban_impact = if self.factor(Factor::DrainageSystems) > GOOD_DRAINAGE_LEVEL {
            (urban - DRAINAGE_URBAN_RELIEF).max(0.0)
        } else {
            urban * POOR_DRAINAGE_URBAN_AMPLIFIER
        };

        Interactions {
            urban_impact,
            dam_effectiveness: self.factor(Factor::DamsQuality),
        }
    }
}

// ---------------------------------------------------------------------------
// Closed-form risk
// ---------------------------------------------------------------------------

/// Closed-form yearly risk before noise and clamping.
///
/// Environmental terms dominate early in the horizon; the factor terms gain
/// weight linearly, from 0.2 at year 0 towards 0.5 at the final year.
pub fn formula_risk(state: &SimulationState, interactions: &Interactions, year: usize, years: usize) -> f64 {
    let [rain, water, humidity, temperature] = state.environment;

    let rain_impact = rain * 0.4;
    let water_impact = water * 0.3 * (1.0 - interactions.dam_effectiveness * 0.5);
    let humidity_temp = humidity * temperature * 0.3;
    let env_risk = rain_impact + water_impact + humidity_temp;

    let climate_impact = state.factor(Factor::ClimateChange) * 0.5
        + interactions.urban_impact * 0.3
        + state.factor(Factor::Deforestation) * 0.2;

    let env_weight = 0.8 - (year as f64 / years as f64) * 0.3;
    let climate_weight = 1.0 - env_weight;

    (env_risk * env_weight + climate_impact * climate_weight) * 10.0
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// One risk per simulated year, each in [0, 10].
    pub risks: Vec<f64>,
    pub narrative: String,
    pub trajectories: Trajectories,
}

pub struct SimulationEngine<'a> {
    scaler: &'a FeatureScaler,
    risk_model: Option<&'a dyn EnvironmentalRiskModel>,
    max_years: usize,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(
        scaler: &'a FeatureScaler,
        risk_model: Option<&'a dyn EnvironmentalRiskModel>,
        max_years: usize,
    ) -> Self {
        Self {
            scaler,
            risk_model,
            max_years,
        }
    }

    /// Rejects an empty or over-long horizon and non-finite inputs.
    pub fn validate(&self, features: &SimulationFeatures, years: usize) -> Result<()> {
        if years == 0 {
            return Err(FloodRiskError::InvalidInput(
                "simulation horizon must be at least 1 year".to_string(),
            ));
        }
        if years > self.max_years {
            return Err(FloodRiskError::InvalidInput(format!(
                "simulation horizon of {} years exceeds the maximum of {}",
                years, self.max_years
            )));
        }
        let values = features
            .conditions
            .as_array()
            .into_iter()
            .chain(features.factors.as_array());
        if values.into_iter().any(|v| !v.is_finite()) {
            return Err(FloodRiskError::InvalidInput(
                "simulation features must be finite numbers".to_string(),
            ));
        }
        Ok(())
    }

    fn yearly_risk(
        &self,
        state: &SimulationState,
        interactions: &Interactions,
        year: usize,
        years: usize,
        noise: &mut GaussianNoise,
    ) -> Result<f64> {
        match self.risk_model {
            Some(model) => {
                let original = self.scaler.inverse_transform(state.environment);
                Ok(model.predict_risk(original)?.clamp(0.0, MAX_RISK))
            }
            None => {
                let risk = formula_risk(state, interactions, year, years) + noise.sample();
                Ok(risk.clamp(0.0, MAX_RISK))
            }
        }
    }

    /// Runs the yearly loop and returns the risks and factor trajectories.
    pub fn simulate(
        &self,
        features: &SimulationFeatures,
        years: usize,
        noise: &mut GaussianNoise,
    ) -> Result<(Vec<f64>, Trajectories)> {
        self.validate(features, years)?;

        let mut state = SimulationState::initial(features, self.scaler);
        let mut trajectories = Trajectories::default();
        for factor in Factor::ALL {
            trajectories.push(factor, features.factors.get(factor));
        }

        let mut risks = Vec::with_capacity(years);
        for year in 0..years {
            state.apply_drift(year);
            let interactions = state.apply_interactions();
            risks.push(self.yearly_risk(&state, &interactions, year, years, noise)?);

            for factor in Factor::ALL {
                trajectories.push(factor, state.factor(factor) * 10.0);
            }
        }

        logging::debug(
            Component::Simulation,
            None,
            &format!(
                "Simulated {} years with {} risk",
                years,
                if self.risk_model.is_some() { "model" } else { "formula" }
            ),
        );
        Ok((risks, trajectories))
    }

    /// Simulates the horizon and narrates the resulting trajectory.
    pub fn simulate_and_narrate(
        &self,
        features: &SimulationFeatures,
        years: usize,
        noise: &mut GaussianNoise,
    ) -> Result<SimulationOutcome> {
        let (risks, trajectories) = self.simulate(features, years, noise)?;
        let narrative = narrative::narrate(&risks, &trajectories, years);
        Ok(SimulationOutcome {
            risks,
            narrative,
            trajectories,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
