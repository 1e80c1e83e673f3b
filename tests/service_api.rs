//! Service Contract Integration Tests
//!
//! These tests drive the service the way a client would: JSON request in,
//! JSON response out. They check the response shapes for the predict and
//! simulate operations on both the scenario and fallback paths.

use floodrisk_service::api::{PredictRequest, SimulateRequest};
use floodrisk_service::config::ServiceConfig;
use floodrisk_service::model::{FactorScores, Result};
use floodrisk_service::scenario::FactorPredictor;
use floodrisk_service::service::FloodRiskService;
use serde_json::Value;

fn quiet_config() -> ServiceConfig {
    ServiceConfig::from_toml(
        r#"
        [simulation]
        noise_std = 0.0

        [assessment]
        noise_std = 0.0

        [scenario_model]
        enabled = false
        "#,
    )
    .unwrap()
}

struct StormyScenario;

impl FactorPredictor for StormyScenario {
    fn predict_factors(&self, _text: &str) -> Result<FactorScores> {
        Ok(FactorScores::from_scenario_order([8.5, 6.0, 9.0, 2.5, 4.0]))
    }
}

fn simulate_json(service: &FloodRiskService, body: &str) -> Value {
    let request: SimulateRequest = serde_json::from_str(body).unwrap();
    serde_json::to_value(service.simulate(&request).unwrap()).unwrap()
}

#[test]
fn test_predict_response_shape() {
    let service = FloodRiskService::new(quiet_config());
    let request: PredictRequest =
        serde_json::from_str(r#"{"rainfall": "20", "waterLevel": 1, "humidity": 30, "temperature": 5}"#).unwrap();
    let json = serde_json::to_value(service.predict(&request)).unwrap();

    assert_eq!(json["level"], "low");
    assert_eq!(json["message"], "Low flood risk. Normal precautions advised.");
    for key in ["rainfall", "waterLevel", "humidity", "temperature"] {
        assert!(json["factorScores"][key].is_number(), "missing factor score {}", key);
    }
    let total: f64 = ["rainfall", "waterLevel", "humidity", "temperature"]
        .iter()
        .map(|k| json["factorScores"][k].as_f64().unwrap())
        .sum();
    assert!((total - 100.0).abs() < 1e-6, "contributions sum to {}", total);
}

#[test]
fn test_fallback_simulation_response_shape() {
    let service = FloodRiskService::new(quiet_config());
    let json = simulate_json(&service, r#"{"years": 12}"#);

    assert_eq!(json["risks"].as_array().unwrap().len(), 12);
    assert_eq!(json["years"][0], 0);
    assert_eq!(json["years"][11], 11);
    assert_eq!(json["features"].as_object().unwrap().len(), 9);
    assert_eq!(json["features"]["DamsQuality"], 5.0);
    assert!(json.get("scenario_factors").is_none());
    assert_eq!(json["feature_importance"], serde_json::json!({}));

    let trajectories = json["feature_trajectories"].as_object().unwrap();
    assert_eq!(trajectories.len(), 5);
    for (name, series) in trajectories {
        assert_eq!(series.as_array().unwrap().len(), 13, "{} trajectory length", name);
    }
    assert!(json["narrative"].as_str().unwrap().starts_with("Over 12 years, flood risk is"));
}

#[test]
fn test_scenario_simulation_response_shape() {
    let service = FloodRiskService::new(quiet_config()).with_scenario_model(Box::new(StormyScenario));
    let json = simulate_json(
        &service,
        r#"{"rainfall": 120, "waterLevel": "4.5", "scenario": "Rapid sprawl with failing levees", "years": "8"}"#,
    );

    assert_eq!(json["features"].as_object().unwrap().len(), 4);
    assert_eq!(json["features"]["WaterLevel"], 4.5);
    assert_eq!(json["scenario_factors"]["Urbanization"], 8.5);
    assert_eq!(json["scenario_factors"]["DrainageSystems"], 2.5);
    assert_eq!(json["feature_trajectories"]["ClimateChange"][0], 9.0);
    let narrative = json["narrative"].as_str().unwrap();
    assert!(narrative.contains("High-impact factors: Urbanization, ClimateChange."));
    assert!(narrative.contains("Low-impact factors: DrainageSystems."));
}

#[test]
fn test_risks_and_trajectories_are_rounded() {
    let service = FloodRiskService::new(quiet_config());
    let json = simulate_json(&service, r#"{"years": 30}"#);
    let values = json["risks"]
        .as_array()
        .unwrap()
        .iter()
        .chain(json["feature_trajectories"]["Deforestation"].as_array().unwrap());
    for v in values {
        let v = v.as_f64().unwrap();
        assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6, "{} is not rounded to 2 decimals", v);
    }
}

#[test]
fn test_zero_year_request_is_an_error() {
    let service = FloodRiskService::new(quiet_config());
    let request: SimulateRequest = serde_json::from_str(r#"{"years": 0}"#).unwrap();
    assert!(service.simulate(&request).is_err());
}
