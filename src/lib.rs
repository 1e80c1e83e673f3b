//! Flood risk estimation and long-term scenario simulation.
//!
//! Two operations are exposed through [`service::FloodRiskService`]:
//! an instant risk assessment from current environmental conditions, and a
//! multi-year simulation whose latent factors can be scored from a free-text
//! scenario description.

pub mod api;
pub mod assessment;
pub mod config;
pub mod importance;
pub mod logging;
pub mod model;
pub mod narrative;
pub mod noise;
pub mod regressor;
pub mod risk_model;
pub mod scaler;
pub mod scenario;
pub mod service;
pub mod simulation;
