/// Structured logging for the flood risk estimator
///
/// Provides context-rich logging tagged with the emitting component and an
/// optional context identifier (a scenario snippet, an operation name).
/// Events go through `tracing`; `init_logger` installs a `tracing-subscriber`
/// writing to stderr and, optionally, appending to a log file.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::{Mutex, Once};

use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

use crate::model::FloodRiskError;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV_VAR: &str = "FLOODRISK_LOG";

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Scenario,
    RiskModel,
    Simulation,
    Assessment,
    Service,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Scenario => write!(f, "SCENARIO"),
            Component::RiskModel => write!(f, "RISK"),
            Component::Simulation => write!(f, "SIM"),
            Component::Assessment => write!(f, "ASSESS"),
            Component::Service => write!(f, "SVC"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the caller sent something out of range
    Expected,
    /// Unexpected failure - indicates a model or configuration defect
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

static INIT: Once = Once::new();

/// Initialize the global logger.
///
/// `FLOODRISK_LOG` takes precedence over `min_level` when set. When
/// `log_file` is given, every event is also appended there without ANSI
/// colouring. Only the first call has any effect.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(min_level.filter_directive()));

        let console = tracing_fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        let console = if console_timestamps {
            console.boxed()
        } else {
            console.without_time().boxed()
        };

        let file_layer = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(
                    tracing_fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false),
                ),
                Err(e) => {
                    eprintln!("Failed to open log file {}: {}", path, e);
                    None
                }
            }
        });

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(file_layer)
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

fn context_or_dash(context: Option<&str>) -> &str {
    context.unwrap_or("-")
}

/// Log a general informational message
pub fn info(component: Component, context: Option<&str>, message: &str) {
    tracing::info!(component = %component, context = context_or_dash(context), "{}", message);
}

/// Log a warning message
pub fn warn(component: Component, context: Option<&str>, message: &str) {
    tracing::warn!(component = %component, context = context_or_dash(context), "{}", message);
}

/// Log an error message
pub fn error(component: Component, context: Option<&str>, message: &str) {
    tracing::error!(component = %component, context = context_or_dash(context), "{}", message);
}

/// Log a debug message
pub fn debug(component: Component, context: Option<&str>, message: &str) {
    tracing::debug!(component = %component, context = context_or_dash(context), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a failure by the kind of error raised.
pub fn classify_failure(err: &FloodRiskError) -> FailureType {
    match err {
        // Bad request values are the caller's problem, not ours
        FloodRiskError::InvalidInput(_) => FailureType::Expected,
        FloodRiskError::Training(_) | FloodRiskError::Config(_) => FailureType::Unexpected,
        FloodRiskError::Json(_) => FailureType::Expected,
        FloodRiskError::Prediction(_) | FloodRiskError::Io(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a failed operation with automatic classification.
///
/// Returns the classification so callers can decide whether to fall back.
pub fn log_failure(
    component: Component,
    context: Option<&str>,
    operation: &str,
    err: &FloodRiskError,
) -> FailureType {
    let failure_type = classify_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(component, context, &message),
        FailureType::Unexpected => error(component, context, &message),
        FailureType::Unknown => warn(component, context, &message),
    }
    failure_type
}

// ---------------------------------------------------------------------------
// Training Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a model training run.
pub fn log_training_summary(component: Component, samples: usize, outputs: usize, mean_mse: Option<f64>) {
    let message = match mean_mse {
        Some(mse) => format!(
            "Training complete: {} samples, {} output(s), mean CV MSE {:.4}",
            samples, outputs, mse
        ),
        None => format!("Training complete: {} samples, {} output(s)", samples, outputs),
    };

    if samples == 0 {
        error(component, None, &message);
    } else {
        info(component, None, &message);
    }
}
