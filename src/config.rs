//! Vehicle model and optimizer settings.
//!
//! All values have defaults matching a long-haul truck (500 mile range,
//! 10 mpg) and a 75 mile search corridor. Settings can be loaded from JSON;
//! missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PlanError;

/// Fixed vehicle parameters used by the stop selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleModel {
    /// Distance covered on a full tank, in miles.
    pub range_miles: f64,
    /// Miles per unit of fuel.
    pub fuel_efficiency_mpg: f64,
}

impl VehicleModel {
    /// Tank size in fuel units.
    pub fn tank_capacity(&self) -> f64 {
        self.range_miles / self.fuel_efficiency_mpg
    }
}

impl Default for VehicleModel {
    fn default() -> Self {
        Self {
            range_miles: 500.0,
            fuel_efficiency_mpg: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Maximum distance from the route for a station to be a candidate.
    pub corridor_width_miles: f64,
    pub vehicle: VehicleModel,
    /// Start of the preferred stop window, as a fraction of vehicle range.
    pub window_min_fraction: f64,
    /// End of the preferred stop window, as a fraction of vehicle range.
    pub window_max_fraction: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            corridor_width_miles: 75.0,
            vehicle: VehicleModel::default(),
            window_min_fraction: 0.6,
            window_max_fraction: 0.9,
        }
    }
}

impl OptimizerConfig {
    /// Parse settings from a JSON string and validate them.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_corridor_width(mut self, miles: f64) -> Self {
        self.corridor_width_miles = miles;
        self
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PlanError::InvalidConfig(format!("{name} must be positive, got {v}")))
            }
        };

        positive("corridor_width_miles", self.corridor_width_miles)?;
        positive("vehicle.range_miles", self.vehicle.range_miles)?;
        positive("vehicle.fuel_efficiency_mpg", self.vehicle.fuel_efficiency_mpg)?;

        let (lo, hi) = (self.window_min_fraction, self.window_max_fraction);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(PlanError::InvalidConfig(format!(
                "stop window must satisfy 0 <= min <= max <= 1, got [{lo}, {hi}]"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tank_capacity() {
        assert_eq!(VehicleModel::default().tank_capacity(), 50.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(OptimizerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = OptimizerConfig::from_json(r#"{"corridor_width_miles": 25}"#).unwrap();
        assert_eq!(config.corridor_width_miles, 25.0);
        assert_eq!(config.vehicle, VehicleModel::default());
        assert_eq!(config.window_min_fraction, 0.6);
    }

    #[test]
    fn nested_vehicle_override() {
        let config =
            OptimizerConfig::from_json(r#"{"vehicle": {"fuel_efficiency_mpg": 6.5}}"#).unwrap();
        assert_eq!(config.vehicle.range_miles, 500.0);
        assert_eq!(config.vehicle.fuel_efficiency_mpg, 6.5);
    }

    #[test]
    fn rejects_non_positive_corridor() {
        let err = OptimizerConfig::default().with_corridor_width(0.0).validate();
        assert!(matches!(err, Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_window() {
        let result =
            OptimizerConfig::from_json(r#"{"window_min_fraction": 0.9, "window_max_fraction": 0.6}"#);
        assert!(matches!(result, Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(OptimizerConfig::from_json("{"), Err(PlanError::Json(_))));
    }
}
