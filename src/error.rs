//! Error types for fuel planning.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::selector::FuelStop;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("no fuel stations found within {corridor_width_miles} miles of the route")]
    NoCandidates { corridor_width_miles: f64 },

    #[error("infeasible plan: {}", .0.reason)]
    Infeasible(Box<InfeasiblePlan>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("route unavailable: {0}")]
    RouteUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GPX parse error: {0}")]
    Gpx(String),
}

/// Why a plan could not cover the whole route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// A forced stop beyond the vehicle's reach; fuel at arrival is negative.
    RescueOutOfRange { at_mile: f64, fuel_at_arrival: f64 },
    /// No station exists ahead of this position and the destination is out of range.
    Stranded { at_mile: f64 },
    /// The purchase at this stop cannot be expressed as a decimal cost.
    Unpriced { at_mile: f64, fuel_purchased: f64 },
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::RescueOutOfRange { at_mile, fuel_at_arrival } => write!(
                f,
                "forced stop at mile {at_mile:.1} arrives with {fuel_at_arrival:.2} units of fuel"
            ),
            InfeasibleReason::Stranded { at_mile } => {
                write!(f, "no station ahead of mile {at_mile:.1}")
            }
            InfeasibleReason::Unpriced { at_mile, fuel_purchased } => {
                write!(f, "cannot price {fuel_purchased} units bought at mile {at_mile:.1}")
            }
        }
    }
}

/// The partial plan produced when the route cannot be covered.
#[derive(Debug, Clone, Serialize)]
pub struct InfeasiblePlan {
    /// First condition that made the plan infeasible.
    pub reason: InfeasibleReason,
    /// Every stop the selector emitted, including forced ones.
    pub stops: Vec<FuelStop>,
    /// Furthest mile the partial plan can reach.
    pub reached_miles: f64,
    pub total_distance: f64,
    pub total_cost: Decimal,
}
