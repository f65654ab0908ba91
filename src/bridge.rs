//! JSON facade over the optimizer.
//!
//! Used by the JNI layer and by any other frontend that prefers to pass
//! strings. A request carries the route, the station snapshot and optional
//! settings; the response is either a plan or a structured error.

use serde::{Deserialize, Serialize};

use crate::config::OptimizerConfig;
use crate::error::{InfeasiblePlan, PlanError};
use crate::optimizer::{OptimizationResult, RouteOptimizer};
use crate::route::Route;
use crate::station::FuelStation;

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub route: Route,
    pub stations: Vec<FuelStation>,
    #[serde(default)]
    pub config: OptimizerConfig,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptimizeResponse {
    Ok {
        #[serde(flatten)]
        result: OptimizationResult,
    },
    Infeasible {
        #[serde(flatten)]
        plan: InfeasiblePlan,
    },
    Error {
        kind: &'static str,
        message: String,
    },
}

impl From<Result<OptimizationResult, PlanError>> for OptimizeResponse {
    fn from(outcome: Result<OptimizationResult, PlanError>) -> Self {
        match outcome {
            Ok(result) => OptimizeResponse::Ok { result },
            Err(PlanError::Infeasible(plan)) => OptimizeResponse::Infeasible { plan: *plan },
            Err(e) => OptimizeResponse::Error {
                kind: error_kind(&e),
                message: e.to_string(),
            },
        }
    }
}

fn error_kind(e: &PlanError) -> &'static str {
    match e {
        PlanError::InvalidRoute(_) => "invalid_route",
        PlanError::NoCandidates { .. } => "no_candidates",
        PlanError::Infeasible(_) => "infeasible",
        PlanError::InvalidConfig(_) => "invalid_config",
        PlanError::RouteUnavailable(_) => "route_unavailable",
        PlanError::Json(_) => "invalid_request",
        PlanError::Io(_) | PlanError::Csv(_) | PlanError::Gpx(_) => "input",
    }
}

/// Run one optimization request.
pub fn optimize(request: &OptimizeRequest) -> Result<OptimizationResult, PlanError> {
    RouteOptimizer::with_config(request.stations.as_slice(), request.config)?.optimize(&request.route)
}

/// Decode a JSON request, optimize, and encode the response.
///
/// Every failure, including malformed input, is reported inside the
/// returned JSON; the outer error only covers serializing the response.
pub fn optimize_json(request: &str) -> Result<String, PlanError> {
    let outcome = serde_json::from_str::<OptimizeRequest>(request)
        .map_err(PlanError::from)
        .and_then(|req| optimize(&req));

    let response = OptimizeResponse::from(outcome);
    Ok(serde_json::to_string(&response)?)
}
