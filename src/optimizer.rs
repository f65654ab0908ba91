//! Route optimization pipeline.
//!
//! Ties candidate search and stop selection together and aggregates the
//! trip totals. Each call works on its own copy of the candidate data, so
//! an optimizer can be shared between threads.

use std::time::{Duration, Instant};

use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::candidates::filter_candidates;
use crate::config::OptimizerConfig;
use crate::error::{InfeasiblePlan, PlanError};
use crate::geo::Coordinate;
use crate::provider::RouteProvider;
use crate::route::Route;
use crate::selector::{FuelStop, StopSelector};
use crate::station::StationInventory;

/// A complete fuel plan for one route.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub fuel_stops: Vec<FuelStop>,
    pub total_cost: Decimal,
    /// Fuel the whole trip burns, independent of what was bought.
    pub total_fuel_needed: f64,
    pub total_distance: f64,
    pub stop_count: usize,
    /// Wall-clock time spent optimizing. Diagnostic only.
    #[serde(serialize_with = "serialize_secs")]
    pub computation_time: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Plans fuel stops against a station inventory.
pub struct RouteOptimizer<'a, I: StationInventory + ?Sized> {
    inventory: &'a I,
    config: OptimizerConfig,
}

impl<'a, I: StationInventory + ?Sized> RouteOptimizer<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self {
            inventory,
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(inventory: &'a I, config: OptimizerConfig) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(Self { inventory, config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Plan the cheapest-looking sequence of stops along `route`.
    ///
    /// Fails with `NoCandidates` if no station lies in the corridor and with
    /// `Infeasible` (carrying the partial plan) if the stops cannot safely
    /// cover the route.
    pub fn optimize(&self, route: &Route) -> Result<OptimizationResult, PlanError> {
        let started = Instant::now();
        route.validate()?;

        let corridor = self.config.corridor_width_miles;
        let candidates = filter_candidates(route, self.inventory, corridor);
        if candidates.is_empty() {
            return Err(PlanError::NoCandidates {
                corridor_width_miles: corridor,
            });
        }

        let selection = StopSelector::new(&self.config).select(&candidates, route.distance);
        let total_cost: Decimal = selection.stops.iter().map(|s| s.cost).sum();

        if let Some(reason) = selection.infeasible {
            return Err(PlanError::Infeasible(Box::new(InfeasiblePlan {
                reason,
                stops: selection.stops,
                reached_miles: selection.reached_miles,
                total_distance: route.distance,
                total_cost,
            })));
        }

        let result = OptimizationResult {
            stop_count: selection.stops.len(),
            fuel_stops: selection.stops,
            total_cost,
            total_fuel_needed: route.distance / self.config.vehicle.fuel_efficiency_mpg,
            total_distance: route.distance,
            computation_time: started.elapsed(),
        };

        info!(
            "Planned {} stops over {:.1} miles, total cost {}",
            result.stop_count, result.total_distance, result.total_cost
        );
        Ok(result)
    }

    /// Fetch the route from `provider` and optimize it.
    ///
    /// Provider failures are reported as `InvalidRoute`.
    pub fn optimize_between<P>(&self, provider: &P, start: Coordinate, finish: Coordinate) -> Result<OptimizationResult, PlanError>
    where
        P: RouteProvider + ?Sized,
    {
        if start == finish {
            return Err(PlanError::InvalidRoute("start and finish must be different".into()));
        }

        let route = provider
            .route(start, finish)
            .map_err(|e| PlanError::InvalidRoute(e.to_string()))?;
        info!(
            "Route resolved: {:.1} miles, {} segments",
            route.distance,
            route.segments.len()
        );
        self.optimize(&route)
    }
}
