//! Greedy fuel stop selection.
//!
//! Walks the candidates in route order. From each position the vehicle
//! looks at every station it can reach on the fuel it has, prefers the
//! cheapest one inside the preferred window (60% to 90% of range ahead by
//! default), and otherwise takes the cheapest reachable one. Every stop
//! refills the tank completely.
//!
//! When nothing is reachable the selector forces a stop at the next
//! station ahead anyway. Such a rescue stop arrives with negative fuel and
//! makes the plan infeasible; the selection records this instead of
//! clamping it away.

use log::{debug, warn};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::candidates::CandidateStation;
use crate::config::OptimizerConfig;
use crate::error::InfeasibleReason;
use crate::geo::Coordinate;
use crate::station::FuelStation;

/// A planned refuelling stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStop {
    pub station: FuelStation,
    pub location: Coordinate,
    /// Miles from the route origin.
    pub distance_from_start: f64,
    /// Miles since the previous stop (or the origin).
    pub distance_from_previous: f64,
    /// Fuel left in the tank on arrival. Negative for an out-of-range rescue stop.
    pub fuel_at_arrival: f64,
    /// Units bought to refill the tank.
    pub fuel_purchased: f64,
    /// `retail_price * fuel_purchased`. Zero if the purchase could not be
    /// priced, in which case the selection is marked infeasible.
    pub cost: Decimal,
    /// True if the stop was forced because nothing was in range.
    pub forced: bool,
}

/// Output of a selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Stops in strictly increasing distance order.
    pub stops: Vec<FuelStop>,
    /// Set when the plan does not safely reach the destination.
    pub infeasible: Option<InfeasibleReason>,
    /// Furthest mile reachable by the plan.
    pub reached_miles: f64,
}

impl Selection {
    pub fn is_feasible(&self) -> bool {
        self.infeasible.is_none()
    }
}

/// Range-constrained stop picker.
#[derive(Debug, Clone)]
pub struct StopSelector {
    range: f64,
    mpg: f64,
    tank: f64,
    window_min: f64,
    window_max: f64,
}

impl StopSelector {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            range: config.vehicle.range_miles,
            mpg: config.vehicle.fuel_efficiency_mpg,
            tank: config.vehicle.tank_capacity(),
            window_min: config.window_min_fraction,
            window_max: config.window_max_fraction,
        }
    }

    /// Pick stops covering `total_distance` miles.
    ///
    /// Candidates may be given in any order; a stable sort by distance
    /// keeps the result deterministic for a given input order.
    pub fn select(&self, candidates: &[CandidateStation], total_distance: f64) -> Selection {
        let mut sorted: Vec<&CandidateStation> = candidates.iter().collect();
        sorted.sort_by(|a, b| a.distance_along_route.total_cmp(&b.distance_along_route));

        let mut stops = Vec::new();
        let mut infeasible = None;
        let mut position = 0.0;
        let mut fuel = self.tank;

        while position < total_distance {
            let max_reachable = position + fuel * self.mpg;
            if max_reachable >= total_distance {
                break;
            }

            // Candidates are sorted, so everything ahead starts at `ahead`
            // and everything reachable is a prefix of that.
            let ahead = sorted.partition_point(|c| c.distance_along_route <= position);
            let reach_end = sorted.partition_point(|c| c.distance_along_route <= max_reachable);
            let reachable = &sorted[ahead..reach_end.max(ahead)];

            let (chosen, forced) = if reachable.is_empty() {
                match sorted.get(ahead) {
                    Some(next) => {
                        warn!(
                            "Forced stop at mile {:.1}: nothing within range of mile {:.1}",
                            next.distance_along_route, position
                        );
                        (*next, true)
                    }
                    None => {
                        warn!("No stations ahead of mile {position:.1}; plan ends short of destination");
                        infeasible.get_or_insert(InfeasibleReason::Stranded { at_mile: position });
                        break;
                    }
                }
            } else {
                (self.pick_cheapest(reachable, position), false)
            };

            let distance_to_stop = chosen.distance_along_route - position;
            let fuel_used = distance_to_stop / self.mpg;
            let fuel_at_arrival = fuel - fuel_used;
            let fuel_purchased = self.tank - fuel_at_arrival;

            if fuel_at_arrival < 0.0 {
                infeasible.get_or_insert(InfeasibleReason::RescueOutOfRange {
                    at_mile: chosen.distance_along_route,
                    fuel_at_arrival,
                });
            }

            let cost = match price_fuel(chosen.station.retail_price, fuel_purchased) {
                Some(cost) => cost,
                None => {
                    warn!(
                        "Cannot price {} units at station {} (mile {:.1})",
                        fuel_purchased, chosen.station.id, chosen.distance_along_route
                    );
                    infeasible.get_or_insert(InfeasibleReason::Unpriced {
                        at_mile: chosen.distance_along_route,
                        fuel_purchased,
                    });
                    Decimal::ZERO
                }
            };

            let stop = FuelStop {
                station: chosen.station.clone(),
                location: chosen.location,
                distance_from_start: chosen.distance_along_route,
                distance_from_previous: distance_to_stop,
                fuel_at_arrival,
                fuel_purchased,
                cost,
                forced,
            };
            debug!(
                "Stop at mile {:.1} (station {}): {:.2} units for {}",
                stop.distance_from_start, stop.station.id, stop.fuel_purchased, stop.cost
            );
            stops.push(stop);

            position = chosen.distance_along_route;
            fuel = self.tank;
        }

        let reached_miles = (position + fuel * self.mpg).min(total_distance);
        Selection {
            stops,
            infeasible,
            reached_miles,
        }
    }

    /// Cheapest station in the preferred window, else cheapest reachable.
    /// Price ties go to the earliest station.
    fn pick_cheapest<'a>(&self, reachable: &[&'a CandidateStation], position: f64) -> &'a CandidateStation {
        let window_lo = position + self.window_min * self.range;
        let window_hi = position + self.window_max * self.range;

        let in_window = reachable
            .iter()
            .filter(|c| window_lo <= c.distance_along_route && c.distance_along_route <= window_hi);

        cheapest(in_window)
            .or_else(|| cheapest(reachable.iter()))
            .unwrap_or(reachable[0])
    }
}

/// First station with the lowest price in an iterator already ordered by distance.
fn cheapest<'a, 'b, I>(iter: I) -> Option<&'a CandidateStation>
where
    I: Iterator<Item = &'b &'a CandidateStation>,
    'a: 'b,
{
    iter.fold(None, |best: Option<&'a CandidateStation>, c| match best {
        Some(b) if b.station.retail_price <= c.station.retail_price => Some(b),
        _ => Some(*c),
    })
}

/// `price * volume` in exact decimal arithmetic, or None if the volume is
/// not finite or out of `Decimal` range.
fn price_fuel(price: Decimal, volume: f64) -> Option<Decimal> {
    price.checked_mul(Decimal::from_f64(volume)?)
}
