//! Fuel station records and inventory lookup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBox, Coordinate};

/// Default page size for station listings.
const DEFAULT_LIMIT: usize = 100;
/// Hard cap on station listings.
const MAX_LIMIT: usize = 500;

/// A truck stop with its current retail fuel price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStation {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    /// Unset until the station has been geocoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    /// Price per unit of fuel.
    pub retail_price: Decimal,
}

/// Read-only source of stations, queried by bounding box.
///
/// Implementations must only return stations that have a location inside
/// the box. Order is unspecified.
pub trait StationInventory {
    fn stations_in(&self, bbox: &BoundingBox) -> Vec<FuelStation>;
}

impl StationInventory for [FuelStation] {
    fn stations_in(&self, bbox: &BoundingBox) -> Vec<FuelStation> {
        self.iter()
            .filter(|s| s.location.is_some_and(|loc| bbox.contains(&loc)))
            .cloned()
            .collect()
    }
}

impl StationInventory for Vec<FuelStation> {
    fn stations_in(&self, bbox: &BoundingBox) -> Vec<FuelStation> {
        self.as_slice().stations_in(bbox)
    }
}

/// Filters for listing stations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationQuery {
    /// Two-letter state code, case insensitive.
    pub state: Option<String>,
    /// Case-insensitive substring of the city name.
    pub city: Option<String>,
    pub max_price: Option<Decimal>,
    pub limit: Option<usize>,
}

/// Stations held in memory, e.g. after a CSV import.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    stations: Vec<FuelStation>,
}

impl InMemoryInventory {
    pub fn new(stations: Vec<FuelStation>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Number of stations with a known location.
    pub fn located_count(&self) -> usize {
        self.stations.iter().filter(|s| s.location.is_some()).count()
    }

    pub fn stations(&self) -> &[FuelStation] {
        &self.stations
    }

    /// List stations ordered by price, cheapest first.
    pub fn list(&self, query: &StationQuery) -> Vec<&FuelStation> {
        let state = query.state.as_deref().map(str::to_uppercase);
        let city = query.city.as_deref().map(str::to_lowercase);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

        let mut matches: Vec<&FuelStation> = self
            .stations
            .iter()
            .filter(|s| state.as_ref().is_none_or(|st| &s.state == st))
            .filter(|s| city.as_ref().is_none_or(|c| s.city.to_lowercase().contains(c.as_str())))
            .filter(|s| query.max_price.is_none_or(|max| s.retail_price <= max))
            .collect();

        matches.sort_by(|a, b| a.retail_price.cmp(&b.retail_price));
        matches.truncate(limit);
        matches
    }
}

impl StationInventory for InMemoryInventory {
    fn stations_in(&self, bbox: &BoundingBox) -> Vec<FuelStation> {
        self.stations.stations_in(bbox)
    }
}
