//! Station price list import.
//!
//! Reads OPIS-style truck stop CSV exports. Rows are keyed by the OPIS id;
//! a repeated id keeps the first row. Malformed rows are logged and
//! skipped instead of failing the whole file. Coordinates are optional
//! columns since most price lists arrive without them.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::PlanError;
use crate::geo::Coordinate;
use crate::station::FuelStation;

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(rename = "OPIS Truckstop ID")]
    id: u64,
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Retail Price")]
    retail_price: String,
    #[serde(rename = "Latitude", default)]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<f64>,
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub stations: Vec<FuelStation>,
    /// Rows turned into stations.
    pub processed: usize,
    /// Duplicate or malformed rows.
    pub skipped: usize,
}

impl ImportSummary {
    /// Stations still lacking coordinates.
    pub fn missing_location(&self) -> usize {
        self.stations.iter().filter(|s| s.location.is_none()).count()
    }
}

impl TryFrom<StationRow> for FuelStation {
    type Error = String;

    fn try_from(row: StationRow) -> Result<Self, Self::Error> {
        let retail_price = Decimal::from_str(&row.retail_price)
            .map_err(|e| format!("bad price {:?}: {e}", row.retail_price))?;
        if retail_price.is_sign_negative() {
            return Err(format!("negative price {retail_price}"));
        }

        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => {
                let c = Coordinate::new(lat, lng);
                if !c.is_valid() {
                    return Err(format!("coordinate out of range ({lat}, {lng})"));
                }
                Some(c)
            }
            _ => None,
        };

        Ok(FuelStation {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state.to_uppercase(),
            location,
            retail_price,
        })
    }
}

/// Import stations from CSV text.
pub fn read_stations<R: Read>(reader: R) -> Result<ImportSummary, PlanError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut summary = ImportSummary::default();
    let mut seen = HashSet::new();

    for (i, record) in rdr.deserialize::<StationRow>().enumerate() {
        let line = i + 2;
        let row = match record {
            Ok(row) => row,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                warn!("Skipping row {line}: {e}");
                summary.skipped += 1;
                continue;
            }
        };

        if !seen.insert(row.id) {
            summary.skipped += 1;
            continue;
        }

        match FuelStation::try_from(row) {
            Ok(station) => {
                summary.stations.push(station);
                summary.processed += 1;
            }
            Err(e) => {
                warn!("Skipping row {line}: {e}");
                summary.skipped += 1;
            }
        }
    }

    info!(
        "Import complete. Processed: {} | Skipped: {} | Without location: {}",
        summary.processed,
        summary.skipped,
        summary.missing_location()
    );
    Ok(summary)
}

/// Import stations from a CSV file.
pub fn load_stations(path: impl AsRef<Path>) -> Result<ImportSummary, PlanError> {
    let file = std::fs::File::open(path)?;
    read_stations(std::io::BufReader::new(file))
}
