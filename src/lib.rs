pub mod android_jni;
pub mod bridge;
pub mod candidates;
pub mod config;
pub mod error;
pub mod geo;
pub mod gpx;
pub mod import;
pub mod optimizer;
pub mod projector;
pub mod provider;
pub mod route;
pub mod selector;
pub mod station;

pub use config::{OptimizerConfig, VehicleModel};
pub use error::{InfeasiblePlan, InfeasibleReason, PlanError};
pub use geo::{BoundingBox, Coordinate};
pub use optimizer::{OptimizationResult, RouteOptimizer};
pub use route::{Route, RouteSegment};
pub use selector::FuelStop;
pub use station::{FuelStation, StationInventory};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
