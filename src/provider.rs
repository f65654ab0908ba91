//! Route providers.
//!
//! The optimizer never computes routes itself; it asks a `RouteProvider`.
//! Memoisation lives here too, as a decorator around any provider, so the
//! optimization core stays free of shared state.

use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cached::{Cached, TimedSizedCache};
use log::{debug, info};

use crate::error::PlanError;
use crate::geo::{haversine_miles, Coordinate};
use crate::gpx;
use crate::route::Route;

/// Default route cache lifetime.
pub const DEFAULT_ROUTE_TTL: Duration = Duration::from_secs(3600);
/// Default maximum number of cached routes.
pub const DEFAULT_ROUTE_CAPACITY: usize = 256;

/// Supplies a driving route between two points.
pub trait RouteProvider {
    fn route(&self, start: Coordinate, finish: Coordinate) -> Result<Route, PlanError>;
}

/// Cache key: the exact bit patterns of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey([u64; 4]);

impl RouteKey {
    pub fn new(start: Coordinate, finish: Coordinate) -> Self {
        Self([
            start.lat.to_bits(),
            start.lng.to_bits(),
            finish.lat.to_bits(),
            finish.lng.to_bits(),
        ])
    }
}

/// Storage for memoised routes.
pub trait RouteCache {
    fn get(&self, key: &RouteKey) -> Option<Route>;
    fn put(&self, key: RouteKey, route: Route);
}

/// In-process cache with a fixed entry lifetime and a bounded size.
///
/// Expired entries are flushed on every insert and the least recently used
/// entry is dropped once the cache is full, so memory stays bounded in a
/// long-lived process.
pub struct MemoryRouteCache {
    entries: Mutex<TimedSizedCache<RouteKey, Route>>,
}

impl MemoryRouteCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(DEFAULT_ROUTE_CAPACITY, ttl)
    }

    /// `capacity` is raised to 1 if zero.
    pub fn with_capacity(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(TimedSizedCache::with_size_and_lifespan(capacity.max(1), ttl.as_secs())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimedSizedCache<RouteKey, Route>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().cache_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRouteCache {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_TTL)
    }
}

impl RouteCache for MemoryRouteCache {
    fn get(&self, key: &RouteKey) -> Option<Route> {
        self.lock().cache_get(key).cloned()
    }

    fn put(&self, key: RouteKey, route: Route) {
        let mut entries = self.lock();
        entries.flush();
        entries.cache_set(key, route);
    }
}

/// Serves repeated requests from a cache before asking the inner provider.
/// Failures are not cached.
pub struct CachedRouteProvider<P, C = MemoryRouteCache> {
    inner: P,
    cache: C,
}

impl<P: RouteProvider> CachedRouteProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_cache(inner, MemoryRouteCache::default())
    }
}

impl<P: RouteProvider, C: RouteCache> CachedRouteProvider<P, C> {
    pub fn with_cache(inner: P, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<P: RouteProvider, C: RouteCache> RouteProvider for CachedRouteProvider<P, C> {
    fn route(&self, start: Coordinate, finish: Coordinate) -> Result<Route, PlanError> {
        let key = RouteKey::new(start, finish);
        if let Some(route) = self.cache.get(&key) {
            debug!("Route cache hit for {start:?} -> {finish:?}");
            return Ok(route);
        }

        let route = self.inner.route(start, finish)?;
        self.cache.put(key, route.clone());
        Ok(route)
    }
}

/// Serves routes recorded in GPX files.
///
/// A stored route matches a request when its first point is within the
/// match tolerance of `start` and its last point within it of `finish`.
#[derive(Debug, Clone)]
pub struct GpxRouteProvider {
    routes: Vec<Route>,
    tolerance_miles: f64,
}

impl GpxRouteProvider {
    pub const DEFAULT_TOLERANCE_MILES: f64 = 5.0;

    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            tolerance_miles: Self::DEFAULT_TOLERANCE_MILES,
        }
    }

    pub fn with_tolerance(mut self, miles: f64) -> Self {
        self.tolerance_miles = miles;
        self
    }

    /// Load every track and route with at least two points.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PlanError> {
        let routes: Vec<Route> = gpx::parse(reader)?.iter().filter_map(|p| p.to_route()).collect();
        info!("Loaded {} GPX routes", routes.len());
        Ok(Self::new(routes))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteProvider for GpxRouteProvider {
    fn route(&self, start: Coordinate, finish: Coordinate) -> Result<Route, PlanError> {
        let within = |a: Option<Coordinate>, b: &Coordinate| {
            a.is_some_and(|a| haversine_miles(&a, b) <= self.tolerance_miles)
        };

        self.routes
            .iter()
            .find(|r| within(r.origin(), &start) && within(r.destination(), &finish))
            .cloned()
            .ok_or_else(|| {
                PlanError::RouteUnavailable(format!(
                    "no recorded route from ({:.4}, {:.4}) to ({:.4}, {:.4})",
                    start.lat, start.lng, finish.lat, finish.lng
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pt(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl RouteProvider for CountingProvider {
        fn route(&self, start: Coordinate, finish: Coordinate) -> Result<Route, PlanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if start.lat > 80.0 {
                return Err(PlanError::RouteUnavailable("no roads".into()));
            }
            Ok(Route::from_points(&[start, finish]).unwrap())
        }
    }

    fn counting() -> CountingProvider {
        CountingProvider {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn cache_serves_repeat_requests() {
        let provider = CachedRouteProvider::new(counting());
        let a = provider.route(pt(0.0, 0.0), pt(0.0, 1.0)).unwrap();
        let b = provider.route(pt(0.0, 0.0), pt(0.0, 1.0)).unwrap();

        assert_eq!(a, b);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cache().len(), 1);
    }

    #[test]
    fn cache_distinguishes_direction() {
        let provider = CachedRouteProvider::new(counting());
        provider.route(pt(0.0, 0.0), pt(0.0, 1.0)).unwrap();
        provider.route(pt(0.0, 1.0), pt(0.0, 0.0)).unwrap();
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let provider = CachedRouteProvider::new(counting());
        assert!(provider.route(pt(85.0, 0.0), pt(0.0, 1.0)).is_err());
        assert!(provider.route(pt(85.0, 0.0), pt(0.0, 1.0)).is_err());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert!(provider.cache().is_empty());
    }

    #[test]
    fn expired_entries_are_refetched() {
        let provider = CachedRouteProvider::with_cache(counting(), MemoryRouteCache::new(Duration::ZERO));
        provider.route(pt(0.0, 0.0), pt(0.0, 1.0)).unwrap();
        provider.route(pt(0.0, 0.0), pt(0.0, 1.0)).unwrap();
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = MemoryRouteCache::new(Duration::ZERO);
        let route = Route::from_points(&[pt(0.0, 0.0), pt(0.0, 1.0)]).unwrap();
        for i in 0..1000 {
            cache.put(RouteKey::new(pt(0.0, 0.0), pt(0.0, i as f64 * 0.001)), route.clone());
        }
        assert!(cache.len() <= 1, "expired entries kept: {}", cache.len());
    }

    #[test]
    fn cache_size_is_bounded() {
        let cache = MemoryRouteCache::with_capacity(16, DEFAULT_ROUTE_TTL);
        let route = Route::from_points(&[pt(0.0, 0.0), pt(0.0, 1.0)]).unwrap();
        for i in 0..1000 {
            cache.put(RouteKey::new(pt(0.0, 0.0), pt(0.0, i as f64 * 0.001)), route.clone());
        }
        assert_eq!(cache.len(), 16);

        let newest = RouteKey::new(pt(0.0, 0.0), pt(0.0, 999.0 * 0.001));
        let oldest = RouteKey::new(pt(0.0, 0.0), pt(0.0, 0.0));
        assert!(cache.get(&newest).is_some());
        assert!(cache.get(&oldest).is_none());
    }

    #[test]
    fn gpx_provider_matches_endpoints() {
        let route = Route::from_points(&[pt(41.0, -96.0), pt(41.0, -97.0), pt(41.0, -98.0)]).unwrap();
        let provider = GpxRouteProvider::new(vec![route.clone()]);

        let found = provider.route(pt(41.01, -96.0), pt(41.0, -98.02)).unwrap();
        assert_eq!(found, route);

        let miss = provider.route(pt(41.0, -98.0), pt(41.0, -96.0));
        assert!(matches!(miss, Err(PlanError::RouteUnavailable(_))));
    }

    #[test]
    fn gpx_provider_tolerance() {
        let route = Route::from_points(&[pt(41.0, -96.0), pt(41.0, -98.0)]).unwrap();
        let provider = GpxRouteProvider::new(vec![route]).with_tolerance(50.0);
        assert!(provider.route(pt(41.5, -96.0), pt(41.0, -98.0)).is_ok());
    }

    #[test]
    fn gpx_provider_from_reader_skips_short_paths() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="41.0" lon="-96.0"></trkpt>
    <trkpt lat="41.0" lon="-97.0"></trkpt>
  </trkseg></trk>
  <rte><rtept lat="40.0" lon="-100.0"></rtept></rte>
</gpx>"#;
        let provider = GpxRouteProvider::from_reader(gpx.as_bytes()).unwrap();
        assert_eq!(provider.len(), 1);
    }
}
