use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
///
/// Particle velocities reuse this type: a velocity is a per-iteration shift in
/// degrees along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    pub demand: f64,
    pub location: Coordinate,
}

impl Customer {
    pub fn new(id: impl Into<String>, demand: f64, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            demand,
            location: Coordinate::new(lat, lon),
        }
    }
}

/// Axis-aligned lat/lon box that every facility coordinate is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Bounds {
    /// Extent of the customer coordinates. An empty slice yields NaN bounds.
    pub fn from_customers(customers: &[Customer]) -> Self {
        let (min_lat, max_lat) = axis_extent(customers.iter().map(|c| c.location.lat));
        let (min_lon, max_lon) = axis_extent(customers.iter().map(|c| c.location.lon));
        Self {
            min: Coordinate::new(min_lat, min_lon),
            max: Coordinate::new(max_lat, max_lon),
        }
    }

    /// Component-wise clamp. Unlike `f64::clamp` this never panics on NaN bounds.
    pub fn clamp(&self, point: Coordinate) -> Coordinate {
        Coordinate {
            lat: point.lat.max(self.min.lat).min(self.max.lat),
            lon: point.lon.max(self.min.lon).min(self.max.lon),
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min.lat..=self.max.lat).contains(&point.lat)
            && (self.min.lon..=self.max.lon).contains(&point.lon)
    }
}

fn axis_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    match values.minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => (f64::NAN, f64::NAN),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    }
}

/// Facility index per customer, parallel to the customer slice. `None` means
/// no facility had room left.
pub type Assignment = Vec<Option<usize>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub best_score: f64,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Vec<Customer> {
        vec![
            Customer::new("C1", 10.0, 40.5, -74.2),
            Customer::new("C2", 20.0, 41.0, -73.5),
            Customer::new("C3", 5.0, 40.0, -75.0),
        ]
    }

    #[test]
    fn bounds_cover_customer_extent() {
        let bounds = Bounds::from_customers(&customers());
        assert_eq!(bounds.min, Coordinate::new(40.0, -75.0));
        assert_eq!(bounds.max, Coordinate::new(41.0, -73.5));
    }

    #[test]
    fn clamp_pulls_points_back_inside() {
        let bounds = Bounds::from_customers(&customers());
        let clamped = bounds.clamp(Coordinate::new(45.0, -80.0));
        assert_eq!(clamped, Coordinate::new(41.0, -75.0));
        assert!(bounds.contains(&clamped));

        let inside = Coordinate::new(40.7, -74.0);
        assert_eq!(bounds.clamp(inside), inside);
    }

    #[test]
    fn single_customer_gives_degenerate_box() {
        let bounds = Bounds::from_customers(&customers()[..1]);
        assert_eq!(bounds.min, bounds.max);
        assert_eq!(
            bounds.clamp(Coordinate::new(0.0, 0.0)),
            Coordinate::new(40.5, -74.2)
        );
    }

    #[test]
    fn empty_customers_give_nan_bounds() {
        let bounds = Bounds::from_customers(&[]);
        assert!(bounds.min.lat.is_nan());
        assert!(bounds.max.lon.is_nan());
        // f64::max/min ignore a NaN operand, so the point passes through.
        assert_eq!(
            bounds.clamp(Coordinate::new(1.0, 2.0)),
            Coordinate::new(1.0, 2.0)
        );
    }
}
