//! Map region framing.
//!
//! Pure viewport math: given the points we know about (current position,
//! last saved position, home), produce a center plus zoom deltas framing all
//! of them. Recomputed on every input change; nothing is memoized.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate as the backend stores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Which slot a persisted point fills. The backend keeps only the most
/// recent point per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoRole {
    Current,
    Saved,
    Home,
}

impl GeoRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Saved => "saved",
            Self::Home => "home",
        }
    }
}

/// Map viewport: center plus per-axis zoom deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Default center when no point is known.
pub const FALLBACK_CENTER: GeoPoint = GeoPoint {
    latitude: 20.5937,
    longitude: 78.9629,
};
/// Wide delta paired with the fallback center.
pub const FALLBACK_DELTA: f64 = 40.0;
/// Tight zoom around a single known point.
pub const SINGLE_POINT_DELTA: f64 = 0.05;
/// Floor for computed deltas so coincident points never collapse the view.
pub const MIN_DELTA: f64 = 0.01;
/// Padding factor applied to the bounding span.
pub const SPAN_FACTOR: f64 = 1.5;

impl MapRegion {
    /// Frame a set of points:
    /// - none: the fixed fallback region,
    /// - one: centered on it with the tight delta,
    /// - two or more: midpoint of the min/max bounds, deltas 1.5x the span
    ///   per axis, floored at `MIN_DELTA`.
    #[must_use]
    pub fn framing(points: &[GeoPoint]) -> Self {
        match points {
            [] => Self {
                center: FALLBACK_CENTER,
                latitude_delta: FALLBACK_DELTA,
                longitude_delta: FALLBACK_DELTA,
            },
            [point] => Self {
                center: *point,
                latitude_delta: SINGLE_POINT_DELTA,
                longitude_delta: SINGLE_POINT_DELTA,
            },
            _ => {
                let mut min_lat = f64::INFINITY;
                let mut max_lat = f64::NEG_INFINITY;
                let mut min_lon = f64::INFINITY;
                let mut max_lon = f64::NEG_INFINITY;
                for point in points {
                    min_lat = min_lat.min(point.latitude);
                    max_lat = max_lat.max(point.latitude);
                    min_lon = min_lon.min(point.longitude);
                    max_lon = max_lon.max(point.longitude);
                }
                Self {
                    center: GeoPoint {
                        latitude: (min_lat + max_lat) / 2.0,
                        longitude: (min_lon + max_lon) / 2.0,
                    },
                    latitude_delta: (SPAN_FACTOR * (max_lat - min_lat)).max(MIN_DELTA),
                    longitude_delta: (SPAN_FACTOR * (max_lon - min_lon)).max(MIN_DELTA),
                }
            }
        }
    }
}

/// The named points a locations screen knows about. `current` and `saved`
/// are mutually substitutable; current wins when both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownPoints {
    #[serde(default)]
    pub current: Option<GeoPoint>,
    #[serde(default)]
    pub saved: Option<GeoPoint>,
    #[serde(default)]
    pub home: Option<GeoPoint>,
}

impl KnownPoints {
    /// The points that participate in framing, after role substitution.
    #[must_use]
    pub fn effective(&self) -> Vec<GeoPoint> {
        [self.current.or(self.saved), self.home]
            .into_iter()
            .flatten()
            .collect()
    }

    #[must_use]
    pub fn region(&self) -> MapRegion {
        MapRegion::framing(&self.effective())
    }
}
