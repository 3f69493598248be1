//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Vehicles accumulate odometer
//! distance tick by tick over long runs, so the extra precision keeps the
//! summed haversine legs from drifting.

/// Mean Earth radius, kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    ///
    /// ```text
    /// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
    /// d = 2R·atan2(√a, √(1−a))
    /// ```
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Haversine distance in metres.
    #[inline]
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        self.distance_km(other) * 1_000.0
    }

    /// Initial great-circle bearing from `self` to `other`, radians clockwise
    /// from north.
    pub fn bearing_to(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x)
    }

    /// The point reached by travelling `distance_km` from `self` along
    /// `bearing` (radians clockwise from north) on a great circle.
    pub fn destination(self, bearing: f64, distance_km: f64) -> GeoPoint {
        let delta = distance_km / EARTH_RADIUS_KM;
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), normalize_lon(lon2.to_degrees()))
    }

    /// Move up to `distance_km` toward `target`; never overshoots.
    pub fn step_toward(self, target: GeoPoint, distance_km: f64) -> GeoPoint {
        let remaining = self.distance_km(target);
        if distance_km <= 0.0 {
            return self;
        }
        if distance_km >= remaining {
            return target;
        }
        self.destination(self.bearing_to(target), distance_km)
    }

    /// Shift by a local offset in metres (north, east).  Uses the
    /// equirectangular approximation, which is exact enough for the few
    /// metres of GPS jitter it is used for.
    pub fn offset_m(self, north_m: f64, east_m: f64) -> GeoPoint {
        let d_lat = north_m / (EARTH_RADIUS_KM * 1_000.0);
        let d_lon = east_m / (EARTH_RADIUS_KM * 1_000.0 * self.lat.to_radians().cos());
        GeoPoint::new(self.lat + d_lat.to_degrees(), self.lon + d_lon.to_degrees())
    }

    /// Approximate bounding-box check.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lon - center.lon).abs() <= half_deg
    }
}

fn normalize_lon(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
