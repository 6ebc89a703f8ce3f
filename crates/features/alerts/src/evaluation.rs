use crate::model::{Alert, Location, Reading};

/// Mean Earth radius (IUGG), kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points.
#[must_use]
pub fn haversine_km(a: Location, b: Location) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Active alerts whose threshold the reading meets and whose location is within `radius_km`.
pub fn triggered(alerts: Vec<Alert>, reading: &Reading, radius_km: f64) -> Vec<Alert> {
    alerts
        .into_iter()
        .filter(|alert| alert.is_active && alert.threshold <= reading.aqhi)
        .filter(|alert| haversine_km(alert.location, reading.location) <= radius_km)
        .collect()
}
