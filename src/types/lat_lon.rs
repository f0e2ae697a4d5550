use serde::{Deserialize, Serialize};

/// A geographical coordinate: latitude first, longitude second, both in decimal degrees.
///
/// # Examples
///
/// ```
/// use weather_enrich::LatLon;
///
/// let ljubljana = LatLon(46.0569, 14.5058);
/// assert_eq!(ljubljana.0, 46.0569); // Latitude
/// assert_eq!(ljubljana.1, 14.5058); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);
