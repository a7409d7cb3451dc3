//! Weather snapshot value object
//!
//! A read-only projection of current conditions handed to prompt assembly.
//! The pipeline never fetches this itself; the hosting UI supplies it.

use serde::{Deserialize, Serialize};

/// Current conditions as known to the dashboard at send time
///
/// Every field is optional: the UI may not have geolocated the user yet, and
/// providers omit fields they cannot measure. Prompt assembly emits only the
/// fields that are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Free-text condition description, e.g. "Clear" or "Light rain"
    pub condition: Option<String>,
    /// Relative humidity in percent (0-100)
    pub humidity: Option<u8>,
    /// Wind speed in km/h
    pub wind_speed: Option<f64>,
    /// Precipitation in mm
    pub precipitation: Option<f64>,
    /// Display name of the location, e.g. "Jakarta"
    pub location: Option<String>,
}

impl WeatherSnapshot {
    /// True when no field carries data
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.condition.is_none()
            && self.humidity.is_none()
            && self.wind_speed.is_none()
            && self.precipitation.is_none()
            && self.location.is_none()
    }
}
