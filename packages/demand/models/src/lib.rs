#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature vector and historical sample types for demand prediction.
//!
//! This crate defines the named, ordered feature set shared by the
//! synthetic data generator, the model trainer, and the grid scorer. The
//! estimator only ever sees plain `f64` rows, so the ordering recorded at
//! training time is what gives each column its meaning. Every row handed to
//! the estimator is built through [`FeatureVector::project`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A named input column of the demand model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureName {
    /// Latitude (WGS84 degrees).
    Lat,
    /// Longitude (WGS84 degrees).
    Lon,
    /// Population density in persons per square kilometre.
    PopDensity,
    /// Whether an event or festival is taking place (0/1).
    HasEvent,
    /// Air temperature in degrees Celsius.
    Temp,
    /// Hour of day (0-23).
    Hour,
    /// Day of week (0-6).
    #[serde(rename = "dayofweek")]
    #[strum(serialize = "dayofweek")]
    DayOfWeek,
    /// Number of past donations at the location.
    PastDonations,
    /// Number of past pickups at the location.
    Pickups,
}

impl FeatureName {
    /// Canonical training order.
    pub const ALL: [Self; 9] = [
        Self::Lat,
        Self::Lon,
        Self::PopDensity,
        Self::HasEvent,
        Self::Temp,
        Self::Hour,
        Self::DayOfWeek,
        Self::PastDonations,
        Self::Pickups,
    ];
}

/// One point in feature space.
///
/// Fields are named rather than positional; use [`Self::project`] to turn
/// a vector into an estimator row in a specific column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Population density (persons/km²).
    pub pop_density: f64,
    /// Event flag, 0 or 1.
    pub has_event: u8,
    /// Temperature in Celsius.
    pub temp: f64,
    /// Hour of day.
    pub hour: u32,
    /// Day of week.
    pub dayofweek: u32,
    /// Past donation count.
    pub past_donations: u32,
    /// Pickup count.
    pub pickups: u32,
}

impl FeatureVector {
    /// Returns the value of a single named feature.
    #[must_use]
    pub fn get(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::Lat => self.lat,
            FeatureName::Lon => self.lon,
            FeatureName::PopDensity => self.pop_density,
            FeatureName::HasEvent => f64::from(self.has_event),
            FeatureName::Temp => self.temp,
            FeatureName::Hour => f64::from(self.hour),
            FeatureName::DayOfWeek => f64::from(self.dayofweek),
            FeatureName::PastDonations => f64::from(self.past_donations),
            FeatureName::Pickups => f64::from(self.pickups),
        }
    }

    /// Projects this vector onto `order`, producing one estimator row.
    #[must_use]
    pub fn project(&self, order: &[FeatureName]) -> Vec<f64> {
        order.iter().map(|name| self.get(*name)).collect()
    }
}

/// A labeled training example.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    /// Input features.
    pub features: FeatureVector,
    /// Observed demand (never negative).
    pub demand: f64,
}
