#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Seeded synthetic historical demand data.
//!
//! There is no real donation history to learn from yet, so the trainer
//! fits on a labeled dataset drawn from fixed parametric distributions
//! scattered around a geographic center. The same [`SyntheticConfig`]
//! always yields a bit-identical dataset.

use foodlink_demand_models::{FeatureVector, HistoricalSample};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{
    Bernoulli, BernoulliError, Distribution, Normal, NormalError, Poisson, PoissonError, Uniform,
    uniform::Error as UniformError,
};
use thiserror::Error;

/// Standard deviation of sampled latitudes around the center, in degrees.
pub const LAT_SPREAD_DEG: f64 = 2.5;

/// Standard deviation of sampled longitudes around the center, in degrees.
pub const LON_SPREAD_DEG: f64 = 3.0;

/// Probability that a sample falls on an event or festival day.
pub const EVENT_PROBABILITY: f64 = 0.07;

/// Errors that can occur while generating synthetic data.
#[derive(Debug, Error)]
pub enum SyntheticError {
    /// The configured center is not a finite coordinate.
    #[error("Invalid center ({lat}, {lon}): coordinates must be finite")]
    InvalidCenter {
        /// Center latitude.
        lat: f64,
        /// Center longitude.
        lon: f64,
    },

    /// A normal distribution could not be constructed.
    #[error("Normal distribution error: {0}")]
    Normal(#[from] NormalError),

    /// A uniform distribution could not be constructed.
    #[error("Uniform distribution error: {0}")]
    Uniform(#[from] UniformError),

    /// A Bernoulli distribution could not be constructed.
    #[error("Bernoulli distribution error: {0}")]
    Bernoulli(#[from] BernoulliError),

    /// A Poisson distribution could not be constructed.
    #[error("Poisson distribution error: {0}")]
    Poisson(#[from] PoissonError),
}

/// Parameters for one synthetic dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    /// Number of samples to produce.
    pub samples: usize,
    /// Latitude the samples are scattered around.
    pub center_lat: f64,
    /// Longitude the samples are scattered around.
    pub center_lon: f64,
    /// Seed for the pseudo-random sequence.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    /// 2500 samples around New Delhi.
    fn default() -> Self {
        Self {
            samples: 2500,
            center_lat: 28.6,
            center_lon: 77.2,
            seed: 42,
        }
    }
}

/// The fixed set of distributions every sample is drawn from.
struct Distributions {
    lat: Normal<f64>,
    lon: Normal<f64>,
    pop_density: Uniform<f64>,
    has_event: Bernoulli,
    temp: Uniform<f64>,
    hour: Uniform<u32>,
    dayofweek: Uniform<u32>,
    donation_rate: Normal<f64>,
    pickup_shortfall: Poisson<f64>,
    noise: Normal<f64>,
}

impl Distributions {
    fn new(center_lat: f64, center_lon: f64) -> Result<Self, SyntheticError> {
        Ok(Self {
            lat: Normal::new(center_lat, LAT_SPREAD_DEG)?,
            lon: Normal::new(center_lon, LON_SPREAD_DEG)?,
            pop_density: Uniform::new(100.0, 15_000.0)?,
            has_event: Bernoulli::new(EVENT_PROBABILITY)?,
            temp: Uniform::new(15.0, 40.0)?,
            hour: Uniform::new(6, 22)?,
            dayofweek: Uniform::new(0, 7)?,
            donation_rate: Normal::new(3.0, 1.5)?,
            pickup_shortfall: Poisson::new(1.0)?,
            noise: Normal::new(0.0, 3.0)?,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn sample(&self, rng: &mut StdRng) -> HistoricalSample {
        let lat = self.lat.sample(rng);
        let lon = self.lon.sample(rng);
        let pop_density = self.pop_density.sample(rng);
        let has_event = u8::from(self.has_event.sample(rng));
        let temp = self.temp.sample(rng);
        let hour = self.hour.sample(rng);
        let dayofweek = self.dayofweek.sample(rng);

        // Negative draws clamp to zero before the cast.
        let past_donations =
            (pop_density / 1000.0 * self.donation_rate.sample(rng)).round().max(0.0) as u32;
        let shortfall = self.pickup_shortfall.sample(rng) as u32;
        let pickups = past_donations.saturating_sub(shortfall);

        let demand = expected_demand(pop_density, has_event, temp) + self.noise.sample(rng);

        HistoricalSample {
            features: FeatureVector {
                lat,
                lon,
                pop_density,
                has_event,
                temp,
                hour,
                dayofweek,
                past_donations,
                pickups,
            },
            demand: demand.max(0.0),
        }
    }
}

/// Noise-free demand for the given context.
///
/// Density drives the base load, an event triples it, and demand rises as
/// the temperature drops below 40°C.
#[must_use]
pub fn expected_demand(pop_density: f64, has_event: u8, temp: f64) -> f64 {
    (pop_density / 1000.0) * 2.0f64.mul_add(f64::from(has_event), 1.0)
        + (20.0 - (temp - 20.0)) * 0.1
}

/// Generates `config.samples` labeled samples.
///
/// # Errors
///
/// Returns [`SyntheticError::InvalidCenter`] if the center is not finite,
/// or a distribution error if a distribution cannot be constructed.
pub fn generate(config: &SyntheticConfig) -> Result<Vec<HistoricalSample>, SyntheticError> {
    if !config.center_lat.is_finite() || !config.center_lon.is_finite() {
        return Err(SyntheticError::InvalidCenter {
            lat: config.center_lat,
            lon: config.center_lon,
        });
    }

    let distributions = Distributions::new(config.center_lat, config.center_lon)?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let samples: Vec<HistoricalSample> = (0..config.samples)
        .map(|_| distributions.sample(&mut rng))
        .collect();

    log::debug!(
        "Generated {} synthetic samples around ({}, {})",
        samples.len(),
        config.center_lat,
        config.center_lon
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SyntheticConfig {
        SyntheticConfig {
            samples: 500,
            ..SyntheticConfig::default()
        }
    }

    #[test]
    fn produces_requested_count() {
        assert_eq!(generate(&small_config()).unwrap().len(), 500);

        let empty = SyntheticConfig {
            samples: 0,
            ..SyntheticConfig::default()
        };
        assert!(generate(&empty).unwrap().is_empty());
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = generate(&small_config()).unwrap();
        let b = generate(&small_config()).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.demand.to_bits(), y.demand.to_bits());
            assert_eq!(x.features.lat.to_bits(), y.features.lat.to_bits());
            assert_eq!(x.features.lon.to_bits(), y.features.lon.to_bits());
            assert_eq!(
                x.features.pop_density.to_bits(),
                y.features.pop_density.to_bits()
            );
            assert_eq!(x.features.temp.to_bits(), y.features.temp.to_bits());
            assert_eq!(x.features.has_event, y.features.has_event);
            assert_eq!(x.features.hour, y.features.hour);
            assert_eq!(x.features.dayofweek, y.features.dayofweek);
            assert_eq!(x.features.past_donations, y.features.past_donations);
            assert_eq!(x.features.pickups, y.features.pickups);
        }
    }

    #[test]
    fn different_seed_changes_dataset() {
        let a = generate(&small_config()).unwrap();
        let b = generate(&SyntheticConfig {
            seed: 7,
            ..small_config()
        })
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn counts_and_demand_are_never_negative_and_pickups_bounded() {
        for sample in generate(&SyntheticConfig::default()).unwrap() {
            assert!(sample.demand >= 0.0, "negative demand {}", sample.demand);
            assert!(
                sample.features.pickups <= sample.features.past_donations,
                "pickups {} exceed donations {}",
                sample.features.pickups,
                sample.features.past_donations
            );
        }
    }

    #[test]
    fn fields_stay_within_their_ranges() {
        let samples = generate(&SyntheticConfig::default()).unwrap();
        let mut events = 0usize;
        for s in &samples {
            let f = &s.features;
            assert!((100.0..15_000.0).contains(&f.pop_density));
            assert!((15.0..40.0).contains(&f.temp));
            assert!((6..22).contains(&f.hour));
            assert!(f.dayofweek < 7);
            assert!(f.has_event <= 1);
            events += usize::from(f.has_event);
        }
        // 7% of 2500 is 175; allow generous slack.
        assert!((75..300).contains(&events), "unexpected event count {events}");
    }

    #[test]
    fn samples_cluster_around_center() {
        let samples = generate(&SyntheticConfig::default()).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let n = samples.len() as f64;
        let mean_lat = samples.iter().map(|s| s.features.lat).sum::<f64>() / n;
        let mean_lon = samples.iter().map(|s| s.features.lon).sum::<f64>() / n;
        assert!((mean_lat - 28.6).abs() < 0.5, "mean lat {mean_lat}");
        assert!((mean_lon - 77.2).abs() < 0.5, "mean lon {mean_lon}");
    }

    #[test]
    fn rejects_non_finite_center() {
        let config = SyntheticConfig {
            center_lat: f64::NAN,
            ..SyntheticConfig::default()
        };
        assert!(matches!(
            generate(&config),
            Err(SyntheticError::InvalidCenter { .. })
        ));
    }

    #[test]
    fn expected_demand_matches_formula() {
        let base = expected_demand(2000.0, 0, 20.0);
        assert!((base - 4.0).abs() < 1e-12);
        let event = expected_demand(2000.0, 1, 30.0);
        assert!((event - 7.0).abs() < 1e-12);
    }
}
