use tracing::{debug, info, warn};

use fieldplan_core::{DataSource, ElevationError, LatLng};
use fieldplan_settings::ElevationSettings;

use super::profile::{simulated_profile, ElevationSample, ProfileRequest, ProfileResult};
use super::service::{ElevatedPoint, ElevationService};
use crate::model::Polyline;

/// Degrees of slack allowed between a requested point and the returned one.
const LOCATION_TOLERANCE_DEG: f64 = 1e-3;

/// Sampling and retry policy for elevation profiles.
#[derive(Debug, Clone, Default)]
pub struct ElevationSampler {
    settings: ElevationSettings,
}

impl ElevationSampler {
    pub fn new(settings: ElevationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ElevationSettings {
        &self.settings
    }

    /// `ceil(length / spacing)` clamped to the configured sample range.
    pub fn optimal_sample_count(&self, length_m: f64) -> usize {
        let spacing = self.settings.sample_spacing_m.max(f64::EPSILON);
        let wanted = if length_m.is_finite() && length_m > 0.0 {
            (length_m / spacing).ceil() as usize
        } else {
            0
        };
        // Unvalidated settings may carry min > max; the upper bound wins
        wanted.max(self.settings.min_samples).min(self.settings.max_samples)
    }

    /// Equally spaced sample points from the first to the last vertex.
    pub fn sample_positions(&self, line: &Polyline) -> (Vec<LatLng>, Vec<f64>) {
        let length = line.length();
        let count = self.optimal_sample_count(length);
        let distances: Vec<f64> = if count < 2 {
            vec![0.0; count]
        } else {
            (0..count)
                .map(|i| length * i as f64 / (count - 1) as f64)
                .collect()
        };
        let points = distances.iter().map(|&d| line.point_at_distance(d)).collect();
        (points, distances)
    }

    /// Resolves a profile request.
    ///
    /// Makes one attempt plus `max_retries` retries, sleeping `retry_delay`
    /// between attempts. Once every attempt failed the result falls back to
    /// [`simulated_profile`] with the same sample count.
    pub async fn fetch_profile(&self, request: &ProfileRequest, service: &dyn ElevationService) -> ProfileResult {
        let attempts = self.settings.max_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let response = service
                .fetch_elevations(&request.points)
                .await
                .and_then(|points| validate_response(&request.points, &points));

            match response {
                Ok(elevations) => {
                    debug!(
                        "Elevation profile for {} resolved on attempt {}",
                        request.shape_id, attempt
                    );
                    let samples = request
                        .distances
                        .iter()
                        .zip(elevations)
                        .map(|(&distance, elevation)| ElevationSample { distance, elevation })
                        .collect();
                    return ProfileResult {
                        shape_id: request.shape_id,
                        generation: request.generation,
                        samples,
                        data_source: DataSource::Api,
                    };
                }
                Err(e) => {
                    warn!(
                        "Elevation attempt {}/{} for {} failed: {}",
                        attempt, attempts, request.shape_id, e
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.settings.retry_delay()).await;
                    }
                }
            }
        }

        info!(
            "Elevation service unavailable, using simulated profile for {}",
            request.shape_id
        );
        ProfileResult {
            shape_id: request.shape_id,
            generation: request.generation,
            samples: simulated_profile(&request.distances, request.total_length),
            data_source: DataSource::Simulation,
        }
    }
}

/// Accepts a response only when every point is present, finite, and in place.
pub fn validate_response(requested: &[LatLng], response: &[ElevatedPoint]) -> Result<Vec<f64>, ElevationError> {
    if requested.len() != response.len() {
        return Err(ElevationError::CountMismatch {
            expected: requested.len(),
            actual: response.len(),
        });
    }

    requested
        .iter()
        .zip(response)
        .enumerate()
        .map(|(index, (asked, got))| {
            if !got.elevation.is_finite() {
                return Err(ElevationError::InvalidElevation { index });
            }
            let off = (asked.lat - got.location.lat)
                .abs()
                .max((asked.lng - got.location.lng).abs());
            if !(off <= LOCATION_TOLERANCE_DEG) {
                return Err(ElevationError::LocationMismatch { index });
            }
            Ok(got.elevation)
        })
        .collect()
}
