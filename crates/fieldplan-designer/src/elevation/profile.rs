use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use fieldplan_core::units::{format_distance, format_elevation};
use fieldplan_core::{DataSource, ElevationStats, LatLng, ShapeId};

/// Elevation at a distance along the line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Meters from the first vertex.
    pub distance: f64,
    /// Meters above sea level.
    pub elevation: f64,
}

/// Snapshot of what a profile refresh has to fetch.
///
/// `generation` identifies the geometry the request was built from; a result
/// carrying an older generation than the shape's current one is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRequest {
    pub shape_id: ShapeId,
    pub generation: u64,
    pub total_length: f64,
    pub points: Vec<LatLng>,
    pub distances: Vec<f64>,
}

impl ProfileRequest {
    pub fn sample_count(&self) -> usize {
        self.points.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileResult {
    pub shape_id: ShapeId,
    pub generation: u64,
    pub samples: Vec<ElevationSample>,
    pub data_source: DataSource,
}

/// Min/max and cumulative gain/loss in one forward pass.
pub fn compute_stats(samples: &[ElevationSample]) -> Option<ElevationStats> {
    let first = samples.first()?;
    let mut stats = ElevationStats {
        min_elevation: first.elevation,
        max_elevation: first.elevation,
        elevation_gain: 0.0,
        elevation_loss: 0.0,
    };

    for pair in samples.windows(2) {
        let current = pair[1].elevation;
        let delta = current - pair[0].elevation;
        if delta > 0.0 {
            stats.elevation_gain += delta;
        } else {
            stats.elevation_loss -= delta;
        }
        stats.min_elevation = stats.min_elevation.min(current);
        stats.max_elevation = stats.max_elevation.max(current);
    }
    Some(stats)
}

/// Indices of the lowest and highest sample. Ties keep the first occurrence.
pub fn extreme_indices(samples: &[ElevationSample]) -> Option<(usize, usize)> {
    if samples.is_empty() {
        return None;
    }
    let (mut lowest, mut highest) = (0, 0);
    for (i, s) in samples.iter().enumerate().skip(1) {
        if s.elevation < samples[lowest].elevation {
            lowest = i;
        }
        if s.elevation > samples[highest].elevation {
            highest = i;
        }
    }
    Some((lowest, highest))
}

/// Deterministic stand-in profile: a 50 m sine swell around 100 m.
pub fn simulated_profile(distances: &[f64], total_length: f64) -> Vec<ElevationSample> {
    distances
        .iter()
        .map(|&distance| {
            let elevation = if total_length > 0.0 {
                100.0 + (distance / total_length * 2.0 * PI).sin() * 50.0
            } else {
                100.0
            };
            ElevationSample { distance, elevation }
        })
        .collect()
}

/// Label like `"1.23 km: 118 m"` for a chart tooltip.
pub fn format_sample_label(sample: &ElevationSample) -> String {
    format!(
        "{}: {}",
        format_distance(sample.distance),
        format_elevation(sample.elevation)
    )
}
