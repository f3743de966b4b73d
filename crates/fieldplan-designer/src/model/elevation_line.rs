use serde::{Deserialize, Serialize};

use fieldplan_core::{
    DataSource, ElevationProperties, ElevationStats, GeometryError, LatLng, ShapeId, ShapeKind,
};

use super::polyline::Polyline;
use crate::elevation::{compute_stats, extreme_indices, ElevationSampler, ElevationSample, ProfileRequest, ProfileResult};

/// Polyline carrying a sampled elevation profile.
///
/// The vertex count is fixed at construction. Each geometry change bumps
/// `generation`, which is how results of in-flight profile requests are
/// recognised as stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationPolyline {
    line: Polyline,
    samples: Vec<ElevationSample>,
    data_source: DataSource,
    #[serde(skip)]
    generation: u64,
    stats: Option<ElevationStats>,
}

impl ElevationPolyline {
    pub fn new(points: Vec<LatLng>) -> Result<Self, GeometryError> {
        Ok(Self::from_line(Polyline::new(points)?))
    }

    pub fn from_line(line: Polyline) -> Self {
        Self {
            line,
            samples: Vec::new(),
            data_source: DataSource::Pending,
            generation: 0,
            stats: None,
        }
    }

    /// Restores a stored profile without refetching it.
    pub fn with_profile(mut self, samples: Vec<ElevationSample>, data_source: DataSource) -> Self {
        self.stats = compute_stats(&samples);
        self.samples = samples;
        self.data_source = data_source;
        self
    }

    pub fn line(&self) -> &Polyline {
        &self.line
    }

    pub fn points(&self) -> &[LatLng] {
        self.line.points()
    }

    pub fn samples(&self) -> &[ElevationSample] {
        &self.samples
    }

    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> Option<ElevationStats> {
        self.stats
    }

    /// Lowest and highest sample, as `(index, sample)` pairs.
    pub fn extremes(&self) -> Option<((usize, ElevationSample), (usize, ElevationSample))> {
        let (lo, hi) = extreme_indices(&self.samples)?;
        Some(((lo, self.samples[lo]), (hi, self.samples[hi])))
    }

    /// True when the profile no longer matches the geometry.
    pub fn is_profile_outdated(&self) -> bool {
        self.data_source == DataSource::Pending
    }

    pub fn move_vertex(&mut self, index: usize, point: LatLng) -> Result<(), GeometryError> {
        self.line.move_vertex(index, point)?;
        self.invalidate_profile();
        Ok(())
    }

    /// Always rejected: the profile keeps the vertex count it was built with.
    pub fn insert_vertex(&mut self, _after_index: usize, _point: LatLng) -> Result<usize, GeometryError> {
        Err(GeometryError::InsertionNotAllowed {
            kind: ShapeKind::ElevationPolyline,
        })
    }

    pub fn move_to(&mut self, center: LatLng) -> Result<(), GeometryError> {
        self.line.move_to(center)?;
        self.invalidate_profile();
        Ok(())
    }

    /// Snapshot of the sample points for the current geometry.
    ///
    /// Issuing a new request supersedes every earlier one.
    pub fn begin_profile_request(&mut self, shape_id: ShapeId, sampler: &ElevationSampler) -> ProfileRequest {
        self.generation += 1;
        let (points, distances) = sampler.sample_positions(&self.line);
        ProfileRequest {
            shape_id,
            generation: self.generation,
            total_length: self.line.length(),
            points,
            distances,
        }
    }

    /// Applies a resolved profile. Returns `false` for a stale result.
    pub fn apply_profile(&mut self, result: ProfileResult) -> bool {
        if result.generation != self.generation {
            tracing::debug!(
                "Discarding elevation profile generation {} for {} (current {})",
                result.generation,
                result.shape_id,
                self.generation
            );
            return false;
        }
        self.stats = compute_stats(&result.samples);
        self.samples = result.samples;
        self.data_source = result.data_source;
        true
    }

    pub fn distance_to(&self, point: LatLng) -> f64 {
        self.line.distance_to(point)
    }

    pub fn properties(&self) -> ElevationProperties {
        ElevationProperties {
            line: self.line.properties(),
            sample_count: self.samples.len(),
            data_source: self.data_source,
            stats: self.stats,
        }
    }

    /// Drops the samples of the old geometry; they describe a line that no
    /// longer exists.
    fn invalidate_profile(&mut self) {
        self.generation += 1;
        self.data_source = DataSource::Pending;
        self.samples.clear();
        self.stats = None;
    }
}
