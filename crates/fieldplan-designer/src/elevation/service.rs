use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fieldplan_core::{ElevationError, LatLng};

/// One point of an elevation service response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevatedPoint {
    pub location: LatLng,
    pub elevation: f64,
}

impl ElevatedPoint {
    pub fn new(location: LatLng, elevation: f64) -> Self {
        Self { location, elevation }
    }
}

/// Remote elevation lookup.
///
/// One call per profile refresh with every sample point batched together.
/// Implementations report transport and format failures as
/// [`ElevationError::Request`]; response validation happens in the sampler.
#[async_trait]
pub trait ElevationService: Send + Sync {
    async fn fetch_elevations(&self, points: &[LatLng]) -> Result<Vec<ElevatedPoint>, ElevationError>;
}
