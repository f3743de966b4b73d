//! Elevation profiles for elevation polylines.
//!
//! A profile is a list of `{distance, elevation}` samples taken at equal
//! spacing along the line. Elevations come from an external
//! [`ElevationService`]; the [`ElevationSampler`] owns the retry policy and
//! the synthetic fallback used when the service stays unavailable.

pub mod profile;
pub mod sampler;
pub mod service;

pub use profile::{
    compute_stats, extreme_indices, format_sample_label, simulated_profile, ElevationSample,
    ProfileRequest, ProfileResult,
};
pub use sampler::ElevationSampler;
pub use service::{ElevatedPoint, ElevationService};
