//! Measurement label formatting.

/// Formats a distance: meters below 1 km, kilometers with two decimals above.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters)
    }
}

pub fn format_elevation(meters: f64) -> String {
    format!("{:.0} m", meters)
}

/// Formats an area: m² below one hectare, hectares above.
pub fn format_area(square_meters: f64) -> String {
    if square_meters >= 10_000.0 {
        format!("{:.2} ha", square_meters / 10_000.0)
    } else {
        format!("{:.0} m²", square_meters)
    }
}

pub fn format_angle(degrees: f64) -> String {
    format!("{:.1}°", degrees)
}
