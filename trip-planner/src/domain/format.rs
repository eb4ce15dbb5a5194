//! Display formatting for durations, distances and fares.

/// Format a duration in minutes, e.g. `"1h 5m"` or `"45m"`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Format a distance in meters, switching to kilometres at 1000 m.
pub fn format_distance(meters: u32) -> String {
    if meters >= 1000 {
        format!("{:.1} km", f64::from(meters) / 1000.0)
    } else {
        format!("{meters} m")
    }
}

/// Like [`format_distance`], but empty for a missing or zero distance.
pub fn format_optional_distance(meters: Option<u32>) -> String {
    match meters {
        Some(m) if m > 0 => format_distance(m),
        _ => String::new(),
    }
}

/// Format a fare in rupees. Whole amounts are shown without decimals.
pub fn format_fare(fare: f64) -> String {
    if fare.fract() == 0.0 {
        format!("Rs. {fare:.0}")
    } else {
        format!("Rs. {fare:.2}")
    }
}
