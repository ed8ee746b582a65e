/// Parse a measurement cell. Empty, non-numeric and non-finite cells are missing.
pub fn parse_value(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a value for output: integral values keep one decimal place
/// (`15.0`), everything else uses the shortest round-trip form, missing
/// values are empty.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{:.1}", v),
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

/// Round to `digits` decimal places, ties to even on the scaled value
/// (`10.25` becomes `10.2`, `0.35` becomes `0.4`)
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}
