/// Units reported by the observation service, in WMO code form.
///
/// Tags may arrive with or without the `wmoUnit:` namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Pascal,
    MetersPerSecond,
    Millimeters,
    DegreeAngle,
    Other,
}

const WMO_PREFIX: &str = "wmoUnit:";

impl Unit {
    pub fn from_tag(tag: &str) -> Self {
        let code = tag.trim();
        let code = code.strip_prefix(WMO_PREFIX).unwrap_or(code);

        match code {
            "degC" => Unit::Celsius,
            "Pa" => Unit::Pascal,
            "m_s-1" => Unit::MetersPerSecond,
            "mm" => Unit::Millimeters,
            "degree_(angle)" => Unit::DegreeAngle,
            _ => Unit::Other,
        }
    }

    /// Convert a metric value into the imperial scale used by the dataset
    pub fn convert(&self, value: f64) -> f64 {
        match self {
            Unit::Celsius => value * 9.0 / 5.0 + 32.0,
            Unit::Pascal => value * 0.0002953,
            Unit::MetersPerSecond => value * 2.237,
            Unit::Millimeters => value * 0.0394,
            Unit::DegreeAngle | Unit::Other => value,
        }
    }
}

/// Normalize a possibly missing value tagged with a unit code.
///
/// Missing values become `0.0` before dispatch. Unknown tags pass the value
/// through unchanged.
///
/// # Examples
/// ```
/// use weather_ingest::utils::normalize;
///
/// assert_eq!(normalize(Some(100.0), "wmoUnit:degC"), 212.0);
/// assert_eq!(normalize(None, "degC"), 32.0);
/// ```
pub fn normalize(value: Option<f64>, unit_tag: &str) -> f64 {
    Unit::from_tag(unit_tag).convert(value.unwrap_or(0.0))
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Reduce an angle in degrees into `[0, 360)`
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
