// ── Display helpers ──
//
// Threshold tables and labels that turn raw readings into something a
// person can scan. Pure functions, no I/O.

use chrono::{DateTime, Local, TimeZone};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use vayu_api::models::{Fault, Prediction, SensorReading};

// ── Pollutants ──────────────────────────────────────────────────────

/// A measured pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Pollutant {
    #[strum(to_string = "PM2.5", serialize = "pm25")]
    Pm25,
    #[strum(to_string = "CO2", serialize = "co2")]
    Co2,
    #[strum(to_string = "CO", serialize = "co")]
    Co,
    #[strum(to_string = "VOC", serialize = "voc")]
    Voc,
}

/// Upper bounds (inclusive) of each band. Anything above
/// `very_unhealthy` is hazardous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub good: f64,
    pub moderate: f64,
    pub unhealthy: f64,
    pub very_unhealthy: f64,
}

impl Pollutant {
    pub fn thresholds(self) -> Thresholds {
        let (good, moderate, unhealthy, very_unhealthy) = match self {
            Self::Pm25 => (12.0, 35.4, 55.4, 150.4),
            Self::Co2 => (400.0, 1000.0, 2000.0, 5000.0),
            Self::Co => (4.4, 9.4, 12.4, 15.4),
            Self::Voc => (50.0, 220.0, 660.0, 2200.0),
        };
        Thresholds {
            good,
            moderate,
            unhealthy,
            very_unhealthy,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Pm25 => "µg/m³",
            Self::Co2 | Self::Co => "ppm",
            Self::Voc => "ppb",
        }
    }

    /// This pollutant's value in `reading`, if reported.
    pub fn value_in(self, reading: &SensorReading) -> Option<f64> {
        match self {
            Self::Pm25 => reading.pm25,
            Self::Co2 => reading.co2,
            Self::Co => reading.co,
            Self::Voc => reading.voc,
        }
    }

    pub fn level(self, value: f64) -> AirQualityLevel {
        AirQualityLevel::classify(value, self.thresholds())
    }
}

/// Health band of one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, IntoStaticStr)]
pub enum AirQualityLevel {
    Good,
    Moderate,
    Unhealthy,
    #[strum(to_string = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AirQualityLevel {
    pub fn classify(value: f64, t: Thresholds) -> Self {
        if value <= t.good {
            Self::Good
        } else if value <= t.moderate {
            Self::Moderate
        } else if value <= t.unhealthy {
            Self::Unhealthy
        } else if value <= t.very_unhealthy {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }
}

// ── Predictions ─────────────────────────────────────────────────────

/// Peak risk derived from a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, IntoStaticStr)]
pub enum RiskLevel {
    #[strum(to_string = "Low Risk")]
    Low,
    #[strum(to_string = "Medium Risk")]
    Medium,
    #[strum(to_string = "High Risk")]
    High,
}

impl RiskLevel {
    /// Only a confident (> 0.7) forecast of a peak raises the risk.
    pub fn from_prediction(prediction: Option<&Prediction>) -> Self {
        let Some(p) = prediction else {
            return Self::Low;
        };
        let confident = p.will_peak == Some(true) && p.confidence.is_some_and(|c| c > 0.7);
        match p.estimated_peak_value {
            Some(peak) if confident && peak > 150.0 => Self::High,
            Some(peak) if confident && peak > 75.0 => Self::Medium,
            _ => Self::Low,
        }
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Human label for a classifier `air_type`; unrecognized types read as
/// "Unknown".
pub fn air_type_label(air_type: Option<&str>) -> &'static str {
    match air_type {
        Some("cigarette") => "Cigarette Smoke",
        Some("vehicle") => "Vehicle Exhaust",
        Some("cooking") => "Cooking Fumes",
        Some("chemical") => "Chemical Fumes",
        Some("clean") => "Clean Air",
        _ => "Unknown",
    }
}

// ── Faults ──────────────────────────────────────────────────────────

/// Overall status implied by the recent fault list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SystemHealth {
    Healthy,
    Warning,
    Critical,
}

impl SystemHealth {
    pub fn from_faults(faults: &[Fault]) -> Self {
        let has = |severity: &str| faults.iter().any(|f| f.severity.as_deref() == Some(severity));
        if has("high") {
            Self::Critical
        } else if has("medium") {
            Self::Warning
        } else {
            Self::Healthy
        }
    }
}

// ── Scalars ─────────────────────────────────────────────────────────

/// `0.98` → `"98.0%"`.
pub fn format_confidence(confidence: Option<f64>) -> String {
    confidence.map_or_else(|| "N/A".into(), |c| format!("{:.1}%", c * 100.0))
}

/// Shorten a long hash to `first8...last8`.
pub fn truncate_hash(hash: Option<&str>) -> String {
    match hash {
        None | Some("") => "N/A".into(),
        Some(h) if h.chars().count() <= 16 => h.to_owned(),
        Some(h) => {
            let chars: Vec<char> = h.chars().collect();
            let head: String = chars.iter().take(8).collect();
            let tail: String = chars.iter().skip(chars.len() - 8).collect();
            format!("{head}...{tail}")
        }
    }
}

/// `"Jan 1, 12:00:00 AM"` in local time.
pub fn format_timestamp<Tz: TimeZone>(at: Option<&DateTime<Tz>>) -> String {
    at.map_or_else(
        || "N/A".into(),
        |at| {
            at.with_timezone(&Local)
                .format("%b %-d, %I:%M:%S %p")
                .to_string()
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn pollutant_bands_are_inclusive() {
        assert_eq!(Pollutant::Pm25.level(12.0), AirQualityLevel::Good);
        assert_eq!(Pollutant::Pm25.level(12.1), AirQualityLevel::Moderate);
        assert_eq!(Pollutant::Co2.level(850.0), AirQualityLevel::Moderate);
        assert_eq!(Pollutant::Co.level(12.4), AirQualityLevel::Unhealthy);
        assert_eq!(Pollutant::Voc.level(2000.0), AirQualityLevel::VeryUnhealthy);
        assert_eq!(Pollutant::Pm25.level(300.0), AirQualityLevel::Hazardous);
        assert_eq!(AirQualityLevel::VeryUnhealthy.to_string(), "Very Unhealthy");
    }

    #[test]
    fn pollutant_names_round_trip() {
        assert_eq!(Pollutant::from_str("pm25").unwrap(), Pollutant::Pm25);
        assert_eq!(Pollutant::Pm25.to_string(), "PM2.5");
        assert_eq!(Pollutant::iter().count(), 4);
        let reading = SensorReading {
            voc: Some(120.0),
            ..SensorReading::default()
        };
        assert_eq!(Pollutant::Voc.value_in(&reading), Some(120.0));
        assert_eq!(Pollutant::Co.value_in(&reading), None);
    }

    #[test]
    fn risk_needs_confident_peak() {
        let mut p = Prediction {
            will_peak: Some(true),
            confidence: Some(0.9),
            estimated_peak_value: Some(200.0),
            ..Prediction::default()
        };
        assert_eq!(RiskLevel::from_prediction(Some(&p)), RiskLevel::High);

        p.estimated_peak_value = Some(100.0);
        assert_eq!(RiskLevel::from_prediction(Some(&p)), RiskLevel::Medium);

        p.confidence = Some(0.7);
        assert_eq!(RiskLevel::from_prediction(Some(&p)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_prediction(None), RiskLevel::Low);
    }

    #[test]
    fn fault_severity_drives_health() {
        let fault = |severity: &str| Fault {
            severity: Some(severity.into()),
            ..Fault::default()
        };
        assert_eq!(SystemHealth::from_faults(&[]), SystemHealth::Healthy);
        assert_eq!(
            SystemHealth::from_faults(&[fault("low"), fault("medium")]),
            SystemHealth::Warning
        );
        assert_eq!(
            SystemHealth::from_faults(&[fault("medium"), fault("high")]),
            SystemHealth::Critical
        );
    }

    #[test]
    fn scalar_formatting() {
        assert_eq!(format_confidence(Some(0.98)), "98.0%");
        assert_eq!(format_confidence(None), "N/A");
        assert_eq!(truncate_hash(None), "N/A");
        assert_eq!(truncate_hash(Some("abc123")), "abc123");
        assert_eq!(
            truncate_hash(Some("0123456789abcdef0123456789abcdef")),
            "01234567...89abcdef"
        );
        assert_eq!(air_type_label(Some("vehicle")), "Vehicle Exhaust");
        assert_eq!(air_type_label(Some("volcano")), "Unknown");
        assert_eq!(format_timestamp::<chrono::Utc>(None), "N/A");
    }
}
