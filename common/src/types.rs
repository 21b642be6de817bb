use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatBand {
    ExtremelyHot,
    VeryHot,
    Hot,
    Warm,
    Normal,
}

impl HeatBand {
    pub fn for_heat_index(heat_index: f32) -> Self {
        if heat_index >= 130.0 {
            Self::ExtremelyHot
        } else if heat_index >= 105.0 {
            Self::VeryHot
        } else if heat_index >= 90.0 {
            Self::Hot
        } else if heat_index >= 80.0 {
            Self::Warm
        } else {
            Self::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExtremelyHot => "ExtremelyHot",
            Self::VeryHot => "VeryHot",
            Self::Hot => "Hot",
            Self::Warm => "Warm",
            Self::Normal => "Normal",
        }
    }

    // The top three bands are the ones worth waking anyone up for.
    pub fn is_alerting(self) -> bool {
        matches!(self, Self::ExtremelyHot | Self::VeryHot | Self::Hot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub temperature_f: f32,
    pub humidity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    #[serde(rename = "currentTemp")]
    pub current_temp: f32,
    #[serde(rename = "currentHumidity")]
    pub current_humidity: f32,
    #[serde(rename = "heatIndex")]
    pub heat_index: f32,
    pub band: &'static str,
    #[serde(rename = "alertActive")]
    pub alert_active: bool,
    #[serde(rename = "overrideActive")]
    pub override_active: bool,
    #[serde(rename = "overrideRemainingMs")]
    pub override_remaining_ms: u64,
    #[serde(rename = "overrideRemainingMin")]
    pub override_remaining_min: u64,
    #[serde(rename = "sensorValid")]
    pub sensor_valid: bool,
    #[serde(rename = "indicatorRed")]
    pub indicator_red: u8,
    #[serde(rename = "indicatorBlue")]
    pub indicator_blue: u8,
    #[serde(rename = "indicatorBrightness")]
    pub indicator_brightness: u8,
    #[serde(rename = "reportIntervalMs")]
    pub report_interval_ms: u64,
    #[serde(rename = "lastReportMs")]
    pub last_report_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatePayload {
    pub temp: f32,
    pub humidity: f32,
    #[serde(rename = "heatIndex")]
    pub heat_index: f32,
    pub band: &'static str,
    pub alert: bool,
    #[serde(rename = "overrideActive")]
    pub override_active: bool,
    #[serde(rename = "overrideRemainingMin")]
    pub override_remaining_min: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub band: &'static str,
    #[serde(rename = "heatIndex")]
    pub heat_index: f32,
    #[serde(rename = "raisedAt")]
    pub raised_at: String,
}
