use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, types::HeatBand};

const MIN_INTERVAL_MS: u64 = 250;

// DS18B20 operating range in Fahrenheit.
const MIN_INDICATOR_BOUND_F: f32 = -67.0;
const MAX_INDICATOR_BOUND_F: f32 = 257.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub tick_interval_ms: u64,
    pub state_publish_interval_ms: u64,
    pub min_low_temp_f: f32,
    pub max_high_temp_f: f32,
    pub override_duration_ms: u64,
    pub override_report_interval_ms: u64,
    pub report_interval_extreme_ms: u64,
    pub report_interval_very_hot_ms: u64,
    pub report_interval_hot_ms: u64,
    pub report_interval_warm_ms: u64,
    pub report_interval_normal_ms: u64,
    pub heat_marker: String,
    pub advisory_marker: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            state_publish_interval_ms: 10_000,
            min_low_temp_f: 60.0,
            max_high_temp_f: 90.0,
            override_duration_ms: 1_800_000,
            override_report_interval_ms: 10_000,
            report_interval_extreme_ms: 15_000,
            report_interval_very_hot_ms: 30_000,
            report_interval_hot_ms: 60_000,
            report_interval_warm_ms: 120_000,
            report_interval_normal_ms: 300_000,
            heat_marker: "heat".to_string(),
            advisory_marker: "advisory".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub endpoint: String,
    pub token: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/readings".to_string(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    pub mqtt_pass: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mqtt_host: "127.0.0.1".to_string(),
            mqtt_port: 1883,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl MonitorConfig {
    pub fn report_interval_for(&self, band: HeatBand) -> u64 {
        match band {
            HeatBand::ExtremelyHot => self.report_interval_extreme_ms,
            HeatBand::VeryHot => self.report_interval_very_hot_ms,
            HeatBand::Hot => self.report_interval_hot_ms,
            HeatBand::Warm => self.report_interval_warm_ms,
            HeatBand::Normal => self.report_interval_normal_ms,
        }
    }

    pub fn sanitize(&mut self) {
        self.tick_interval_ms = self.tick_interval_ms.max(MIN_INTERVAL_MS);
        self.state_publish_interval_ms = self.state_publish_interval_ms.max(MIN_INTERVAL_MS);
        self.override_report_interval_ms = self.override_report_interval_ms.max(MIN_INTERVAL_MS);
        self.report_interval_extreme_ms = self.report_interval_extreme_ms.max(MIN_INTERVAL_MS);
        self.report_interval_very_hot_ms = self.report_interval_very_hot_ms.max(MIN_INTERVAL_MS);
        self.report_interval_hot_ms = self.report_interval_hot_ms.max(MIN_INTERVAL_MS);
        self.report_interval_warm_ms = self.report_interval_warm_ms.max(MIN_INTERVAL_MS);
        self.report_interval_normal_ms = self.report_interval_normal_ms.max(MIN_INTERVAL_MS);

        // Advisory matching is case-insensitive; store the markers lowered.
        self.heat_marker = normalize_marker(&self.heat_marker, "heat");
        self.advisory_marker = normalize_marker(&self.advisory_marker, "advisory");
    }
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        self.monitor.sanitize();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.report.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidReportEndpoint {
                endpoint: self.report.endpoint.clone(),
            });
        }

        if self.network.mqtt_host.trim().is_empty() {
            return Err(ConfigError::EmptyMqttHost);
        }
        if self.network.mqtt_port == 0 {
            return Err(ConfigError::InvalidMqttPort);
        }

        for bound in [self.monitor.min_low_temp_f, self.monitor.max_high_temp_f] {
            if !(MIN_INDICATOR_BOUND_F..=MAX_INDICATOR_BOUND_F).contains(&bound) {
                return Err(ConfigError::IndicatorBoundOutOfRange { bound });
            }
        }
        // The indicator mapper divides by the span after `as i32` truncation
        // (toward zero), so compare the bounds the same way.
        if (self.monitor.max_high_temp_f as i32) <= (self.monitor.min_low_temp_f as i32) {
            return Err(ConfigError::InvalidIndicatorRange {
                min: self.monitor.min_low_temp_f,
                max: self.monitor.max_high_temp_f,
            });
        }

        Ok(())
    }
}

fn normalize_marker(marker: &str, fallback: &str) -> String {
    let normalized = marker.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized
    }
}
