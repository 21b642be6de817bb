use crate::{
    config::MonitorConfig,
    heat_index::heat_index_f,
    indicator::IndicatorLevels,
    types::{HeatBand, MonitorStatePayload, MonitorStatus, SensorSample},
};

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorAction {
    SetIndicator(IndicatorLevels),
    RaiseAlert { band: HeatBand, heat_index: f32 },
    SendReport(ReportSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSnapshot {
    pub temperature_f: f32,
    pub heat_index: f32,
    pub humidity: f32,
}

#[derive(Debug, Clone, Copy)]
struct OverrideWindow {
    engaged_ms: u64,
}

#[derive(Debug, Clone)]
pub struct MonitorEngine {
    pub config: MonitorConfig,

    temperature_f: f32,
    humidity: f32,
    heat_index: f32,
    band: HeatBand,
    alert: bool,
    sensor_valid: bool,

    override_window: Option<OverrideWindow>,
    last_report_ms: Option<u64>,
}

impl MonitorEngine {
    pub fn new(mut config: MonitorConfig) -> Self {
        config.sanitize();
        Self {
            config,
            temperature_f: 0.0,
            humidity: 0.0,
            heat_index: 0.0,
            band: HeatBand::Normal,
            alert: false,
            sensor_valid: false,
            override_window: None,
            last_report_ms: None,
        }
    }

    pub fn temperature_f(&self) -> f32 {
        self.temperature_f
    }

    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    pub fn heat_index(&self) -> f32 {
        self.heat_index
    }

    pub fn band(&self) -> HeatBand {
        self.band
    }

    pub fn is_alert_active(&self) -> bool {
        self.alert
    }

    pub fn is_override_active(&self) -> bool {
        self.override_window.is_some()
    }

    pub fn is_sensor_valid(&self) -> bool {
        self.sensor_valid
    }

    pub fn last_report_ms(&self) -> Option<u64> {
        self.last_report_ms
    }

    pub fn override_remaining_ms(&self, now_ms: u64) -> u64 {
        match self.override_window {
            Some(window) => {
                let elapsed = now_ms.saturating_sub(window.engaged_ms);
                self.config.override_duration_ms.saturating_sub(elapsed)
            }
            None => 0,
        }
    }

    pub fn tick(&mut self, sample: SensorSample, now_ms: u64) -> Vec<MonitorAction> {
        let mut actions = Vec::new();

        // The override runs on elapsed time alone; it must wind down even
        // on ticks whose sample is unusable.
        self.expire_override_if_needed(now_ms);

        self.temperature_f = sample.temperature_f;
        self.humidity = sample.humidity;
        self.sensor_valid = sample.temperature_f.is_finite() && sample.temperature_f > 0.0;
        if !self.sensor_valid {
            // Non-finite or non-positive readings mean a disconnected or
            // failed probe.
            return actions;
        }

        self.heat_index = heat_index_f(self.temperature_f, self.humidity);
        self.band = HeatBand::for_heat_index(self.heat_index);

        self.evaluate_alert(&mut actions);
        actions.push(MonitorAction::SetIndicator(self.indicator_levels()));
        self.schedule_report(now_ms, &mut actions);

        actions
    }

    pub fn apply_advisory(&mut self, payload: &str, now_ms: u64) -> bool {
        if !self.advisory_matches(payload) {
            return false;
        }

        // A repeated advisory restarts the window from now.
        self.override_window = Some(OverrideWindow { engaged_ms: now_ms });
        self.alert = true;
        true
    }

    pub fn indicator_levels(&self) -> IndicatorLevels {
        IndicatorLevels::for_temperature(
            self.temperature_f,
            self.config.min_low_temp_f,
            self.config.max_high_temp_f,
            self.is_override_active(),
        )
    }

    pub fn report_interval_ms(&self) -> u64 {
        if self.is_override_active() {
            self.config.override_report_interval_ms
        } else {
            self.config.report_interval_for(self.band)
        }
    }

    pub fn status(&self, now_ms: u64) -> MonitorStatus {
        let levels = self.indicator_levels();
        MonitorStatus {
            current_temp: self.temperature_f,
            current_humidity: self.humidity,
            heat_index: self.heat_index,
            band: self.band.as_str(),
            alert_active: self.alert,
            override_active: self.is_override_active(),
            override_remaining_ms: self.override_remaining_ms(now_ms),
            override_remaining_min: self.override_remaining_ms(now_ms) / 60_000,
            sensor_valid: self.sensor_valid,
            indicator_red: levels.red,
            indicator_blue: levels.blue,
            indicator_brightness: levels.brightness(),
            report_interval_ms: self.report_interval_ms(),
            last_report_ms: self.last_report_ms,
        }
    }

    pub fn state_payload(&self, now_ms: u64) -> MonitorStatePayload {
        MonitorStatePayload {
            temp: self.temperature_f,
            humidity: self.humidity,
            heat_index: self.heat_index,
            band: self.band.as_str(),
            alert: self.alert,
            override_active: self.is_override_active(),
            override_remaining_min: self.override_remaining_ms(now_ms) / 60_000,
        }
    }

    fn advisory_matches(&self, payload: &str) -> bool {
        let lowered = payload.to_ascii_lowercase();
        lowered.contains(&self.config.heat_marker) && lowered.contains(&self.config.advisory_marker)
    }

    fn evaluate_alert(&mut self, actions: &mut Vec<MonitorAction>) {
        if self.is_override_active() {
            // Forced on; band transitions neither raise nor clear here.
            self.alert = true;
            return;
        }

        let alerting = self.band.is_alerting();
        if alerting && !self.alert {
            actions.push(MonitorAction::RaiseAlert {
                band: self.band,
                heat_index: self.heat_index,
            });
        }
        self.alert = alerting;
    }

    fn schedule_report(&mut self, now_ms: u64, actions: &mut Vec<MonitorAction>) {
        let due = match self.last_report_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.report_interval_ms(),
            None => true,
        };
        if !due {
            return;
        }

        // Advance on the attempt; a failed delivery waits out the interval.
        self.last_report_ms = Some(now_ms);
        actions.push(MonitorAction::SendReport(ReportSnapshot {
            temperature_f: self.temperature_f,
            heat_index: self.heat_index,
            humidity: self.humidity,
        }));
    }

    fn expire_override_if_needed(&mut self, now_ms: u64) {
        if let Some(window) = self.override_window {
            if now_ms.saturating_sub(window.engaged_ms) >= self.config.override_duration_ms {
                self.override_window = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot_sample() -> SensorSample {
        SensorSample {
            temperature_f: 95.0,
            humidity: 0.80,
        }
    }

    fn mild_sample() -> SensorSample {
        SensorSample {
            temperature_f: 72.0,
            humidity: 0.80,
        }
    }

    fn raise_alerts(actions: &[MonitorAction]) -> usize {
        actions
            .iter()
            .filter(|action| matches!(action, MonitorAction::RaiseAlert { .. }))
            .count()
    }

    fn reports(actions: &[MonitorAction]) -> usize {
        actions
            .iter()
            .filter(|action| matches!(action, MonitorAction::SendReport(_)))
            .count()
    }

    #[test]
    fn first_valid_tick_reports_immediately() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let actions = engine.tick(mild_sample(), 0);

        assert_eq!(reports(&actions), 1);
        assert_eq!(engine.last_report_ms(), Some(0));
    }

    #[test]
    fn reports_wait_out_the_band_interval() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let _ = engine.tick(mild_sample(), 0);
        assert_eq!(engine.band(), HeatBand::Normal);

        let actions = engine.tick(mild_sample(), 299_999);
        assert_eq!(reports(&actions), 0);

        let actions = engine.tick(mild_sample(), 300_000);
        assert_eq!(reports(&actions), 1);
        assert_eq!(engine.last_report_ms(), Some(300_000));
    }

    #[test]
    fn hotter_bands_report_sooner() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let _ = engine.tick(hot_sample(), 0);
        assert_eq!(engine.band(), HeatBand::ExtremelyHot);

        let actions = engine.tick(hot_sample(), 14_999);
        assert_eq!(reports(&actions), 0);

        let actions = engine.tick(hot_sample(), 15_000);
        assert_eq!(reports(&actions), 1);
    }

    #[test]
    fn raises_alert_once_per_crossing() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let actions = engine.tick(mild_sample(), 0);
        assert_eq!(raise_alerts(&actions), 0);
        assert!(!engine.is_alert_active());

        let actions = engine.tick(hot_sample(), 2_000);
        assert_eq!(raise_alerts(&actions), 1);
        assert!(engine.is_alert_active());

        let actions = engine.tick(hot_sample(), 4_000);
        assert_eq!(raise_alerts(&actions), 0);
        assert!(engine.is_alert_active());

        let actions = engine.tick(mild_sample(), 6_000);
        assert_eq!(raise_alerts(&actions), 0);
        assert!(!engine.is_alert_active());

        let actions = engine.tick(hot_sample(), 8_000);
        assert_eq!(raise_alerts(&actions), 1);
    }

    #[test]
    fn alert_carries_band_and_heat_index() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let actions = engine.tick(hot_sample(), 0);

        let alert = actions
            .iter()
            .find_map(|action| match action {
                MonitorAction::RaiseAlert { band, heat_index } => Some((*band, *heat_index)),
                _ => None,
            })
            .unwrap();
        assert_eq!(alert.0, HeatBand::ExtremelyHot);
        assert!((alert.1 - 133.78).abs() < 0.05, "heat index {}", alert.1);
    }

    #[test]
    fn reports_carry_the_sampled_values() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let actions = engine.tick(hot_sample(), 0);

        let snapshot = actions
            .iter()
            .find_map(|action| match action {
                MonitorAction::SendReport(snapshot) => Some(*snapshot),
                _ => None,
            })
            .unwrap();
        assert_eq!(snapshot.temperature_f, 95.0);
        assert_eq!(snapshot.humidity, 0.80);
        assert!((snapshot.heat_index - 133.78).abs() < 0.05);
    }

    #[test]
    fn anomalous_sample_skips_the_tick() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let actions = engine.tick(
            SensorSample {
                temperature_f: -3.2,
                humidity: 0.80,
            },
            0,
        );
        assert!(actions.is_empty());
        assert!(!engine.is_sensor_valid());
        assert_eq!(engine.temperature_f(), -3.2);

        let actions = engine.tick(
            SensorSample {
                temperature_f: 0.0,
                humidity: 0.80,
            },
            2_000,
        );
        assert!(actions.is_empty());
        assert!(!engine.is_sensor_valid());
    }

    #[test]
    fn non_finite_samples_read_as_a_sensor_fault() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        for temperature_f in [f32::INFINITY, f32::NAN] {
            let actions = engine.tick(
                SensorSample {
                    temperature_f,
                    humidity: 0.80,
                },
                0,
            );
            assert!(actions.is_empty());
            assert!(!engine.is_sensor_valid());
        }
    }

    #[test]
    fn override_expires_even_during_anomalous_ticks() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());
        assert!(engine.apply_advisory("Excessive Heat Advisory", 0));

        let actions = engine.tick(
            SensorSample {
                temperature_f: 0.0,
                humidity: 0.80,
            },
            1_800_000,
        );

        assert!(actions.is_empty());
        assert!(!engine.is_override_active());
    }

    #[test]
    fn advisory_needs_both_markers_case_insensitive() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        assert!(!engine.apply_advisory("Heat wave inbound", 0));
        assert!(!engine.apply_advisory("Wind Advisory", 0));
        assert!(!engine.is_override_active());
        assert!(!engine.is_alert_active());

        assert!(engine.apply_advisory("HEAT ADVISORY", 0));
        assert!(engine.is_override_active());

        let mut engine = MonitorEngine::new(MonitorConfig::default());
        assert!(engine.apply_advisory("Excessive Heat Advisory in effect until 8 PM", 0));
    }

    #[test]
    fn advisory_forces_alert_and_red_indicator() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        assert!(engine.apply_advisory("heat advisory", 1_000));
        assert!(engine.is_alert_active());

        let actions = engine.tick(mild_sample(), 2_000);
        assert_eq!(raise_alerts(&actions), 0);
        assert!(engine.is_alert_active());
        assert!(actions.contains(&MonitorAction::SetIndicator(IndicatorLevels {
            red: 255,
            blue: 0
        })));
    }

    #[test]
    fn override_expiry_boundary() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());
        assert!(engine.apply_advisory("heat advisory", 1_000));

        let _ = engine.tick(mild_sample(), 1_800_999);
        assert!(engine.is_override_active());
        assert!(engine.is_alert_active());

        let _ = engine.tick(mild_sample(), 1_801_000);
        assert!(!engine.is_override_active());
        assert!(!engine.is_alert_active());
    }

    #[test]
    fn advisory_redelivery_restarts_the_window() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());
        assert!(engine.apply_advisory("heat advisory", 0));
        assert!(engine.apply_advisory("heat advisory", 1_000_000));

        let _ = engine.tick(mild_sample(), 1_800_000);
        assert!(engine.is_override_active());

        let _ = engine.tick(mild_sample(), 2_800_000);
        assert!(!engine.is_override_active());
    }

    #[test]
    fn override_shortens_the_report_interval() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());
        let _ = engine.tick(hot_sample(), 0);
        assert!(engine.apply_advisory("heat advisory", 0));
        assert_eq!(
            engine.report_interval_ms(),
            engine.config.override_report_interval_ms
        );

        let actions = engine.tick(hot_sample(), 10_000);
        assert_eq!(reports(&actions), 1);

        let mut plain = MonitorEngine::new(MonitorConfig::default());
        let _ = plain.tick(hot_sample(), 0);
        let actions = plain.tick(hot_sample(), 10_000);
        assert_eq!(reports(&actions), 0);
    }

    #[test]
    fn status_reports_override_remaining() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());
        assert!(engine.apply_advisory("heat advisory", 1_000));

        let status = engine.status(61_000);

        assert!(status.override_active);
        assert_eq!(status.override_remaining_ms, 1_740_000);
        assert_eq!(status.override_remaining_min, 29);
    }

    #[test]
    fn indicator_tracks_temperature() {
        let mut engine = MonitorEngine::new(MonitorConfig::default());

        let actions = engine.tick(
            SensorSample {
                temperature_f: 65.0,
                humidity: 0.80,
            },
            0,
        );

        assert!(actions.contains(&MonitorAction::SetIndicator(IndicatorLevels {
            red: 42,
            blue: 213
        })));
    }
}
