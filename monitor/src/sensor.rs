use heatwatch_common::SensorSample;

// The humidity probe is not wired up yet; report a fixed 80% until it lands.
pub const STUB_HUMIDITY: f32 = 0.80;

pub trait Sensor {
    fn sample(&mut self) -> SensorSample;
}

pub struct SimulatedSensor {
    tick: u64,
    pinned_temp_f: Option<f32>,
}

impl SimulatedSensor {
    pub fn from_env() -> Self {
        let pinned_temp_f = std::env::var("HEATWATCH_SIM_TEMP_F")
            .ok()
            .and_then(|value| parse_pin(&value));
        Self {
            tick: 0,
            pinned_temp_f,
        }
    }
}

fn parse_pin(value: &str) -> Option<f32> {
    // "inf" and "nan" parse as f32 but make useless pins.
    value.parse::<f32>().ok().filter(|temp| temp.is_finite())
}

impl Sensor for SimulatedSensor {
    fn sample(&mut self) -> SensorSample {
        self.tick = self.tick.saturating_add(1);

        // Hardware integration point:
        // replace the simulated wobble with a DS18B20 driver on the device target.
        let temperature_f = self
            .pinned_temp_f
            .unwrap_or_else(|| 72.0 + ((self.tick % 8) as f32 * 0.2));

        SensorSample {
            temperature_f,
            humidity: STUB_HUMIDITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_readings_stay_in_a_narrow_range() {
        let mut sensor = SimulatedSensor {
            tick: 0,
            pinned_temp_f: None,
        };

        for _ in 0..32 {
            let sample = sensor.sample();
            assert!((72.0..=73.5).contains(&sample.temperature_f));
            assert_eq!(sample.humidity, STUB_HUMIDITY);
        }
    }

    #[test]
    fn pinned_temperature_wins() {
        let mut sensor = SimulatedSensor {
            tick: 0,
            pinned_temp_f: Some(95.0),
        };

        assert_eq!(sensor.sample().temperature_f, 95.0);
    }

    #[test]
    fn pin_parsing_drops_non_finite_values() {
        assert_eq!(parse_pin("95.5"), Some(95.5));
        assert_eq!(parse_pin("inf"), None);
        assert_eq!(parse_pin("-inf"), None);
        assert_eq!(parse_pin("NaN"), None);
        assert_eq!(parse_pin("warm"), None);
    }
}
