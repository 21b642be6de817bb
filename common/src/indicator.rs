#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorLevels {
    pub red: u8,
    pub blue: u8,
}

impl IndicatorLevels {
    pub fn for_temperature(
        temperature_f: f32,
        min_low_f: f32,
        max_high_f: f32,
        override_active: bool,
    ) -> Self {
        if override_active || temperature_f >= max_high_f {
            return Self { red: 255, blue: 0 };
        }
        if temperature_f <= min_low_f {
            return Self { red: 0, blue: 255 };
        }

        // Integer rescale with truncation keeps the two channels exact
        // complements of each other.
        let red = rescale(temperature_f as i32, min_low_f as i32, max_high_f as i32, 0, 255);
        let blue = rescale(temperature_f as i32, min_low_f as i32, max_high_f as i32, 255, 0);
        Self {
            red: red.clamp(0, 255) as u8,
            blue: blue.clamp(0, 255) as u8,
        }
    }

    pub fn brightness(self) -> u8 {
        self.red.max(self.blue)
    }
}

// Callers guarantee in_max > in_min; see RuntimeConfig::validate.
fn rescale(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}
