// Rothfusz regression for the NOAA heat index, Fahrenheit in and out.
// Humidity arrives as a 0-1 fraction; the regression wants percent.
pub fn heat_index_f(temperature_f: f32, humidity: f32) -> f32 {
    let t = temperature_f.max(0.0);
    let rh = humidity.max(0.0) * 100.0;

    -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_point() {
        let hi = heat_index_f(95.0, 0.80);
        assert!((hi - 133.78).abs() < 0.05, "unexpected heat index {hi}");
    }

    #[test]
    fn negative_inputs_clamp_to_zero() {
        assert_eq!(heat_index_f(-12.5, -0.3), heat_index_f(0.0, 0.0));
    }

    #[test]
    fn rises_with_temperature_in_humid_air() {
        for humidity in [0.4_f32, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0] {
            let mut previous = heat_index_f(80.0, humidity);
            for step in 1..=40 {
                let temp = 80.0 + step as f32;
                let current = heat_index_f(temp, humidity);
                assert!(
                    current > previous,
                    "heat index fell from {previous} to {current} at {temp}F / {humidity}"
                );
                previous = current;
            }
        }
    }
}
