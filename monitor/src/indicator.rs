use heatwatch_common::IndicatorLevels;
use tracing::info;

pub trait Indicator {
    fn apply(&mut self, levels: IndicatorLevels);
}

// Hardware integration point:
// drive the red/blue PWM channels of the RGB LED on the device target.
pub struct LogIndicator {
    last: Option<IndicatorLevels>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Indicator for LogIndicator {
    fn apply(&mut self, levels: IndicatorLevels) {
        if self.last == Some(levels) {
            return;
        }
        self.last = Some(levels);

        info!(
            "indicator: red={} blue={} brightness={}",
            levels.red,
            levels.blue,
            levels.brightness()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_indicator_tracks_the_last_applied_levels() {
        let mut indicator = LogIndicator::new();
        assert!(indicator.last.is_none());

        indicator.apply(IndicatorLevels { red: 42, blue: 213 });
        assert_eq!(indicator.last, Some(IndicatorLevels { red: 42, blue: 213 }));

        indicator.apply(IndicatorLevels { red: 255, blue: 0 });
        assert_eq!(indicator.last, Some(IndicatorLevels { red: 255, blue: 0 }));
    }
}
