use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("report endpoint must start with http:// or https:// (got `{endpoint}`)")]
    InvalidReportEndpoint { endpoint: String },
    #[error("mqtt host cannot be empty")]
    EmptyMqttHost,
    #[error("mqtt port cannot be 0")]
    InvalidMqttPort,
    #[error("indicator range must span at least one whole degree (got {min}F..{max}F)")]
    InvalidIndicatorRange { min: f32, max: f32 },
    #[error("indicator bound {bound}F is outside the -67F..257F sensor range")]
    IndicatorBoundOutOfRange { bound: f32 },
}
