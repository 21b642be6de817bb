pub mod config;
pub mod error;
pub mod heat_index;
pub mod indicator;
pub mod monitor;
pub mod topics;
pub mod types;

pub use config::{MonitorConfig, NetworkConfig, ReportConfig, RuntimeConfig};
pub use error::ConfigError;
pub use heat_index::heat_index_f;
pub use indicator::IndicatorLevels;
pub use monitor::{MonitorAction, MonitorEngine, ReportSnapshot};
pub use topics::*;
pub use types::{AlertEvent, HeatBand, MonitorStatePayload, MonitorStatus, SensorSample};
