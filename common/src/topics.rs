pub const TOPIC_READING_TEMPERATURE: &str = "heatwatch/reading/temperature";
pub const TOPIC_READING_HEAT_INDEX: &str = "heatwatch/reading/heat-index";
pub const TOPIC_READING_HUMIDITY: &str = "heatwatch/reading/humidity";

pub const TOPIC_ALERT: &str = "heatwatch/alert";
pub const TOPIC_STATE: &str = "heatwatch/state";
pub const TOPIC_STATUS: &str = "heatwatch/status";

pub const TOPIC_ADVISORY: &str = "heatwatch/advisory";
