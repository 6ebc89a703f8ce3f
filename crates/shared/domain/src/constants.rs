//! Names shared between routes, OpenAPI tags and database tables.

pub const APP_NAME: &str = "DayQHI";

pub const SYSTEM_TAG: &str = "System";
pub const USERS_TAG: &str = "Users";
pub const ALERTS_TAG: &str = "Alerts";
pub const READINGS_TAG: &str = "Readings";

pub const USER_TABLE: &str = "user";
pub const ALERT_TABLE: &str = "alert";

/// Lowest and highest AQHI values; 11 stands for "10+".
pub const AQHI_MIN: u8 = 1;
pub const AQHI_MAX: u8 = 11;
