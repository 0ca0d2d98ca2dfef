use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /election/start`. Without a time the election starts now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// Body of `POST /election/end`. Without a time the election ends now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndRequest {
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub release_results: bool,
}
