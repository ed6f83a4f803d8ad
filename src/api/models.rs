use serde::{Deserialize, Serialize};

/// Response from the find-photos endpoint of the event site.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    #[serde(default)]
    pub matches: Vec<PhotoMatch>,
    #[serde(default)]
    pub total_searched: u64,
}

/// One matched photo in a find-photos response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhotoMatch {
    pub photo_url: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub event_name: String,
}

/// Configuration for the gallery client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "event-photo-downloader/0.1".to_string(),
        }
    }
}
