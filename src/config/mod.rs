use serde::Deserialize;

fn default_timeout() -> u64 {
    45
}

fn default_fetch_interval() -> u64 {
    10
}

fn default_user_agent() -> String {
    "OdinBot https://home.ticklethepanda.co.uk/odinbot/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub address: String,
    // Seconds allowed for a single image download
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub target_url: Option<String>,
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval: u64,
    pub floof_store: Option<String>,
}
