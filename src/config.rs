use crate::db::StoreConfig;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // MongoDB settings
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_name")]
    pub database_name: String,

    #[serde(default = "default_max_request_body")]
    pub max_request_body_kb: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "app_db".to_string()
}

fn default_max_request_body() -> usize {
    1024
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            url: self.database_url.clone(),
            database: self.database_name.clone(),
        }
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.max_request_body_kb.saturating_mul(1024)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
