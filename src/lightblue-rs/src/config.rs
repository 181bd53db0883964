use lightblue_core::{MongoExecutionOptions, ReadPreference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Host, port and context root of the data service
    #[serde(default = "default_data_service_uri")]
    pub data_service_uri: String,
    #[serde(default)]
    pub metadata_service_uri: String,

    // Client certificate authentication. The key may live in the cert file.
    #[serde(default)]
    pub cert_file: String,
    #[serde(default)]
    pub key_file: String,
    #[serde(default)]
    pub ca_cert_path: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,

    // Defaults for execution options
    #[serde(default)]
    pub read_preference: Option<ReadPreference>,
    #[serde(default)]
    pub write_concern: Option<String>,
    #[serde(default)]
    pub max_query_time_ms: Option<u64>,

    /// Whole-request timeout, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_data_service_uri() -> String {
    "http://localhost:8080/rest/data".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_service_uri: default_data_service_uri(),
            metadata_service_uri: String::new(),
            cert_file: String::new(),
            key_file: String::new(),
            ca_cert_path: String::new(),
            insecure_skip_verify: false,
            read_preference: None,
            write_concern: None,
            max_query_time_ms: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Execution options built from the configured defaults. They are not
    /// sent unless attached to a request header.
    pub fn execution_options(&self) -> MongoExecutionOptions {
        MongoExecutionOptions {
            read_preference: self.read_preference,
            write_concern: self.write_concern.clone(),
            max_query_time_ms: self.max_query_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.data_service_uri, "http://localhost:8080/rest/data");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.insecure_skip_verify);
        assert!(config.execution_options().is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "data_service_uri": "https://lb.example.com/rest/data/",
                "metadata_service_uri": "https://lb.example.com/rest/metadata",
                "cert_file": "/etc/lb/client.pem",
                "insecure_skip_verify": true,
                "read_preference": "secondary",
                "write_concern": "majority",
                "max_query_time_ms": 2000,
                "timeout_secs": 0
            }"#,
        )
        .unwrap();

        assert_eq!(config.cert_file, "/etc/lb/client.pem");
        assert_eq!(config.key_file, "");
        assert_eq!(config.timeout_secs, 0);

        let opts = config.execution_options();
        assert_eq!(opts.read_preference, Some(ReadPreference::Secondary));
        assert_eq!(opts.write_concern.as_deref(), Some("majority"));
        assert_eq!(opts.max_query_time_ms, Some(2000));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ClientConfig::load("/nonexistent/lightblue.json").is_err());
    }
}
