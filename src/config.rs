// Node configuration

use serde::{Deserialize, Serialize};

fn default_version() -> String {
    "picochain-0.1".to_string()
}

/// Process configuration, loadable from a JSON file and overridable by CLI
/// flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Human-readable version string advertised in handshakes
    #[serde(default = "default_version")]
    pub version: String,
    /// Address the node listens on
    pub listen_addr: String,
    /// Addresses of already-known nodes to bootstrap from
    #[serde(default)]
    pub bootstrap: Vec<String>,
    /// Hex seed of the validator key; absent on non-validator nodes
    #[serde(default)]
    pub validator_seed: Option<String>,
}

impl NodeConfig {
    pub fn new(listen_addr: String) -> Self {
        Self {
            version: default_version(),
            listen_addr,
            bootstrap: Vec::new(),
            validator_seed: None,
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path, e))?;
        serde_json::from_str(&data).map_err(|e| format!("failed to parse config {}: {}", path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let cfg: NodeConfig = serde_json::from_str(r#"{"listen_addr": "127.0.0.1:3000"}"#).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:3000");
        assert_eq!(cfg.version, "picochain-0.1");
        assert!(cfg.bootstrap.is_empty());
        assert!(cfg.validator_seed.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let cfg: NodeConfig = serde_json::from_str(
            r#"{
                "version": "picochain-dev",
                "listen_addr": "127.0.0.1:3000",
                "bootstrap": ["127.0.0.1:4000"],
                "validator_seed": "1c0fbc3e5edd3857c5882c88a84c52de0e10c442f6ed818b61a8f0a5971b8653"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.version, "picochain-dev");
        assert_eq!(cfg.bootstrap, vec!["127.0.0.1:4000".to_string()]);
        assert!(cfg.validator_seed.is_some());
    }
}
