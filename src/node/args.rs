//! Command line of the node binary

use super::{ChefConfig, ConfigError};
use clap::Parser;
use std::path::PathBuf;

/// Arguments of the chef node.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(author, version, about, long_about = None)]
pub struct NodeArgs {
    /// JSON config file; defaults apply when omitted
    #[clap(short, long, env = "CHEF_CONFIG")]
    pub config: Option<PathBuf>,
    /// Port of the JSON-RPC server
    #[clap(long, env = "CHEF_RPC_PORT")]
    pub rpc_port: Option<u16>,
    /// Directory of the sled database
    #[clap(long, env = "CHEF_DB_PATH")]
    pub db_path: Option<String>,
    /// Emit logs as JSON lines
    #[clap(long, env = "CHEF_LOG_JSON")]
    pub log_json: bool,
}

impl NodeArgs {
    /// Load the config file (or defaults) and apply the command line on top
    pub fn load_config(&self) -> Result<ChefConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => ChefConfig::load(path)?,
            None => ChefConfig::default(),
        };
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, mut config: ChefConfig) -> ChefConfig {
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        config.log_json |= self.log_json;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_keep_config() {
        let args = NodeArgs::try_parse_from(["chef-node"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.apply(ChefConfig::default()), ChefConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = NodeArgs::try_parse_from([
            "chef-node",
            "--rpc-port",
            "9000",
            "--db-path",
            "/tmp/chef",
            "--log-json",
        ])
        .unwrap();

        let config = args.apply(ChefConfig::default());
        assert_eq!(config.rpc_port, 9000);
        assert_eq!(config.db_path, "/tmp/chef");
        assert!(config.log_json);
        assert_eq!(config.period_length, ChefConfig::default().period_length);
    }

    #[test]
    fn test_config_file_then_overrides() {
        let path = std::env::temp_dir().join(format!("chef-args-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "rpc_port": 7000, "period_length": 20 }"#).unwrap();

        let args = NodeArgs::try_parse_from([
            "chef-node",
            "--config",
            path.to_str().unwrap(),
            "--db-path",
            "node-db",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.rpc_port, 7000);
        assert_eq!(config.period_length, 20);
        assert_eq!(config.db_path, "node-db");
    }

    #[test]
    fn test_rejects_bad_port() {
        let parsed = NodeArgs::try_parse_from(["chef-node", "--rpc-port", "70000"]);
        assert!(parsed.is_err());
    }
}
