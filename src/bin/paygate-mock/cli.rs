//! Command-line interface definition.

use clap::Parser;
use paygate_mock::MockConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Mock enforcement, invoicing and token-validation backend for proxy tests.
#[derive(Parser, Debug)]
#[command(name = "paygate-mock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Interface to listen on.
    #[arg(long, env = "PAYGATE_MOCK_HOST")]
    pub host: Option<IpAddr>,

    /// Port to listen on.
    #[arg(long, short, env = "PAYGATE_MOCK_PORT")]
    pub port: Option<u16>,

    /// Path to a TOML configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log level, used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Convert CLI arguments into a MockConfig.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded or
    /// fails validation.
    pub fn into_config(self) -> anyhow::Result<MockConfig> {
        let mut config = match self.config {
            Some(ref path) => MockConfig::from_file(path)?,
            None => MockConfig::default(),
        };

        // Override with CLI arguments
        let host = self.host.unwrap_or(config.bind_addr.ip());
        let port = self.port.unwrap_or(config.bind_addr.port());
        config.bind_addr = SocketAddr::new(host, port);
        Ok(config)
    }
}
